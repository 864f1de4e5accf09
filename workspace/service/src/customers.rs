//! Customer records: lazy creation, lookups, contact updates and deletion.

use model::entities::{customer, order, prelude::*};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use tracing::{debug, info, instrument, trace, warn};

use crate::UserId;
use crate::error::{Result, ServiceError, is_unique_violation, log_db};
use crate::forms::{CustomerForm, validate_form};

/// The customer record of a user, if one exists yet.
pub async fn find_customer_for<C: ConnectionTrait>(
    db: &C,
    user: UserId,
) -> Result<Option<customer::Model>> {
    Customer::find()
        .filter(customer::Column::UserId.eq(user.0))
        .one(db)
        .await
        .map_err(|e| log_db("Failed to look up customer", e))
}

/// Returns the customer record of `user`, creating an empty one on first use.
///
/// Idempotent. When a concurrent request wins the insert, the unique index
/// on `user_id` rejects ours and the winner's row is returned instead.
#[instrument(skip(db))]
pub async fn ensure_customer<C: ConnectionTrait>(db: &C, user: UserId) -> Result<customer::Model> {
    if let Some(existing) = find_customer_for(db, user).await? {
        return Ok(existing);
    }

    if User::find_by_id(user.0).one(db).await?.is_none() {
        warn!("Cannot create customer for missing {}", user);
        return Err(ServiceError::not_found("User", user.0));
    }

    debug!("Creating customer record for {}", user);
    let new_customer = customer::ActiveModel {
        user_id: Set(user.0),
        contact_info: Set(String::new()),
        location: Set(String::new()),
        ..Default::default()
    };

    match new_customer.insert(db).await {
        Ok(created) => {
            info!("Customer {} created for {}", created.id, user);
            Ok(created)
        }
        Err(db_error) if is_unique_violation(&db_error) => {
            debug!("Customer for {} was created concurrently, re-reading", user);
            find_customer_for(db, user).await?.ok_or_else(|| {
                ServiceError::IdentityConflict(format!("customer for {user} could not be resolved"))
            })
        }
        Err(db_error) => Err(log_db("Failed to create customer", db_error)),
    }
}

#[instrument(skip(db))]
pub async fn get_customer<C: ConnectionTrait>(db: &C, customer_id: i32) -> Result<customer::Model> {
    Customer::find_by_id(customer_id)
        .one(db)
        .await
        .map_err(|e| log_db("Failed to retrieve customer", e))?
        .ok_or_else(|| {
            warn!("Customer with ID {} not found", customer_id);
            ServiceError::not_found("Customer", customer_id)
        })
}

#[instrument(skip(db))]
pub async fn list_customers<C: ConnectionTrait>(db: &C) -> Result<Vec<customer::Model>> {
    Customer::find()
        .order_by_asc(customer::Column::Id)
        .all(db)
        .await
        .map_err(|e| log_db("Failed to retrieve customers", e))
}

/// Writes already validated contact details.
pub(crate) async fn write_contact<C: ConnectionTrait>(
    db: &C,
    existing: customer::Model,
    contact_info: String,
    location: String,
) -> Result<customer::Model> {
    let mut customer_active: customer::ActiveModel = existing.into();
    customer_active.contact_info = Set(contact_info);
    customer_active.location = Set(location);
    customer_active
        .update(db)
        .await
        .map_err(|e| log_db("Failed to update customer", e))
}

#[instrument(skip(db))]
pub async fn update_customer<C: ConnectionTrait>(
    db: &C,
    customer_id: i32,
    form: CustomerForm,
) -> Result<customer::Model> {
    trace!("Entering update_customer function for customer_id: {}", customer_id);
    let form = CustomerForm {
        contact_info: form.contact_info.trim().to_string(),
        location: form.location.trim().to_string(),
    };
    validate_form(&form)?;
    let existing = get_customer(db, customer_id).await?;
    let updated = write_contact(db, existing, form.contact_info, form.location).await?;
    info!("Customer with ID {} updated successfully", customer_id);
    Ok(updated)
}

/// Deletes a customer and its orders. Returns how many orders went with it.
#[instrument(skip(db))]
pub async fn delete_customer<C>(db: &C, customer_id: i32) -> Result<u64>
where
    C: ConnectionTrait + TransactionTrait,
{
    let txn = db.begin().await?;
    if Customer::find_by_id(customer_id).one(&txn).await?.is_none() {
        warn!("Customer with ID {} not found for deletion", customer_id);
        return Err(ServiceError::not_found("Customer", customer_id));
    }

    let orders_deleted = Order::delete_many()
        .filter(order::Column::CustomerId.eq(customer_id))
        .exec(&txn)
        .await?
        .rows_affected;
    Customer::delete_by_id(customer_id).exec(&txn).await?;
    txn.commit().await?;

    info!(
        "Customer with ID {} deleted along with {} orders",
        customer_id, orders_deleted
    );
    Ok(orders_deleted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orders::{create_order, list_orders};
    use crate::testing::{seed_producer, seed_product, seed_user, setup_db};
    use rust_decimal::Decimal;

    #[tokio::test]
    async fn test_ensure_customer_is_idempotent() {
        let db = setup_db().await;
        let alice = seed_user(&db, "alice").await;

        assert!(find_customer_for(&db, alice).await.unwrap().is_none());
        let first = ensure_customer(&db, alice).await.unwrap();
        let second = ensure_customer(&db, alice).await.unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(first.contact_info, "");
        assert_eq!(list_customers(&db).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_ensure_customer_for_missing_user() {
        let db = setup_db().await;
        let err = ensure_customer(&db, UserId(42)).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound { entity: "User", id: 42 }));
    }

    #[tokio::test]
    async fn test_update_customer_validates() {
        let db = setup_db().await;
        let alice = seed_user(&db, "alice").await;
        let customer = ensure_customer(&db, alice).await.unwrap();

        let err = update_customer(
            &db,
            customer.id,
            CustomerForm {
                contact_info: " ".to_string(),
                location: "Lisbon".to_string(),
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ServiceError::Validation(ref f) if f.contains_key("contact_info")));

        let updated = update_customer(
            &db,
            customer.id,
            CustomerForm {
                contact_info: "+351 900 111 222".to_string(),
                location: "Lisbon".to_string(),
            },
        )
        .await
        .unwrap();
        assert_eq!(updated.location, "Lisbon");
    }

    #[tokio::test]
    async fn test_delete_customer_cascades_to_orders() {
        let db = setup_db().await;
        let maker = seed_producer(&db, "Acme").await;
        let shirt = seed_product(&db, maker.id, "Shirt", Decimal::new(2000, 2)).await;
        let alice = seed_user(&db, "alice").await;
        let bob = seed_user(&db, "bob").await;
        create_order(&db, alice, shirt.id, 1).await.unwrap();
        create_order(&db, alice, shirt.id, 4).await.unwrap();
        create_order(&db, bob, shirt.id, 1).await.unwrap();

        let alice_customer = find_customer_for(&db, alice).await.unwrap().unwrap();
        let removed = delete_customer(&db, alice_customer.id).await.unwrap();
        assert_eq!(removed, 2);

        assert!(list_orders(&db, alice).await.unwrap().is_empty());
        assert_eq!(list_orders(&db, bob).await.unwrap().len(), 1);
        assert!(matches!(
            get_customer(&db, alice_customer.id).await,
            Err(ServiceError::NotFound { .. })
        ));
    }
}
