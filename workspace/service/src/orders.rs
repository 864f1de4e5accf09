//! The order workflow: placing orders, owner-scoped reads and status changes.
//!
//! `total_price` is computed once, when the order is placed, and stored.
//! Products are unlimited-supply goods, so placing an order never touches
//! the product row.

use chrono::Utc;
use model::entities::{customer, order, order::OrderStatus, prelude::*};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Set,
};
use tracing::{debug, info, instrument, trace, warn};

use crate::UserId;
use crate::access::authorize_order;
use crate::catalog::products::get_product;
use crate::customers::{ensure_customer, find_customer_for};
use crate::error::{Result, ServiceError, log_db};
use crate::forms::{check_money, to_money};

/// `price * quantity`, exact. The result has to fit the money column.
pub fn compute_total(price: Decimal, quantity: i32) -> Result<Decimal> {
    if quantity < 1 {
        return Err(ServiceError::InvalidInput(format!(
            "quantity must be at least 1, got {quantity}"
        )));
    }
    let total = price.checked_mul(Decimal::from(quantity)).ok_or_else(|| {
        ServiceError::InvalidInput(format!("total of {price} x {quantity} overflows"))
    })?;
    check_money(&total).map_err(|reason| {
        ServiceError::InvalidInput(format!("total {total} is not storable: {reason}"))
    })?;
    Ok(to_money(total))
}

/// Places an order for `user`, creating their customer record if needed.
#[instrument(skip(db))]
pub async fn create_order<C: ConnectionTrait>(
    db: &C,
    user: UserId,
    product_id: i32,
    quantity: i32,
) -> Result<order::Model> {
    trace!("Entering create_order function");
    let product = get_product(db, product_id).await?;
    let total_price = compute_total(product.price, quantity)?;
    debug!(
        "Order total for product {} x {} is {}",
        product.id, quantity, total_price
    );
    let customer = ensure_customer(db, user).await?;

    let new_order = order::ActiveModel {
        customer_id: Set(customer.id),
        product_id: Set(product.id),
        quantity: Set(quantity),
        order_date: Set(Utc::now()),
        status: Set(OrderStatus::Pending),
        total_price: Set(total_price),
        ..Default::default()
    };

    let mut order_model = new_order
        .insert(db)
        .await
        .map_err(|e| log_db("Failed to create order", e))?;
    order_model.total_price = to_money(order_model.total_price);
    info!(
        "Order {} placed by customer {} for product {}, total {}",
        order_model.id, customer.id, product.id, order_model.total_price
    );
    Ok(order_model)
}

/// Fetches an order the acting user owns.
#[instrument(skip(db))]
pub async fn get_order<C: ConnectionTrait>(
    db: &C,
    user: UserId,
    order_id: i32,
) -> Result<order::Model> {
    let (order_model, owner) = Order::find_by_id(order_id)
        .find_also_related(Customer)
        .one(db)
        .await
        .map_err(|e| log_db("Failed to retrieve order", e))?
        .ok_or_else(|| {
            warn!("Order with ID {} not found", order_id);
            ServiceError::not_found("Order", order_id)
        })?;

    authorize_order(&order_model, owner.as_ref(), user)?;
    Ok(order_model)
}

/// Orders of the acting user's customer, newest first.
///
/// A user without a customer record simply has no orders; none is created.
#[instrument(skip(db))]
pub async fn list_orders<C: ConnectionTrait>(db: &C, user: UserId) -> Result<Vec<order::Model>> {
    let Some(customer) = find_customer_for(db, user).await? else {
        debug!("{} has no customer record yet", user);
        return Ok(Vec::new());
    };
    orders_of_customer(db, &customer).await
}

pub(crate) async fn orders_of_customer<C: ConnectionTrait>(
    db: &C,
    customer: &customer::Model,
) -> Result<Vec<order::Model>> {
    let orders = Order::find()
        .filter(order::Column::CustomerId.eq(customer.id))
        .order_by_desc(order::Column::OrderDate)
        .order_by_desc(order::Column::Id)
        .all(db)
        .await
        .map_err(|e| log_db("Failed to retrieve orders", e))?;
    debug!(
        "Retrieved {} orders for customer {}",
        orders.len(),
        customer.id
    );
    Ok(orders)
}

/// Changes the status of an order the acting user owns. Any status may
/// follow any other.
#[instrument(skip(db))]
pub async fn update_order_status<C: ConnectionTrait>(
    db: &C,
    user: UserId,
    order_id: i32,
    status: OrderStatus,
) -> Result<order::Model> {
    let existing = get_order(db, user, order_id).await?;
    let previous = existing.status;

    let mut order_active: order::ActiveModel = existing.into();
    order_active.status = Set(status);
    let updated = order_active
        .update(db)
        .await
        .map_err(|e| log_db("Failed to update order status", e))?;
    info!(
        "Order {} moved from {} to {}",
        order_id,
        previous.label(),
        updated.status.label()
    );
    Ok(updated)
}

/// Unscoped lookup by id, for administrative use.
#[instrument(skip(db))]
pub async fn get_order_by_id<C: ConnectionTrait>(db: &C, order_id: i32) -> Result<order::Model> {
    Order::find_by_id(order_id)
        .one(db)
        .await
        .map_err(|e| log_db("Failed to retrieve order", e))?
        .ok_or_else(|| {
            warn!("Order with ID {} not found", order_id);
            ServiceError::not_found("Order", order_id)
        })
}

/// Every order in the store, newest first.
#[instrument(skip(db))]
pub async fn list_all_orders<C: ConnectionTrait>(db: &C) -> Result<Vec<order::Model>> {
    Order::find()
        .order_by_desc(order::Column::OrderDate)
        .order_by_desc(order::Column::Id)
        .all(db)
        .await
        .map_err(|e| log_db("Failed to retrieve orders", e))
}

#[instrument(skip(db))]
pub async fn delete_order<C: ConnectionTrait>(db: &C, order_id: i32) -> Result<()> {
    let result = Order::delete_by_id(order_id)
        .exec(db)
        .await
        .map_err(|e| log_db("Failed to delete order", e))?;
    if result.rows_affected == 0 {
        warn!("Order with ID {} not found for deletion", order_id);
        return Err(ServiceError::not_found("Order", order_id));
    }
    info!("Order with ID {} deleted", order_id);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::customers::find_customer_for;
    use crate::testing::{init_test_tracing, seed_producer, seed_product, seed_user, setup_db};
    use std::str::FromStr;

    fn dec(value: &str) -> Decimal {
        Decimal::from_str(value).unwrap()
    }

    #[test]
    fn test_compute_total_is_exact() {
        assert_eq!(compute_total(dec("19.99"), 3).unwrap(), dec("59.97"));
        assert_eq!(compute_total(dec("0.10"), 3).unwrap(), dec("0.30"));
        assert_eq!(compute_total(dec("0"), 5).unwrap(), Decimal::ZERO);
    }

    #[test]
    fn test_compute_total_keeps_two_decimal_places() {
        assert_eq!(compute_total(dec("0.1"), 7).unwrap().to_string(), "0.70");
        assert_eq!(compute_total(dec("20"), 3).unwrap().to_string(), "60.00");
    }

    #[tokio::test]
    async fn test_created_order_total_has_money_scale() {
        let db = setup_db().await;
        let acme = seed_producer(&db, "Acme").await;
        let ribbon = seed_product(&db, acme.id, "Ribbon", dec("0.10")).await;
        let alice = seed_user(&db, "alice").await;

        let placed = create_order(&db, alice, ribbon.id, 7).await.unwrap();
        assert_eq!(placed.total_price.to_string(), "0.70");
    }

    #[test]
    fn test_compute_total_rejects_bad_quantity() {
        assert!(matches!(
            compute_total(dec("20.00"), 0),
            Err(ServiceError::InvalidInput(_))
        ));
        assert!(matches!(
            compute_total(dec("20.00"), -2),
            Err(ServiceError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_compute_total_rejects_unstorable_total() {
        let err = compute_total(dec("99999999.99"), 2).unwrap_err();
        assert!(matches!(err, ServiceError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_order_scenario() {
        let _guard = init_test_tracing();
        let db = setup_db().await;
        let acme = seed_producer(&db, "Acme").await;
        let shirt = seed_product(&db, acme.id, "Shirt", dec("20.00")).await;
        let alice = seed_user(&db, "alice").await;
        let bob = seed_user(&db, "bob").await;

        let placed = create_order(&db, alice, shirt.id, 3).await.unwrap();
        assert_eq!(placed.total_price, dec("60.00"));
        assert_eq!(placed.status, OrderStatus::Pending);
        assert_eq!(placed.quantity, 3);

        let listed = list_orders(&db, alice).await.unwrap();
        assert_eq!(listed, vec![placed.clone()]);

        let fetched = get_order(&db, alice, placed.id).await.unwrap();
        assert_eq!(fetched.id, placed.id);

        let err = get_order(&db, bob, placed.id).await.unwrap_err();
        assert!(matches!(err, ServiceError::PermissionDenied(_)));
    }

    #[tokio::test]
    async fn test_first_order_creates_customer_once() {
        let db = setup_db().await;
        let acme = seed_producer(&db, "Acme").await;
        let shirt = seed_product(&db, acme.id, "Shirt", dec("20.00")).await;
        let alice = seed_user(&db, "alice").await;

        assert!(find_customer_for(&db, alice).await.unwrap().is_none());
        let first = create_order(&db, alice, shirt.id, 1).await.unwrap();
        let second = create_order(&db, alice, shirt.id, 2).await.unwrap();
        assert_eq!(first.customer_id, second.customer_id);
        assert_eq!(Customer::find().all(&db).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_create_order_failures_write_nothing() {
        let db = setup_db().await;
        let acme = seed_producer(&db, "Acme").await;
        let shirt = seed_product(&db, acme.id, "Shirt", dec("20.00")).await;
        let alice = seed_user(&db, "alice").await;

        let err = create_order(&db, alice, shirt.id + 50, 1).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound { entity: "Product", .. }));

        let err = create_order(&db, alice, shirt.id, 0).await.unwrap_err();
        assert!(matches!(err, ServiceError::InvalidInput(_)));

        assert!(list_all_orders(&db).await.unwrap().is_empty());
        // Failed placements do not create the customer either
        assert!(find_customer_for(&db, alice).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_orders_is_scoped_and_newest_first() {
        let db = setup_db().await;
        let acme = seed_producer(&db, "Acme").await;
        let shirt = seed_product(&db, acme.id, "Shirt", dec("20.00")).await;
        let alice = seed_user(&db, "alice").await;
        let bob = seed_user(&db, "bob").await;

        let older = create_order(&db, alice, shirt.id, 1).await.unwrap();
        create_order(&db, bob, shirt.id, 1).await.unwrap();
        let newer = create_order(&db, alice, shirt.id, 2).await.unwrap();

        let ids: Vec<i32> = list_orders(&db, alice)
            .await
            .unwrap()
            .iter()
            .map(|o| o.id)
            .collect();
        assert_eq!(ids, vec![newer.id, older.id]);
        assert_eq!(list_all_orders(&db).await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_list_orders_without_customer_creates_nothing() {
        let db = setup_db().await;
        let carol = seed_user(&db, "carol").await;

        assert!(list_orders(&db, carol).await.unwrap().is_empty());
        assert!(find_customer_for(&db, carol).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_get_missing_order() {
        let db = setup_db().await;
        let alice = seed_user(&db, "alice").await;
        let err = get_order(&db, alice, 12).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound { entity: "Order", id: 12 }));
    }

    #[tokio::test]
    async fn test_update_status_is_owner_scoped() {
        let db = setup_db().await;
        let acme = seed_producer(&db, "Acme").await;
        let shirt = seed_product(&db, acme.id, "Shirt", dec("20.00")).await;
        let alice = seed_user(&db, "alice").await;
        let bob = seed_user(&db, "bob").await;
        let placed = create_order(&db, alice, shirt.id, 1).await.unwrap();

        let err = update_order_status(&db, bob, placed.id, OrderStatus::Cancelled)
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::PermissionDenied(_)));

        let shipped = update_order_status(&db, alice, placed.id, OrderStatus::Shipped)
            .await
            .unwrap();
        assert_eq!(shipped.status, OrderStatus::Shipped);
        // Unconstrained: going back is allowed
        let pending = update_order_status(&db, alice, placed.id, OrderStatus::Pending)
            .await
            .unwrap();
        assert_eq!(pending.status, OrderStatus::Pending);
        assert_eq!(pending.total_price, placed.total_price);
        assert_eq!(pending.order_date, placed.order_date);
    }

    #[tokio::test]
    async fn test_delete_order() {
        let db = setup_db().await;
        let acme = seed_producer(&db, "Acme").await;
        let shirt = seed_product(&db, acme.id, "Shirt", dec("20.00")).await;
        let alice = seed_user(&db, "alice").await;
        let placed = create_order(&db, alice, shirt.id, 1).await.unwrap();

        delete_order(&db, placed.id).await.unwrap();
        assert!(matches!(
            get_order_by_id(&db, placed.id).await,
            Err(ServiceError::NotFound { .. })
        ));
        assert!(matches!(
            delete_order(&db, placed.id).await,
            Err(ServiceError::NotFound { .. })
        ));
    }
}
