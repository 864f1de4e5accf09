use chrono::Utc;
use model::entities::{order, prelude::*, producer, product};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, ModelTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use tracing::{debug, info, instrument, trace, warn};

use super::CascadeReport;
use crate::error::{Result, ServiceError, log_db};
use crate::forms::{ProducerChanges, ProducerForm, validate_form};

/// Validates and stores a new producer.
#[instrument(skip(db))]
pub async fn create_producer<C: ConnectionTrait>(
    db: &C,
    form: ProducerForm,
) -> Result<producer::Model> {
    trace!("Entering create_producer function");
    let form = form.cleaned();
    validate_form(&form)?;

    let new_producer = producer::ActiveModel {
        name: Set(form.name),
        contact_info: Set(form.contact_info),
        email: Set(form.email),
        location: Set(form.location),
        bio: Set(form.bio),
        created_at: Set(Utc::now()),
        ..Default::default()
    };

    let producer_model = new_producer
        .insert(db)
        .await
        .map_err(|e| log_db("Failed to create producer", e))?;
    info!(
        "Producer created successfully with ID: {}, name: {}",
        producer_model.id, producer_model.name
    );
    Ok(producer_model)
}

#[instrument(skip(db))]
pub async fn get_producer<C: ConnectionTrait>(db: &C, producer_id: i32) -> Result<producer::Model> {
    match Producer::find_by_id(producer_id).one(db).await {
        Ok(Some(producer_model)) => Ok(producer_model),
        Ok(None) => {
            warn!("Producer with ID {} not found", producer_id);
            Err(ServiceError::not_found("Producer", producer_id))
        }
        Err(db_error) => Err(log_db("Failed to retrieve producer", db_error)),
    }
}

/// All producers in creation order.
#[instrument(skip(db))]
pub async fn list_producers<C: ConnectionTrait>(db: &C) -> Result<Vec<producer::Model>> {
    let producers = Producer::find()
        .order_by_asc(producer::Column::Id)
        .all(db)
        .await
        .map_err(|e| log_db("Failed to retrieve producers", e))?;
    debug!("Retrieved {} producers from database", producers.len());
    Ok(producers)
}

/// Products of one producer; fails when the producer does not exist.
#[instrument(skip(db))]
pub async fn list_producer_products<C: ConnectionTrait>(
    db: &C,
    producer_id: i32,
) -> Result<Vec<product::Model>> {
    let producer_model = get_producer(db, producer_id).await?;
    producer_model
        .find_related(Product)
        .order_by_asc(product::Column::Id)
        .all(db)
        .await
        .map_err(|e| log_db("Failed to retrieve producer products", e))
}

/// Applies a partial update. Validation runs on the merged record.
#[instrument(skip(db))]
pub async fn update_producer<C: ConnectionTrait>(
    db: &C,
    producer_id: i32,
    changes: ProducerChanges,
) -> Result<producer::Model> {
    trace!("Entering update_producer function for producer_id: {}", producer_id);
    let existing = get_producer(db, producer_id).await?;
    let form = changes.apply_to(&existing);
    validate_form(&form)?;

    let mut producer_active: producer::ActiveModel = existing.into();
    producer_active.name = Set(form.name);
    producer_active.contact_info = Set(form.contact_info);
    producer_active.email = Set(form.email);
    producer_active.location = Set(form.location);
    producer_active.bio = Set(form.bio);

    let updated = producer_active
        .update(db)
        .await
        .map_err(|e| log_db("Failed to update producer", e))?;
    info!("Producer with ID {} updated successfully", producer_id);
    Ok(updated)
}

/// Deletes a producer together with its products and their orders.
#[instrument(skip(db))]
pub async fn delete_producer<C>(db: &C, producer_id: i32) -> Result<CascadeReport>
where
    C: ConnectionTrait + TransactionTrait,
{
    trace!("Entering delete_producer function for producer_id: {}", producer_id);
    let txn = db.begin().await?;

    if Producer::find_by_id(producer_id).one(&txn).await?.is_none() {
        warn!("Producer with ID {} not found for deletion", producer_id);
        return Err(ServiceError::not_found("Producer", producer_id));
    }

    let product_ids: Vec<i32> = Product::find()
        .filter(product::Column::ProducerId.eq(producer_id))
        .all(&txn)
        .await?
        .into_iter()
        .map(|p| p.id)
        .collect();

    let mut report = CascadeReport::default();
    if !product_ids.is_empty() {
        report.orders_deleted = Order::delete_many()
            .filter(order::Column::ProductId.is_in(product_ids))
            .exec(&txn)
            .await?
            .rows_affected;
        report.products_deleted = Product::delete_many()
            .filter(product::Column::ProducerId.eq(producer_id))
            .exec(&txn)
            .await?
            .rows_affected;
    }
    Producer::delete_by_id(producer_id).exec(&txn).await?;
    txn.commit().await?;

    info!(
        "Producer with ID {} deleted along with {} products and {} orders",
        producer_id, report.products_deleted, report.orders_deleted
    );
    Ok(report)
}
