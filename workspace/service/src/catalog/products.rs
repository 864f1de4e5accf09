use chrono::Utc;
use model::entities::{order, prelude::*, product};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use tracing::{debug, info, instrument, trace, warn};

use super::{CascadeReport, Page, ProductFilter};
use crate::error::{Result, ServiceError, log_db};
use crate::forms::{ProductChanges, ProductForm};

const UNKNOWN_PRODUCER: &str =
    "Select a valid choice. That choice is not one of the available choices.";

/// Field rules plus the producer reference, reported together.
async fn check_product<C: ConnectionTrait>(db: &C, form: &ProductForm) -> Result<()> {
    let mut errors = form.field_errors();
    if Producer::find_by_id(form.producer_id).one(db).await?.is_none() {
        debug!("Product references unknown producer {}", form.producer_id);
        errors.insert("producer_id".to_string(), UNKNOWN_PRODUCER.to_string());
    }
    if errors.is_empty() {
        Ok(())
    } else {
        Err(ServiceError::Validation(errors))
    }
}

/// Validates and stores a new product.
#[instrument(skip(db))]
pub async fn create_product<C: ConnectionTrait>(db: &C, form: ProductForm) -> Result<product::Model> {
    trace!("Entering create_product function");
    let form = form.cleaned();
    check_product(db, &form).await?;

    let new_product = product::ActiveModel {
        name: Set(form.name),
        description: Set(form.description),
        price: Set(form.price),
        prod_date: Set(form.prod_date),
        image: Set(form.image),
        rarity: Set(form.rarity),
        producer_id: Set(form.producer_id),
        created_at: Set(Utc::now()),
        ..Default::default()
    };

    let product_model = new_product
        .insert(db)
        .await
        .map_err(|e| log_db("Failed to create product", e))?;
    info!(
        "Product created successfully with ID: {}, name: {}, producer: {}",
        product_model.id, product_model.name, product_model.producer_id
    );
    Ok(product_model)
}

#[instrument(skip(db))]
pub async fn get_product<C: ConnectionTrait>(db: &C, product_id: i32) -> Result<product::Model> {
    match Product::find_by_id(product_id).one(db).await {
        Ok(Some(product_model)) => Ok(product_model),
        Ok(None) => {
            warn!("Product with ID {} not found", product_id);
            Err(ServiceError::not_found("Product", product_id))
        }
        Err(db_error) => Err(log_db("Failed to retrieve product", db_error)),
    }
}

/// Products matching the filter, oldest first. Without a page every match
/// is returned.
#[instrument(skip(db))]
pub async fn list_products<C: ConnectionTrait>(
    db: &C,
    filter: ProductFilter,
    page: Option<Page>,
) -> Result<Vec<product::Model>> {
    let mut query = Product::find();
    if let Some(producer_id) = filter.producer_id {
        query = query.filter(product::Column::ProducerId.eq(producer_id));
    }
    if let Some(rarity) = filter.rarity {
        query = query.filter(product::Column::Rarity.eq(rarity));
    }
    let query = query.order_by_asc(product::Column::Id);

    let products = match page {
        Some(page) => {
            query
                .paginate(db, page.limit)
                .fetch_page(page.index())
                .await
        }
        None => query.all(db).await,
    }
    .map_err(|e| log_db("Failed to retrieve products", e))?;

    debug!("Retrieved {} products from database", products.len());
    Ok(products)
}

/// Applies a partial update; the stored creation time never changes.
#[instrument(skip(db))]
pub async fn update_product<C: ConnectionTrait>(
    db: &C,
    product_id: i32,
    changes: ProductChanges,
) -> Result<product::Model> {
    trace!("Entering update_product function for product_id: {}", product_id);
    let existing = get_product(db, product_id).await?;
    let form = changes.apply_to(&existing);
    check_product(db, &form).await?;

    let mut product_active: product::ActiveModel = existing.into();
    product_active.name = Set(form.name);
    product_active.description = Set(form.description);
    product_active.price = Set(form.price);
    product_active.prod_date = Set(form.prod_date);
    product_active.image = Set(form.image);
    product_active.rarity = Set(form.rarity);
    product_active.producer_id = Set(form.producer_id);

    let updated = product_active
        .update(db)
        .await
        .map_err(|e| log_db("Failed to update product", e))?;
    info!("Product with ID {} updated successfully", product_id);
    Ok(updated)
}

/// Deletes a product and every order placed for it.
#[instrument(skip(db))]
pub async fn delete_product<C>(db: &C, product_id: i32) -> Result<CascadeReport>
where
    C: ConnectionTrait + TransactionTrait,
{
    trace!("Entering delete_product function for product_id: {}", product_id);
    let txn = db.begin().await?;

    if Product::find_by_id(product_id).one(&txn).await?.is_none() {
        warn!("Product with ID {} not found for deletion", product_id);
        return Err(ServiceError::not_found("Product", product_id));
    }

    let orders_deleted = Order::delete_many()
        .filter(order::Column::ProductId.eq(product_id))
        .exec(&txn)
        .await?
        .rows_affected;
    Product::delete_by_id(product_id).exec(&txn).await?;
    txn.commit().await?;

    info!(
        "Product with ID {} deleted along with {} orders",
        product_id, orders_deleted
    );
    Ok(CascadeReport {
        products_deleted: 1,
        orders_deleted,
    })
}
