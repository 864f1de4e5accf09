//! Producer and product store: CRUD, cascading deletes and the public
//! catalog listings.

pub mod producers;
pub mod products;

use model::entities::{prelude::*, product};
use sea_orm::{ConnectionTrait, EntityTrait, PaginatorTrait, QueryOrder, QuerySelect};
use tracing::{debug, instrument};

use crate::error::{Result, log_db};

/// Number of products shown on the landing page.
pub const FEATURED_PRODUCTS: u64 = 6;

/// What a cascading delete removed besides the target row.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CascadeReport {
    pub products_deleted: u64,
    pub orders_deleted: u64,
}

/// Optional filters for product listings.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProductFilter {
    pub producer_id: Option<i32>,
    pub rarity: Option<product::Rarity>,
}

/// One-based page request.
#[derive(Debug, Clone, Copy)]
pub struct Page {
    pub page: u64,
    pub limit: u64,
}

impl Page {
    /// Zero-based index as the paginator expects it.
    pub(crate) fn index(&self) -> u64 {
        self.page.saturating_sub(1)
    }
}

/// Landing page data.
#[derive(Debug, Clone)]
pub struct CatalogSummary {
    pub featured: Vec<product::Model>,
    pub producers_count: u64,
    pub products_count: u64,
}

/// Featured products plus producer and product counts.
#[instrument(skip(db))]
pub async fn catalog_summary<C: ConnectionTrait>(db: &C) -> Result<CatalogSummary> {
    let featured = Product::find()
        .order_by_asc(product::Column::Id)
        .limit(FEATURED_PRODUCTS)
        .all(db)
        .await
        .map_err(|e| log_db("Failed to load featured products", e))?;
    let producers_count = Producer::find()
        .count(db)
        .await
        .map_err(|e| log_db("Failed to count producers", e))?;
    let products_count = Product::find()
        .count(db)
        .await
        .map_err(|e| log_db("Failed to count products", e))?;

    debug!(
        "Catalog summary: {} featured, {} producers, {} products",
        featured.len(),
        producers_count,
        products_count
    );
    Ok(CatalogSummary {
        featured,
        producers_count,
        products_count,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{seed_producer, seed_product, setup_db};
    use rust_decimal::Decimal;

    #[tokio::test]
    async fn test_catalog_summary_counts_and_caps_featured() {
        let db = setup_db().await;
        let maker = seed_producer(&db, "Acme").await;
        seed_producer(&db, "Loom & Co").await;
        for i in 0..8 {
            seed_product(&db, maker.id, &format!("Item {i}"), Decimal::new(1000 + i, 2)).await;
        }

        let summary = catalog_summary(&db).await.unwrap();
        assert_eq!(summary.producers_count, 2);
        assert_eq!(summary.products_count, 8);
        assert_eq!(summary.featured.len(), FEATURED_PRODUCTS as usize);
        assert_eq!(summary.featured[0].name, "Item 0");
    }

    #[tokio::test]
    async fn test_empty_catalog_summary() {
        let db = setup_db().await;
        let summary = catalog_summary(&db).await.unwrap();
        assert!(summary.featured.is_empty());
        assert_eq!(summary.producers_count, 0);
        assert_eq!(summary.products_count, 0);
    }
}
