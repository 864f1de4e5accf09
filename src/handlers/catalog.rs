use axum::{extract::State, response::Json};
use serde::{Deserialize, Serialize};
use service::catalog::catalog_summary;
use tracing::instrument;
use utoipa::ToSchema;

use super::products::ProductResponse;
use crate::error::ApiError;
use crate::schemas::{ApiResponse, AppState};

/// Landing page: a handful of products plus catalog size
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CatalogResponse {
    pub featured: Vec<ProductResponse>,
    pub producers_count: u64,
    pub products_count: u64,
}

/// Get the catalog summary
#[utoipa::path(
    get,
    path = "/api/v1/catalog",
    tag = "catalog",
    responses(
        (status = 200, description = "Catalog summary retrieved successfully", body = ApiResponse<CatalogResponse>),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_catalog(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<CatalogResponse>>, ApiError> {
    let summary = catalog_summary(&state.db).await?;
    Ok(Json(ApiResponse::new(
        CatalogResponse {
            featured: summary
                .featured
                .into_iter()
                .map(ProductResponse::from)
                .collect(),
            producers_count: summary.producers_count,
            products_count: summary.products_count,
        },
        "Catalog retrieved successfully",
    )))
}
