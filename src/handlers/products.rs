use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use axum_valid::Valid;
use chrono::{DateTime, NaiveDate, Utc};
use model::entities::product::{self, Rarity};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use service::catalog::{Page, ProductFilter, products as store};
use service::forms::{ProductChanges, ProductForm, to_money};
use tracing::{debug, info, instrument, trace};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::error::ApiError;
use crate::extractors::AppJson;
use crate::schemas::{ApiResponse, AppState};

/// Query parameters for listing products
#[derive(Debug, Deserialize, ToSchema, IntoParams, Validate)]
pub struct ProductQuery {
    /// Only products of this producer
    pub producer_id: Option<i32>,
    /// Only products of this rarity
    pub rarity: Option<Rarity>,
    /// Page number, starting at 1. Without it every match is returned.
    #[validate(range(min = 1, max = 10000))]
    pub page: Option<u64>,
    /// Page size (default: 20)
    #[validate(range(min = 1, max = 100))]
    pub limit: Option<u64>,
}

impl ProductQuery {
    fn page(&self) -> Option<Page> {
        match (self.page, self.limit) {
            (None, None) => None,
            (page, limit) => Some(Page {
                page: page.unwrap_or(1),
                limit: limit.unwrap_or(20),
            }),
        }
    }
}

/// Product response model
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ProductResponse {
    pub id: i32,
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub prod_date: NaiveDate,
    pub image: Option<String>,
    pub rarity: Rarity,
    /// Human readable rarity, e.g. "Limited Edition"
    pub rarity_label: String,
    pub producer_id: i32,
    pub created_at: DateTime<Utc>,
}

impl From<product::Model> for ProductResponse {
    fn from(model: product::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            description: model.description,
            price: to_money(model.price),
            prod_date: model.prod_date,
            image: model.image,
            rarity: model.rarity,
            rarity_label: model.rarity.label().to_string(),
            producer_id: model.producer_id,
            created_at: model.created_at,
        }
    }
}

/// What went with a deleted product
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ProductDeletedResponse {
    pub id: i32,
    pub orders_deleted: u64,
}

/// Create a new product
#[utoipa::path(
    post,
    path = "/api/v1/products",
    tag = "products",
    request_body = ProductForm,
    responses(
        (status = 201, description = "Product created successfully", body = ApiResponse<ProductResponse>),
        (status = 422, description = "Validation failed", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn create_product(
    State(state): State<AppState>,
    AppJson(request): AppJson<ProductForm>,
) -> Result<(StatusCode, Json<ApiResponse<ProductResponse>>), ApiError> {
    trace!("Entering create_product handler");
    let product_model = store::create_product(&state.db, request).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(
            ProductResponse::from(product_model),
            "Product created successfully",
        )),
    ))
}

/// Get products, optionally filtered and paginated
#[utoipa::path(
    get,
    path = "/api/v1/products",
    tag = "products",
    params(ProductQuery),
    responses(
        (status = 200, description = "Products retrieved successfully", body = ApiResponse<Vec<ProductResponse>>),
        (status = 400, description = "Invalid query parameters"),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_products(
    Valid(Query(query)): Valid<Query<ProductQuery>>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<ProductResponse>>>, ApiError> {
    let filter = ProductFilter {
        producer_id: query.producer_id,
        rarity: query.rarity,
    };
    let page = query.page();
    debug!("Listing products with {:?}, page {:?}", filter, page);

    let products: Vec<ProductResponse> = store::list_products(&state.db, filter, page)
        .await?
        .into_iter()
        .map(ProductResponse::from)
        .collect();
    info!("Successfully retrieved {} products", products.len());
    Ok(Json(ApiResponse::new(
        products,
        "Products retrieved successfully",
    )))
}

/// Get a specific product by ID
#[utoipa::path(
    get,
    path = "/api/v1/products/{product_id}",
    tag = "products",
    params(
        ("product_id" = i32, Path, description = "Product ID"),
    ),
    responses(
        (status = 200, description = "Product retrieved successfully", body = ApiResponse<ProductResponse>),
        (status = 404, description = "Product not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_product(
    Path(product_id): Path<i32>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<ProductResponse>>, ApiError> {
    let product_model = store::get_product(&state.db, product_id).await?;
    Ok(Json(ApiResponse::new(
        ProductResponse::from(product_model),
        "Product retrieved successfully",
    )))
}

/// Update a product; absent fields keep their value
#[utoipa::path(
    put,
    path = "/api/v1/products/{product_id}",
    tag = "products",
    params(
        ("product_id" = i32, Path, description = "Product ID"),
    ),
    request_body = ProductChanges,
    responses(
        (status = 200, description = "Product updated successfully", body = ApiResponse<ProductResponse>),
        (status = 404, description = "Product not found", body = ErrorResponse),
        (status = 422, description = "Validation failed", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn update_product(
    Path(product_id): Path<i32>,
    State(state): State<AppState>,
    AppJson(request): AppJson<ProductChanges>,
) -> Result<Json<ApiResponse<ProductResponse>>, ApiError> {
    trace!("Entering update_product handler for product_id: {}", product_id);
    let product_model = store::update_product(&state.db, product_id, request).await?;
    Ok(Json(ApiResponse::new(
        ProductResponse::from(product_model),
        "Product updated successfully",
    )))
}

/// Delete a product and its orders
#[utoipa::path(
    delete,
    path = "/api/v1/products/{product_id}",
    tag = "products",
    params(
        ("product_id" = i32, Path, description = "Product ID"),
    ),
    responses(
        (status = 200, description = "Product deleted successfully", body = ApiResponse<ProductDeletedResponse>),
        (status = 404, description = "Product not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn delete_product(
    Path(product_id): Path<i32>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<ProductDeletedResponse>>, ApiError> {
    let report = store::delete_product(&state.db, product_id).await?;
    Ok(Json(ApiResponse::new(
        ProductDeletedResponse {
            id: product_id,
            orders_deleted: report.orders_deleted,
        },
        "Product deleted successfully",
    )))
}
