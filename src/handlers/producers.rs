use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use chrono::{DateTime, Utc};
use model::entities::producer;
use serde::{Deserialize, Serialize};
use service::catalog::producers as store;
use service::forms::{ProducerChanges, ProducerForm};
use tracing::{debug, info, instrument, trace};
use utoipa::ToSchema;

use super::products::ProductResponse;
use crate::error::ApiError;
use crate::extractors::AppJson;
use crate::schemas::{ApiResponse, AppState};

/// Producer response model
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ProducerResponse {
    pub id: i32,
    pub name: String,
    pub contact_info: String,
    pub email: String,
    pub location: String,
    pub bio: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<producer::Model> for ProducerResponse {
    fn from(model: producer::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            contact_info: model.contact_info,
            email: model.email,
            location: model.location,
            bio: model.bio,
            created_at: model.created_at,
        }
    }
}

/// What went with a deleted producer
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ProducerDeletedResponse {
    pub id: i32,
    pub products_deleted: u64,
    pub orders_deleted: u64,
}

/// Create a new producer
#[utoipa::path(
    post,
    path = "/api/v1/producers",
    tag = "producers",
    request_body = ProducerForm,
    responses(
        (status = 201, description = "Producer created successfully", body = ApiResponse<ProducerResponse>),
        (status = 422, description = "Validation failed", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn create_producer(
    State(state): State<AppState>,
    AppJson(request): AppJson<ProducerForm>,
) -> Result<(StatusCode, Json<ApiResponse<ProducerResponse>>), ApiError> {
    trace!("Entering create_producer handler");
    let producer_model = store::create_producer(&state.db, request).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(
            ProducerResponse::from(producer_model),
            "Producer created successfully",
        )),
    ))
}

/// Get all producers
#[utoipa::path(
    get,
    path = "/api/v1/producers",
    tag = "producers",
    responses(
        (status = 200, description = "Producers retrieved successfully", body = ApiResponse<Vec<ProducerResponse>>),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_producers(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<ProducerResponse>>>, ApiError> {
    let producers: Vec<ProducerResponse> = store::list_producers(&state.db)
        .await?
        .into_iter()
        .map(ProducerResponse::from)
        .collect();
    info!("Successfully retrieved {} producers", producers.len());
    Ok(Json(ApiResponse::new(
        producers,
        "Producers retrieved successfully",
    )))
}

/// Get a specific producer by ID
#[utoipa::path(
    get,
    path = "/api/v1/producers/{producer_id}",
    tag = "producers",
    params(
        ("producer_id" = i32, Path, description = "Producer ID"),
    ),
    responses(
        (status = 200, description = "Producer retrieved successfully", body = ApiResponse<ProducerResponse>),
        (status = 404, description = "Producer not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_producer(
    Path(producer_id): Path<i32>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<ProducerResponse>>, ApiError> {
    let producer_model = store::get_producer(&state.db, producer_id).await?;
    Ok(Json(ApiResponse::new(
        ProducerResponse::from(producer_model),
        "Producer retrieved successfully",
    )))
}

/// Update a producer; absent fields keep their value
#[utoipa::path(
    put,
    path = "/api/v1/producers/{producer_id}",
    tag = "producers",
    params(
        ("producer_id" = i32, Path, description = "Producer ID"),
    ),
    request_body = ProducerChanges,
    responses(
        (status = 200, description = "Producer updated successfully", body = ApiResponse<ProducerResponse>),
        (status = 404, description = "Producer not found", body = ErrorResponse),
        (status = 422, description = "Validation failed", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn update_producer(
    Path(producer_id): Path<i32>,
    State(state): State<AppState>,
    AppJson(request): AppJson<ProducerChanges>,
) -> Result<Json<ApiResponse<ProducerResponse>>, ApiError> {
    trace!("Entering update_producer handler for producer_id: {}", producer_id);
    let producer_model = store::update_producer(&state.db, producer_id, request).await?;
    Ok(Json(ApiResponse::new(
        ProducerResponse::from(producer_model),
        "Producer updated successfully",
    )))
}

/// Delete a producer with its products and their orders
#[utoipa::path(
    delete,
    path = "/api/v1/producers/{producer_id}",
    tag = "producers",
    params(
        ("producer_id" = i32, Path, description = "Producer ID"),
    ),
    responses(
        (status = 200, description = "Producer deleted successfully", body = ApiResponse<ProducerDeletedResponse>),
        (status = 404, description = "Producer not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn delete_producer(
    Path(producer_id): Path<i32>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<ProducerDeletedResponse>>, ApiError> {
    let report = store::delete_producer(&state.db, producer_id).await?;
    debug!("Producer {} cascade: {:?}", producer_id, report);
    Ok(Json(ApiResponse::new(
        ProducerDeletedResponse {
            id: producer_id,
            products_deleted: report.products_deleted,
            orders_deleted: report.orders_deleted,
        },
        "Producer deleted successfully",
    )))
}

/// Get the products of a producer
#[utoipa::path(
    get,
    path = "/api/v1/producers/{producer_id}/products",
    tag = "producers",
    params(
        ("producer_id" = i32, Path, description = "Producer ID"),
    ),
    responses(
        (status = 200, description = "Products retrieved successfully", body = ApiResponse<Vec<ProductResponse>>),
        (status = 404, description = "Producer not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_producer_products(
    Path(producer_id): Path<i32>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<ProductResponse>>>, ApiError> {
    let products: Vec<ProductResponse> = store::list_producer_products(&state.db, producer_id)
        .await?
        .into_iter()
        .map(ProductResponse::from)
        .collect();
    Ok(Json(ApiResponse::new(
        products,
        "Products retrieved successfully",
    )))
}
