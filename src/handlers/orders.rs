use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use chrono::{DateTime, Utc};
use model::entities::order::{self, OrderStatus};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use service::forms::{OrderForm, OrderStatusForm, to_money};
use service::orders as workflow;
use tracing::{debug, instrument, trace};
use utoipa::ToSchema;

use crate::error::ApiError;
use crate::extractors::{AppJson, CurrentUser};
use crate::schemas::{ApiResponse, AppState};

/// Order response model
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct OrderResponse {
    pub id: i32,
    pub customer_id: i32,
    pub product_id: i32,
    pub quantity: i32,
    pub order_date: DateTime<Utc>,
    pub status: OrderStatus,
    pub status_label: String,
    /// Price times quantity at the moment the order was placed
    pub total_price: Decimal,
}

impl From<order::Model> for OrderResponse {
    fn from(model: order::Model) -> Self {
        Self {
            id: model.id,
            customer_id: model.customer_id,
            product_id: model.product_id,
            quantity: model.quantity,
            order_date: model.order_date,
            status: model.status,
            status_label: model.status.label().to_string(),
            total_price: to_money(model.total_price),
        }
    }
}

/// Place an order
#[utoipa::path(
    post,
    path = "/api/v1/orders",
    tag = "orders",
    security(("bearer" = [])),
    request_body = OrderForm,
    responses(
        (status = 201, description = "Order placed successfully", body = ApiResponse<OrderResponse>),
        (status = 400, description = "Invalid quantity", body = ErrorResponse),
        (status = 401, description = "Not signed in", body = ErrorResponse),
        (status = 404, description = "Product not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn create_order(
    current: CurrentUser,
    State(state): State<AppState>,
    AppJson(request): AppJson<OrderForm>,
) -> Result<(StatusCode, Json<ApiResponse<OrderResponse>>), ApiError> {
    trace!("Entering create_order handler");
    let order_model = workflow::create_order(
        &state.db,
        current.user_id,
        request.product_id,
        request.quantity,
    )
    .await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(
            OrderResponse::from(order_model),
            "Order placed successfully",
        )),
    ))
}

/// List the signed-in user's orders, newest first
#[utoipa::path(
    get,
    path = "/api/v1/orders",
    tag = "orders",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Orders retrieved successfully", body = ApiResponse<Vec<OrderResponse>>),
        (status = 401, description = "Not signed in", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_orders(
    current: CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<OrderResponse>>>, ApiError> {
    let orders: Vec<OrderResponse> = workflow::list_orders(&state.db, current.user_id)
        .await?
        .into_iter()
        .map(OrderResponse::from)
        .collect();
    debug!("{} has {} orders", current.user_id, orders.len());
    Ok(Json(ApiResponse::new(orders, "Orders retrieved successfully")))
}

/// Get one of the signed-in user's orders
#[utoipa::path(
    get,
    path = "/api/v1/orders/{order_id}",
    tag = "orders",
    security(("bearer" = [])),
    params(
        ("order_id" = i32, Path, description = "Order ID"),
    ),
    responses(
        (status = 200, description = "Order retrieved successfully", body = ApiResponse<OrderResponse>),
        (status = 401, description = "Not signed in", body = ErrorResponse),
        (status = 403, description = "Order belongs to someone else", body = ErrorResponse),
        (status = 404, description = "Order not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_order(
    current: CurrentUser,
    Path(order_id): Path<i32>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<OrderResponse>>, ApiError> {
    let order_model = workflow::get_order(&state.db, current.user_id, order_id).await?;
    Ok(Json(ApiResponse::new(
        OrderResponse::from(order_model),
        "Order retrieved successfully",
    )))
}

/// Change the status of one of the signed-in user's orders
#[utoipa::path(
    put,
    path = "/api/v1/orders/{order_id}/status",
    tag = "orders",
    security(("bearer" = [])),
    params(
        ("order_id" = i32, Path, description = "Order ID"),
    ),
    request_body = OrderStatusForm,
    responses(
        (status = 200, description = "Order status updated", body = ApiResponse<OrderResponse>),
        (status = 401, description = "Not signed in", body = ErrorResponse),
        (status = 403, description = "Order belongs to someone else", body = ErrorResponse),
        (status = 404, description = "Order not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn update_order_status(
    current: CurrentUser,
    Path(order_id): Path<i32>,
    State(state): State<AppState>,
    AppJson(request): AppJson<OrderStatusForm>,
) -> Result<Json<ApiResponse<OrderResponse>>, ApiError> {
    let order_model =
        workflow::update_order_status(&state.db, current.user_id, order_id, request.status)
            .await?;
    Ok(Json(ApiResponse::new(
        OrderResponse::from(order_model),
        "Order status updated successfully",
    )))
}
