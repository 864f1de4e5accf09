use axum::{extract::State, response::Json};
use chrono::{DateTime, Utc};
use model::entities::{customer, user};
use serde::{Deserialize, Serialize};
use service::accounts::{self, Profile};
use service::forms::ProfileForm;
use tracing::{info, instrument};
use utoipa::ToSchema;

use super::orders::OrderResponse;
use crate::error::ApiError;
use crate::extractors::{AppJson, CurrentUser};
use crate::schemas::{ApiResponse, AppState};

/// Public view of a user; never carries the password hash
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UserResponse {
    pub id: i32,
    pub username: String,
    pub email: String,
    pub date_joined: DateTime<Utc>,
}

impl From<user::Model> for UserResponse {
    fn from(model: user::Model) -> Self {
        Self {
            id: model.id,
            username: model.username,
            email: model.email,
            date_joined: model.date_joined,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CustomerResponse {
    pub id: i32,
    pub user_id: i32,
    pub contact_info: String,
    pub location: String,
}

impl From<customer::Model> for CustomerResponse {
    fn from(model: customer::Model) -> Self {
        Self {
            id: model.id,
            user_id: model.user_id,
            contact_info: model.contact_info,
            location: model.location,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ProfileResponse {
    pub user: UserResponse,
    pub customer: CustomerResponse,
    /// Newest first
    pub orders: Vec<OrderResponse>,
}

impl From<Profile> for ProfileResponse {
    fn from(profile: Profile) -> Self {
        Self {
            user: UserResponse::from(profile.user),
            customer: CustomerResponse::from(profile.customer),
            orders: profile.orders.into_iter().map(OrderResponse::from).collect(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ProfileDeletedResponse {
    pub orders_deleted: u64,
}

/// Get the signed-in user's profile
#[utoipa::path(
    get,
    path = "/api/v1/profile",
    tag = "profile",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Profile retrieved successfully", body = ApiResponse<ProfileResponse>),
        (status = 401, description = "Not signed in", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_profile(
    current: CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<ProfileResponse>>, ApiError> {
    let profile = accounts::profile(&state.db, current.user_id).await?;
    Ok(Json(ApiResponse::new(
        ProfileResponse::from(profile),
        "Profile retrieved successfully",
    )))
}

/// Update contact details and email
#[utoipa::path(
    put,
    path = "/api/v1/profile",
    tag = "profile",
    security(("bearer" = [])),
    request_body = ProfileForm,
    responses(
        (status = 200, description = "Profile updated successfully", body = ApiResponse<ProfileResponse>),
        (status = 401, description = "Not signed in", body = ErrorResponse),
        (status = 422, description = "Validation failed", body = ErrorResponse),
        (status = 409, description = "Email already in use", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn update_profile(
    current: CurrentUser,
    State(state): State<AppState>,
    AppJson(request): AppJson<ProfileForm>,
) -> Result<Json<ApiResponse<ProfileResponse>>, ApiError> {
    let profile = accounts::update_profile(&state.db, current.user_id, request).await?;
    Ok(Json(ApiResponse::new(
        ProfileResponse::from(profile),
        "Profile updated successfully",
    )))
}

/// Delete the customer profile and its orders; the account stays
#[utoipa::path(
    delete,
    path = "/api/v1/profile",
    tag = "profile",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Profile deleted successfully", body = ApiResponse<ProfileDeletedResponse>),
        (status = 401, description = "Not signed in", body = ErrorResponse),
        (status = 404, description = "No profile to delete", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn delete_profile(
    current: CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<ProfileDeletedResponse>>, ApiError> {
    let orders_deleted = accounts::delete_profile(&state.db, current.user_id).await?;
    info!(
        "Profile of {} deleted with {} orders",
        current.user_id, orders_deleted
    );
    Ok(Json(ApiResponse::new(
        ProfileDeletedResponse { orders_deleted },
        "Profile deleted successfully",
    )))
}
