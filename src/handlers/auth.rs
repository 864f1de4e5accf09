use axum::{extract::State, http::StatusCode, response::Json};
use serde::{Deserialize, Serialize};
use service::UserId;
use service::accounts;
use service::forms::{LoginForm, RegistrationForm};
use tracing::{info, instrument};
use utoipa::ToSchema;

use super::profile::UserResponse;
use crate::error::ApiError;
use crate::extractors::{AppJson, CurrentUser};
use crate::schemas::{ApiResponse, AppState};

/// A freshly opened session
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SessionResponse {
    /// Send as `Authorization: Bearer <token>`
    pub token: String,
    pub user: UserResponse,
}

/// Register a new account and sign in
#[utoipa::path(
    post,
    path = "/api/v1/auth/register",
    tag = "auth",
    request_body = RegistrationForm,
    responses(
        (status = 201, description = "Account created", body = ApiResponse<SessionResponse>),
        (status = 409, description = "Username or email already taken", body = ErrorResponse),
        (status = 422, description = "Validation failed", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state, request))]
pub async fn register(
    State(state): State<AppState>,
    AppJson(request): AppJson<RegistrationForm>,
) -> Result<(StatusCode, Json<ApiResponse<SessionResponse>>), ApiError> {
    let user_model = accounts::register(&state.db, request).await?;
    let token = state.sessions.open(UserId::from(&user_model)).await;
    info!("Registered and signed in user {}", user_model.id);
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(
            SessionResponse {
                token,
                user: UserResponse::from(user_model),
            },
            "Account created successfully",
        )),
    ))
}

/// Sign in with username and password
#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    tag = "auth",
    request_body = LoginForm,
    responses(
        (status = 200, description = "Signed in", body = ApiResponse<SessionResponse>),
        (status = 401, description = "Invalid username or password", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state, request))]
pub async fn login(
    State(state): State<AppState>,
    AppJson(request): AppJson<LoginForm>,
) -> Result<Json<ApiResponse<SessionResponse>>, ApiError> {
    let user_model = accounts::authenticate(&state.db, &request.username, &request.password).await?;
    let token = state.sessions.open(UserId::from(&user_model)).await;
    Ok(Json(ApiResponse::new(
        SessionResponse {
            token,
            user: UserResponse::from(user_model),
        },
        "Signed in successfully",
    )))
}

/// End the current session
#[utoipa::path(
    post,
    path = "/api/v1/auth/logout",
    tag = "auth",
    security(("bearer" = [])),
    responses(
        (status = 204, description = "Signed out"),
        (status = 401, description = "Not signed in", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn logout(current: CurrentUser, State(state): State<AppState>) -> StatusCode {
    state.sessions.close(&current.token).await;
    info!("{} signed out", current.user_id);
    StatusCode::NO_CONTENT
}
