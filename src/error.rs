//! HTTP mapping of service failures.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use service::ServiceError;
use thiserror::Error;
use tracing::{debug, error, warn};

use crate::schemas::ErrorResponse;

/// Error returned by every handler.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Service(#[from] ServiceError),

    /// Missing, malformed or expired bearer token
    #[error("Authentication credentials were not provided or are invalid")]
    Unauthenticated,
}

/// Bodies that are not JSON, or do not fit the target type, are bad input.
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        debug!("Rejected request body: {}", rejection.body_text());
        ApiError::Service(ServiceError::InvalidInput(rejection.body_text()))
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Unauthenticated => StatusCode::UNAUTHORIZED,
            ApiError::Service(err) => match err {
                ServiceError::NotFound { .. } => StatusCode::NOT_FOUND,
                ServiceError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
                ServiceError::PermissionDenied(_) => StatusCode::FORBIDDEN,
                ServiceError::InvalidInput(_) => StatusCode::BAD_REQUEST,
                ServiceError::IdentityConflict(_) => StatusCode::CONFLICT,
                ServiceError::InvalidCredentials => StatusCode::UNAUTHORIZED,
                ServiceError::Database(_) | ServiceError::PasswordHash(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ApiError::Unauthenticated => "UNAUTHENTICATED",
            ApiError::Service(err) => match err {
                ServiceError::NotFound { .. } => "NOT_FOUND",
                ServiceError::Validation(_) => "VALIDATION_ERROR",
                ServiceError::PermissionDenied(_) => "PERMISSION_DENIED",
                ServiceError::InvalidInput(_) => "INVALID_INPUT",
                ServiceError::IdentityConflict(_) => "IDENTITY_CONFLICT",
                ServiceError::InvalidCredentials => "INVALID_CREDENTIALS",
                ServiceError::Database(_) | ServiceError::PasswordHash(_) => "INTERNAL_ERROR",
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let code = self.code().to_string();

        let body = match self {
            ApiError::Service(ServiceError::Validation(fields)) => ErrorResponse {
                error: "Validation failed".to_string(),
                code,
                success: false,
                fields: Some(fields),
            },
            ApiError::Service(err @ (ServiceError::Database(_) | ServiceError::PasswordHash(_))) => {
                error!("Request failed: {}", err);
                ErrorResponse {
                    error: "Internal server error".to_string(),
                    code,
                    success: false,
                    fields: None,
                }
            }
            other => {
                warn!("Request rejected with {}: {}", status, other);
                ErrorResponse {
                    error: other.to_string(),
                    code,
                    success: false,
                    fields: None,
                }
            }
        };

        (status, Json(body)).into_response()
    }
}
