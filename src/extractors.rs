use std::fmt;

use axum::{
    extract::{FromRequest, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts},
};
use service::UserId;
use tracing::debug;

use crate::error::ApiError;
use crate::schemas::AppState;

/// JSON request body whose rejections are reported in the error envelope.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct AppJson<T>(pub T);

/// The user behind the request's `Authorization: Bearer <token>` header.
#[derive(Clone)]
pub struct CurrentUser {
    pub user_id: UserId,
    pub token: String,
}

impl fmt::Debug for CurrentUser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CurrentUser")
            .field("user_id", &self.user_id)
            .field("token", &"<redacted>")
            .finish()
    }
}

fn bearer_token(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

#[axum::async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let Some(token) = bearer_token(parts) else {
            debug!("Request without bearer token");
            return Err(ApiError::Unauthenticated);
        };
        let user_id = state
            .sessions
            .resolve(token)
            .await
            .ok_or(ApiError::Unauthenticated)?;

        Ok(CurrentUser {
            user_id,
            token: token.to_string(),
        })
    }
}
