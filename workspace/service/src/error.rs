use std::collections::BTreeMap;

use sea_orm::{DbErr, SqlErr};
use thiserror::Error;
use tracing::error;
use validator::ValidationErrors;

/// Field name -> human readable message, one message per field.
pub type FieldErrors = BTreeMap<String, String>;

/// Error types for the marketplace service layer
#[derive(Error, Debug)]
pub enum ServiceError {
    /// A lookup by primary key found nothing
    #[error("{entity} with id {id} not found")]
    NotFound { entity: &'static str, id: i32 },

    /// One or more fields failed validation; nothing was written
    #[error("Validation failed: {}", describe_fields(.0))]
    Validation(FieldErrors),

    /// The acting identity does not own the resource
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    /// Non-positive quantity, overflowing totals and similar malformed input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Duplicate username/email, or a second customer for the same user
    #[error("Identity conflict: {0}")]
    IdentityConflict(String),

    /// Unknown username or wrong password; deliberately indistinguishable
    #[error("Invalid username or password")]
    InvalidCredentials,

    /// Error from the database operations
    #[error("Database error: {0}")]
    Database(#[from] DbErr),

    /// Error from hashing or parsing a stored password hash
    #[error("Password hashing error: {0}")]
    PasswordHash(String),
}

impl ServiceError {
    pub fn not_found(entity: &'static str, id: i32) -> Self {
        ServiceError::NotFound { entity, id }
    }

    /// Validation error for a single field.
    pub fn field(field: &str, message: impl Into<String>) -> Self {
        let mut fields = FieldErrors::new();
        fields.insert(field.to_string(), message.into());
        ServiceError::Validation(fields)
    }
}

impl From<ValidationErrors> for ServiceError {
    fn from(errors: ValidationErrors) -> Self {
        ServiceError::Validation(field_errors(&errors))
    }
}

/// Flattens validator output into one message per field.
pub fn field_errors(errors: &ValidationErrors) -> FieldErrors {
    errors
        .field_errors()
        .into_iter()
        .filter_map(|(field, errs)| {
            errs.first().map(|err| {
                let message = err
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| err.code.to_string());
                (field.to_string(), message)
            })
        })
        .collect()
}

fn describe_fields(fields: &FieldErrors) -> String {
    fields
        .iter()
        .map(|(field, message)| format!("{field}: {message}"))
        .collect::<Vec<_>>()
        .join("; ")
}

/// True when the database rejected a write because of a unique index.
pub fn is_unique_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}

/// Logs a database failure before handing it back to the caller.
pub(crate) fn log_db(context: &str, err: DbErr) -> ServiceError {
    error!("{}: {}", context, err);
    ServiceError::Database(err)
}

/// Type alias for Result with ServiceError
pub type Result<T> = std::result::Result<T, ServiceError>;
