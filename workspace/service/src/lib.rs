//! Marketplace service layer.
//!
//! Everything between an HTTP handler and the database lives here: form
//! validation, CRUD over the catalog and customers, the order workflow and
//! the ownership checks that gate order visibility. Operations take a
//! database connection and, where an acting user matters, an explicit
//! [`UserId`]. Nothing in this crate reads ambient request state.

pub mod access;
pub mod accounts;
pub mod catalog;
pub mod customers;
pub mod error;
pub mod forms;
pub mod orders;

#[cfg(test)]
pub(crate) mod testing;

use std::fmt;

use model::entities::user;

pub use error::{FieldErrors, Result, ServiceError};

/// Identity of the authenticated user an operation acts for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct UserId(pub i32);

impl From<&user::Model> for UserId {
    fn from(user: &user::Model) -> Self {
        UserId(user.id)
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "user#{}", self.0)
    }
}
