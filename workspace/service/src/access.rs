//! Ownership checks for order visibility.

use model::entities::{customer, order};
use tracing::warn;

use crate::UserId;
use crate::error::{Result, ServiceError};

/// Allows access only when `owner` is the customer that placed `order` and
/// belongs to `user`.
pub fn authorize_order(
    order: &order::Model,
    owner: Option<&customer::Model>,
    user: UserId,
) -> Result<()> {
    match owner {
        Some(customer) if customer.id == order.customer_id && customer.user_id == user.0 => Ok(()),
        _ => {
            warn!("{} denied access to order {}", user, order.id);
            Err(ServiceError::PermissionDenied(format!(
                "order {} belongs to another customer",
                order.id
            )))
        }
    }
}
