//! Root of the SeaORM entity modules.
//! The marketplace data model: producers own products, customers place
//! orders for products, and every customer belongs to one user.

pub mod customer;
pub mod order;
pub mod producer;
pub mod product;
pub mod user;

pub mod prelude {
    //! A prelude module for easy importing of all entities.
    pub use super::customer::Entity as Customer;
    pub use super::order::Entity as Order;
    pub use super::producer::Entity as Producer;
    pub use super::product::Entity as Product;
    pub use super::user::Entity as User;
}
