pub mod auth;
pub mod catalog;
pub mod health;
pub mod orders;
pub mod producers;
pub mod products;
pub mod profile;
