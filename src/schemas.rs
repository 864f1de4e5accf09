use std::collections::BTreeMap;

use model::entities::{order::OrderStatus, product::Rarity};
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use service::forms::{
    LoginForm, OrderForm, OrderStatusForm, ProducerChanges, ProducerForm, ProductChanges,
    ProductForm, ProfileForm, RegistrationForm,
};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi, ToSchema};

use crate::handlers::{
    auth::SessionResponse,
    catalog::CatalogResponse,
    orders::OrderResponse,
    producers::{ProducerDeletedResponse, ProducerResponse},
    products::{ProductDeletedResponse, ProductResponse},
    profile::{CustomerResponse, ProfileDeletedResponse, ProfileResponse, UserResponse},
};
use crate::session::SessionStore;

/// Application state shared across handlers
#[derive(Clone, Debug)]
pub struct AppState {
    /// Database connection
    pub db: DatabaseConnection,
    /// Bearer token sessions
    pub sessions: SessionStore,
}

/// API response wrapper
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiResponse<T> {
    /// Response data
    pub data: T,
    /// Response message
    pub message: String,
    /// Success status
    pub success: bool,
}

impl<T> ApiResponse<T> {
    pub fn new(data: T, message: impl Into<String>) -> Self {
        Self {
            data,
            message: message.into(),
            success: true,
        }
    }
}

/// Error response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
    /// Error code
    pub code: String,
    /// Success status (always false for errors)
    pub success: bool,
    /// Field name to message, present on validation errors
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fields: Option<BTreeMap<String, String>>,
}

/// Health check response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    /// Service status
    pub status: String,
    /// Service version
    pub version: String,
    /// Database connection status
    pub database: String,
}

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer",
                SecurityScheme::Http(HttpBuilder::new().scheme(HttpAuthScheme::Bearer).build()),
            );
        }
    }
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::health::health_check,
        crate::handlers::catalog::get_catalog,
        crate::handlers::producers::create_producer,
        crate::handlers::producers::get_producers,
        crate::handlers::producers::get_producer,
        crate::handlers::producers::update_producer,
        crate::handlers::producers::delete_producer,
        crate::handlers::producers::get_producer_products,
        crate::handlers::products::create_product,
        crate::handlers::products::get_products,
        crate::handlers::products::get_product,
        crate::handlers::products::update_product,
        crate::handlers::products::delete_product,
        crate::handlers::auth::register,
        crate::handlers::auth::login,
        crate::handlers::auth::logout,
        crate::handlers::profile::get_profile,
        crate::handlers::profile::update_profile,
        crate::handlers::profile::delete_profile,
        crate::handlers::orders::create_order,
        crate::handlers::orders::get_orders,
        crate::handlers::orders::get_order,
        crate::handlers::orders::update_order_status,
    ),
    components(
        schemas(
            ApiResponse<CatalogResponse>,
            ApiResponse<ProducerResponse>,
            ApiResponse<Vec<ProducerResponse>>,
            ApiResponse<ProductResponse>,
            ApiResponse<Vec<ProductResponse>>,
            ApiResponse<SessionResponse>,
            ApiResponse<ProfileResponse>,
            ApiResponse<OrderResponse>,
            ApiResponse<Vec<OrderResponse>>,
            ErrorResponse,
            HealthResponse,
            CatalogResponse,
            ProducerResponse,
            ProducerDeletedResponse,
            ProductResponse,
            ProductDeletedResponse,
            SessionResponse,
            UserResponse,
            CustomerResponse,
            ProfileResponse,
            ProfileDeletedResponse,
            OrderResponse,
            ProducerForm,
            ProducerChanges,
            ProductForm,
            ProductChanges,
            RegistrationForm,
            LoginForm,
            ProfileForm,
            OrderForm,
            OrderStatusForm,
            Rarity,
            OrderStatus,
        )
    ),
    modifiers(&BearerAuth),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "catalog", description = "Landing page summary"),
        (name = "producers", description = "Producer management endpoints"),
        (name = "products", description = "Product management endpoints"),
        (name = "auth", description = "Registration and sessions"),
        (name = "profile", description = "The signed-in user's profile"),
        (name = "orders", description = "Order placement and tracking"),
    ),
    info(
        title = "TailorConnect API",
        description = "Marketplace connecting artisan producers with customers",
        version = "0.1.0",
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        )
    )
)]
pub struct ApiDoc;
