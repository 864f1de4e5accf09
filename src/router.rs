use crate::handlers::{
    auth::{login, logout, register},
    catalog::get_catalog,
    health::health_check,
    orders::{create_order, get_order, get_orders, update_order_status},
    producers::{
        create_producer, delete_producer, get_producer, get_producer_products, get_producers,
        update_producer,
    },
    products::{create_product, delete_product, get_product, get_products, update_product},
    profile::{delete_profile, get_profile, update_profile},
};
use crate::schemas::{ApiDoc, AppState};
use axum::{
    Router,
    routing::{get, post, put},
};
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer, cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Create application router with all routes and middleware
pub fn create_router(state: AppState) -> Router {
    let router = Router::new()
        // Health check
        .route("/health", get(health_check))
        // Landing page
        .route("/api/v1/catalog", get(get_catalog))
        // Producer CRUD routes
        .route("/api/v1/producers", get(get_producers).post(create_producer))
        .route(
            "/api/v1/producers/:producer_id",
            get(get_producer).put(update_producer).delete(delete_producer),
        )
        .route(
            "/api/v1/producers/:producer_id/products",
            get(get_producer_products),
        )
        // Product CRUD routes
        .route("/api/v1/products", get(get_products).post(create_product))
        .route(
            "/api/v1/products/:product_id",
            get(get_product).put(update_product).delete(delete_product),
        )
        // Accounts and sessions
        .route("/api/v1/auth/register", post(register))
        .route("/api/v1/auth/login", post(login))
        .route("/api/v1/auth/logout", post(logout))
        .route(
            "/api/v1/profile",
            get(get_profile).put(update_profile).delete(delete_profile),
        )
        // Orders
        .route("/api/v1/orders", get(get_orders).post(create_order))
        .route("/api/v1/orders/:order_id", get(get_order))
        .route("/api/v1/orders/:order_id/status", put(update_order_status))
        // Swagger UI
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()));

    // The Prometheus recorder is process global, so it is only installed
    // outside of tests where many routers are built in one process.
    #[cfg(not(test))]
    let router = {
        let (prometheus_layer, metric_handle) = axum_prometheus::PrometheusMetricLayer::pair();
        router
            .route("/metrics", get(move || async move { metric_handle.render() }))
            .layer(prometheus_layer)
    };

    router
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CompressionLayer::new())
                .layer(TimeoutLayer::new(Duration::from_secs(30)))
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}
