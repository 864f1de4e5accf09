use std::time::Duration;

use axum::Router;
use axum::http::{HeaderName, HeaderValue, header::AUTHORIZATION};
use axum_test::TestServer;
use migration::{Migrator, MigratorTrait};
use sea_orm::{ConnectionTrait, Database, DatabaseConnection};
use serde_json::{Value, json};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use crate::router::create_router;
use crate::schemas::AppState;
use crate::session::SessionStore;

/// Create an in-memory SQLite database for testing
pub async fn setup_test_db() -> DatabaseConnection {
    let db = Database::connect("sqlite::memory:")
        .await
        .expect("Failed to connect to in-memory database");

    db.execute_unprepared("PRAGMA foreign_keys = ON;")
        .await
        .expect("Failed to enable foreign keys");

    // Run migrations
    Migrator::up(&db, None)
        .await
        .expect("Failed to run migrations");

    db
}

/// Create AppState for testing
pub async fn setup_test_app_state() -> AppState {
    let db = setup_test_db().await;
    let sessions = SessionStore::new(100, Duration::from_secs(600));
    AppState { db, sessions }
}

/// Initialize tracing for tests with output to STDERR.
///
/// The log level is determined by the RUST_LOG environment variable,
/// defaulting to WARN if not set.
fn init_test_tracing() -> tracing::subscriber::DefaultGuard {
    let log_level = std::env::var("RUST_LOG")
        .ok()
        .and_then(|level| level.parse::<Level>().ok())
        .unwrap_or(Level::WARN);

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_default(subscriber)
}

/// Create axum app for testing
pub async fn setup_test_app() -> Router {
    let _guard = init_test_tracing();
    let state = setup_test_app_state().await;
    create_router(state)
}

pub async fn setup_test_server() -> TestServer {
    TestServer::new(setup_test_app().await).expect("Failed to start test server")
}

/// `Authorization` header carrying a session token.
pub fn bearer(token: &str) -> (HeaderName, HeaderValue) {
    let value = HeaderValue::from_str(&format!("Bearer {token}")).expect("Invalid token header");
    (AUTHORIZATION, value)
}

/// Registers a user and returns its session token.
pub async fn register_user(server: &TestServer, username: &str) -> String {
    let response = server
        .post("/api/v1/auth/register")
        .json(&json!({
            "username": username,
            "email": format!("{username}@example.com"),
            "password": "needle-and-thread",
            "password_confirmation": "needle-and-thread",
            "contact_info": "+351 900 000 000",
            "location": "Porto",
        }))
        .await;
    response.assert_status(axum::http::StatusCode::CREATED);
    let body: Value = response.json();
    body["data"]["token"]
        .as_str()
        .expect("Registration returned no token")
        .to_string()
}

/// Creates a producer through the API and returns its id.
pub async fn create_producer(server: &TestServer, name: &str) -> i64 {
    let response = server
        .post("/api/v1/producers")
        .json(&json!({
            "name": name,
            "contact_info": "+351 222 000 000",
            "email": "studio@example.com",
            "location": "Guimaraes",
        }))
        .await;
    response.assert_status(axum::http::StatusCode::CREATED);
    let body: Value = response.json();
    body["data"]["id"].as_i64().expect("Producer has no id")
}

/// Creates a product through the API and returns its id.
pub async fn create_product(server: &TestServer, producer_id: i64, name: &str, price: &str) -> i64 {
    let response = server
        .post("/api/v1/products")
        .json(&json!({
            "name": name,
            "description": format!("{name}, made by hand"),
            "price": price,
            "prod_date": "2024-05-01",
            "producer_id": producer_id,
        }))
        .await;
    response.assert_status(axum::http::StatusCode::CREATED);
    let body: Value = response.json();
    body["data"]["id"].as_i64().expect("Product has no id")
}
