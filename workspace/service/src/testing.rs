//! Shared fixtures for the service tests: an in-memory SQLite database with
//! migrations applied, and seeders that bypass validation and hashing.

use chrono::{NaiveDate, Utc};
use migration::{Migrator, MigratorTrait};
use model::entities::{producer, product, user};
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, ConnectionTrait, Database, DatabaseConnection, Set};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use crate::UserId;

/// Create an in-memory SQLite database for testing
pub async fn setup_db() -> DatabaseConnection {
    let db = Database::connect("sqlite::memory:")
        .await
        .expect("Failed to connect to in-memory database");

    db.execute_unprepared("PRAGMA foreign_keys = ON;")
        .await
        .expect("Failed to enable foreign keys");

    Migrator::up(&db, None)
        .await
        .expect("Failed to run migrations");

    db
}

/// Routes test logs to stderr. Level comes from RUST_LOG, WARN by default.
pub fn init_test_tracing() -> tracing::subscriber::DefaultGuard {
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

pub async fn seed_user(db: &DatabaseConnection, username: &str) -> UserId {
    let user = user::ActiveModel {
        username: Set(username.to_string()),
        email: Set(format!("{username}@example.com")),
        password_hash: Set("unusable".to_string()),
        date_joined: Set(Utc::now()),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("Failed to seed user");
    UserId::from(&user)
}

pub async fn seed_producer(db: &DatabaseConnection, name: &str) -> producer::Model {
    producer::ActiveModel {
        name: Set(name.to_string()),
        contact_info: Set("+351 222 000 000".to_string()),
        email: Set("studio@example.com".to_string()),
        location: Set("Porto".to_string()),
        bio: Set(None),
        created_at: Set(Utc::now()),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("Failed to seed producer")
}

pub async fn seed_product(
    db: &DatabaseConnection,
    producer_id: i32,
    name: &str,
    price: Decimal,
) -> product::Model {
    product::ActiveModel {
        name: Set(name.to_string()),
        description: Set(format!("{name}, made by hand")),
        price: Set(price),
        prod_date: Set(NaiveDate::from_ymd_opt(2024, 4, 2).unwrap()),
        image: Set(None),
        rarity: Set(product::Rarity::Common),
        producer_id: Set(producer_id),
        created_at: Set(Utc::now()),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("Failed to seed product")
}
