use std::time::Duration;

use anyhow::{Context, Result};
use config::{Config, Environment, File};
use sea_orm::Database;
use serde::Deserialize;
use tracing::{debug, info};

use crate::schemas::AppState;
use crate::session::SessionStore;

pub const DEFAULT_DATABASE_URL: &str = "sqlite://tailorconnect.db?mode=rwc";
pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:3000";

/// Runtime settings.
///
/// Sources, lowest precedence first: built-in defaults, an optional
/// `tailorconnect.toml` in the working directory, `TAILORCONNECT_*`
/// environment variables, then explicit overrides from the command line.
/// `.env` is loaded before the command line is parsed, see
/// [`crate::cli::Cli::parse_with_env_file`].
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct Settings {
    pub database_url: String,
    pub bind_address: String,
    /// Idle time after which a session token stops working
    pub session_ttl_secs: u64,
    /// Maximum number of live sessions kept in memory
    pub session_capacity: u64,
}

impl Settings {
    /// Loads settings, letting `Some` overrides win over every other source.
    pub fn load(database_url: Option<String>, bind_address: Option<String>) -> Result<Self> {
        let settings = Config::builder()
            .set_default("database_url", DEFAULT_DATABASE_URL)?
            .set_default("bind_address", DEFAULT_BIND_ADDRESS)?
            .set_default("session_ttl_secs", 86_400_i64)?
            .set_default("session_capacity", 10_000_i64)?
            .add_source(File::with_name("tailorconnect").required(false))
            .add_source(Environment::with_prefix("TAILORCONNECT"))
            .set_override_option("database_url", database_url)?
            .set_override_option("bind_address", bind_address)?
            .build()
            .context("Failed to read configuration")?
            .try_deserialize::<Settings>()
            .context("Invalid configuration")?;

        debug!("Loaded settings: {:?}", settings);
        Ok(settings)
    }

    pub fn session_ttl(&self) -> Duration {
        Duration::from_secs(self.session_ttl_secs)
    }
}

/// Connects to the database and builds the shared application state
pub async fn initialize_app_state(settings: &Settings) -> Result<AppState> {
    info!("Connecting to database: {}", settings.database_url);
    let db = Database::connect(&settings.database_url)
        .await
        .with_context(|| format!("Failed to connect to {}", settings.database_url))?;

    let sessions = SessionStore::new(settings.session_capacity, settings.session_ttl());
    debug!(
        "Session store ready, capacity {}, idle ttl {}s",
        settings.session_capacity, settings.session_ttl_secs
    );

    Ok(AppState { db, sessions })
}
