//! Catalog engine binary for the GameMaster back office.
//!
//! This is the entry point that wires configuration, logging, the
//! `PostgreSQL` pool, and the catalog mirror together. It brings the
//! schema up to date and loads every collection into memory.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `gamemaster-config.yaml` (or the path in
//!    `GAMEMASTER_CONFIG`)
//! 2. Initialize structured logging (tracing)
//! 3. Connect to `PostgreSQL` and run migrations
//! 4. Load the catalog mirror through the `PostgreSQL` gateway
//! 5. Log the per-kind summary and close the pool

mod error;
mod pg_gateway;

use std::path::PathBuf;

use gamemaster_core::{Catalog, CatalogConfig, LogFormat, LoggingConfig, TracingAudit, views};
use gamemaster_db::PostgresPool;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::error::EngineError;
use crate::pg_gateway::PgGateway;

/// Default configuration file, relative to the working directory.
const CONFIG_FILE: &str = "gamemaster-config.yaml";

/// Application entry point for the catalog engine.
///
/// # Errors
///
/// Returns an error if configuration, the database connection, the
/// migrations, or the initial load fail.
#[tokio::main]
async fn main() -> Result<(), EngineError> {
    // 1. Load configuration.
    let config = load_config()?;

    // 2. Initialize structured logging.
    init_logging(&config.logging);
    info!(
        max_connections = config.database.max_connections,
        connect_timeout_secs = config.database.connect_timeout_secs,
        log_level = %config.logging.level,
        "gamemaster-engine starting"
    );

    // 3. Connect and migrate.
    let pg = PostgresPool::connect(&config.database).await?;
    pg.run_migrations().await?;
    info!("Schema up to date");

    // 4. Load the mirror.
    let mut catalog = Catalog::new(PgGateway::new(pg), TracingAudit::new());
    let loaded = catalog.load_all().await;

    // 5. Report and shut down.
    let outcome = match loaded {
        Ok(summary) => {
            info!(summary = %summary, "Catalog loaded");
            match views::platform_cut(catalog.store()) {
                Some(cut) => info!(platform_cut = %cut, "Revenue split configured"),
                None => warn!("No admin account, revenue split unavailable"),
            }
            Ok(())
        }
        Err(e) => Err(EngineError::from(e)),
    };

    catalog.gateway().close().await;
    info!("gamemaster-engine shutdown complete");
    outcome
}

/// Install the `tracing` subscriber.
///
/// `RUST_LOG` wins over the configured level when set.
fn init_logging(logging: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);
    match logging.format {
        LogFormat::Plain => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}

/// Load the catalog configuration.
///
/// Reads `GAMEMASTER_CONFIG` if set, otherwise `gamemaster-config.yaml` in
/// the working directory. A missing file yields the defaults, with
/// `DATABASE_URL` still applied.
fn load_config() -> Result<CatalogConfig, EngineError> {
    let path = std::env::var_os("GAMEMASTER_CONFIG")
        .map_or_else(|| PathBuf::from(CONFIG_FILE), PathBuf::from);
    if path.exists() {
        Ok(CatalogConfig::from_file(&path)?)
    } else {
        let mut config = CatalogConfig::default();
        config.database.apply_env_overrides();
        Ok(config)
    }
}
