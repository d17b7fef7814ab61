//! kmud server binary.
//!
//! Wires configuration, logging, the document store and the write-back
//! layer together, loads the world and keeps it live until Ctrl-C.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `kmud-config.yaml`
//! 2. Initialize structured logging (tracing)
//! 3. Open the configured document store
//! 4. Initialize the write-back layer (dirty queue + committer)
//! 5. Load the world and seed it if empty
//! 6. Wait for Ctrl-C, then log commit statistics

mod config;
mod error;

use std::path::Path;
use std::sync::Arc;

use kmud_db::{Database, DragonflyStore, MemoryStore, Store};
use kmud_world::World;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::{LoggingConfig, ServerConfig, StoreBackend, StoreConfig};
use crate::error::ServerError;

/// Default configuration file, relative to the working directory.
const CONFIG_PATH: &str = "kmud-config.yaml";

/// Application entry point for the kmud server.
///
/// # Errors
///
/// Returns an error if configuration, the store connection or the world
/// load fails.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Load configuration.
    let (config, from_file) = load_config()?;

    // 2. Initialize structured logging.
    init_logging(&config.logging);
    info!(from_file, backend = ?config.store.backend, "kmud-server starting");

    // 3. Open the document store.
    let store = open_store(&config.store).await?;

    // 4. Start the write-back layer.
    let db = Database::with_queue_capacity(store, config.persistence.dirty_queue_capacity);

    // 5. Load and seed the world.
    let mut world = World::load(db.clone()).await.map_err(ServerError::from)?;
    if config.world.seed_default_zone {
        world.seed_if_empty(&config.world.default_zone_name).await;
    }
    info!("World ready, press Ctrl-C to stop");

    // 6. Run until interrupted.
    tokio::signal::ctrl_c().await.map_err(ServerError::from)?;

    let stats = db.stats();
    info!(
        written = stats.written(),
        skipped = stats.skipped(),
        failed = stats.failed(),
        pending = db.pending_commits(),
        "kmud-server stopped"
    );
    Ok(())
}

/// Load configuration from [`CONFIG_PATH`], falling back to defaults.
///
/// Returns the configuration and whether it came from the file.
fn load_config() -> Result<(ServerConfig, bool), ServerError> {
    let config_path = Path::new(CONFIG_PATH);
    if config_path.exists() {
        Ok((ServerConfig::from_file(config_path)?, true))
    } else {
        let mut config = ServerConfig::default();
        config.apply_env_overrides()?;
        Ok((config, false))
    }
}

/// Install the global subscriber. `RUST_LOG` wins over the configured level.
fn init_logging(logging: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));
    if logging.json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .init();
    }
}

/// Open the configured [`Store`].
async fn open_store(config: &StoreConfig) -> Result<Arc<dyn Store>, ServerError> {
    match config.backend {
        StoreBackend::Memory => {
            info!("Using in-memory store, nothing will survive a restart");
            Ok(Arc::new(MemoryStore::new()))
        }
        StoreBackend::Dragonfly => {
            info!(url = %config.dragonfly_url, namespace = %config.namespace, "Connecting to Dragonfly");
            let store = DragonflyStore::connect(&config.dragonfly_url, &config.namespace).await?;
            Ok(Arc::new(store))
        }
    }
}
