//! Error types for the kmud server binary.
//!
//! [`ServerError`] wraps every failure mode of startup so `main` can
//! propagate with `?`.

use crate::config::ConfigError;

/// Top-level error for the kmud server binary.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: ConfigError,
    },

    /// Connecting to the document store failed.
    #[error("store error: {source}")]
    Store {
        /// The underlying store error.
        #[from]
        source: kmud_db::DbError,
    },

    /// Loading the world failed.
    #[error("world error: {source}")]
    World {
        /// The underlying world error.
        #[from]
        source: kmud_world::WorldError,
    },

    /// Waiting for the shutdown signal failed.
    #[error("signal error: {source}")]
    Signal {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },
}
