//! Configuration loading and typed config structures for the kmud server.
//!
//! The configuration lives in `kmud-config.yaml` in the working directory.
//! Every field has a default, so a missing file or an empty document both
//! yield a runnable server backed by the in-memory store.

use std::path::Path;

use kmud_db::DIRTY_QUEUE_CAPACITY;
use serde::Deserialize;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// An environment override named an unknown store backend.
    #[error("unknown store backend: {0} (expected `memory` or `dragonfly`)")]
    UnknownBackend(String),
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level server configuration, mirroring `kmud-config.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ServerConfig {
    /// Document store selection and connection.
    #[serde(default)]
    pub store: StoreConfig,

    /// Write-back tuning.
    #[serde(default)]
    pub persistence: PersistenceConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// World startup behavior.
    #[serde(default)]
    pub world: WorldConfig,
}

impl ServerConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// Environment variables override YAML values:
    /// - `DRAGONFLY_URL` overrides `store.dragonfly_url`
    /// - `KMUD_STORE_BACKEND` overrides `store.backend`
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read,
    /// [`ConfigError::Yaml`] if the content is not valid YAML, or
    /// [`ConfigError::UnknownBackend`] for a bad backend override.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string, then apply environment
    /// overrides.
    ///
    /// # Errors
    ///
    /// As [`ServerConfig::from_file`], minus the I/O case.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        // An empty document deserializes as unit, not as an empty map.
        let mut config: Self = if yaml.trim().is_empty() {
            Self::default()
        } else {
            serde_yml::from_str(yaml)?
        };
        config.apply_env_overrides()?;
        Ok(config)
    }

    /// Override values with environment variables when set.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnknownBackend`] if `KMUD_STORE_BACKEND`
    /// names no known backend.
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        self.apply_overrides(|name| std::env::var(name).ok())
    }

    fn apply_overrides(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        if let Some(url) = lookup("DRAGONFLY_URL") {
            self.store.dragonfly_url = url;
        }
        if let Some(backend) = lookup("KMUD_STORE_BACKEND") {
            self.store.backend = StoreBackend::parse(&backend)?;
        }
        Ok(())
    }
}

/// Which [`kmud_db::Store`] implementation backs the world.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// In-process store; nothing survives a restart.
    #[default]
    Memory,
    /// `Dragonfly` (Redis-compatible) store.
    Dragonfly,
}

impl StoreBackend {
    /// Parse a backend name, ignoring case and surrounding whitespace.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnknownBackend`] for any other name.
    pub fn parse(name: &str) -> Result<Self, ConfigError> {
        match name.trim().to_ascii_lowercase().as_str() {
            "memory" => Ok(Self::Memory),
            "dragonfly" => Ok(Self::Dragonfly),
            _ => Err(ConfigError::UnknownBackend(name.to_owned())),
        }
    }
}

/// Document store selection and connection.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StoreConfig {
    /// Backend to use.
    #[serde(default)]
    pub backend: StoreBackend,

    /// Dragonfly (Redis-compatible) URL.
    #[serde(default = "default_dragonfly_url")]
    pub dragonfly_url: String,

    /// Key prefix for every collection.
    #[serde(default = "default_namespace")]
    pub namespace: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::default(),
            dragonfly_url: default_dragonfly_url(),
            namespace: default_namespace(),
        }
    }
}

/// Write-back tuning.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PersistenceConfig {
    /// Dirty notifications queued before mutators wait. Zero is raised to one.
    #[serde(default = "default_dirty_queue_capacity")]
    pub dirty_queue_capacity: usize,
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self {
            dirty_queue_capacity: default_dirty_queue_capacity(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error), used when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit JSON lines instead of human-readable output.
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

/// World startup behavior.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct WorldConfig {
    /// Create a default zone and origin room when the store holds no zones.
    #[serde(default = "default_true")]
    pub seed_default_zone: bool,

    /// Name of the seeded zone.
    #[serde(default = "default_zone_name")]
    pub default_zone_name: String,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            seed_default_zone: true,
            default_zone_name: default_zone_name(),
        }
    }
}

fn default_dragonfly_url() -> String {
    "redis://localhost:6379".to_owned()
}

fn default_namespace() -> String {
    kmud_db::dragonfly::DEFAULT_NAMESPACE.to_owned()
}

const fn default_dirty_queue_capacity() -> usize {
    DIRTY_QUEUE_CAPACITY
}

fn default_log_level() -> String {
    "info".to_owned()
}

const fn default_true() -> bool {
    true
}

fn default_zone_name() -> String {
    "Default".to_owned()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn parse_without_env(yaml: &str) -> ServerConfig {
        serde_yml::from_str(yaml).unwrap()
    }

    #[test]
    fn default_config_uses_memory_store() {
        let config = ServerConfig::default();
        assert_eq!(config.store.backend, StoreBackend::Memory);
        assert_eq!(config.store.namespace, "mud");
        assert_eq!(config.persistence.dirty_queue_capacity, 10);
        assert_eq!(config.logging.level, "info");
        assert!(config.world.seed_default_zone);
    }

    #[test]
    fn parse_full_yaml() {
        let yaml = r"
store:
  backend: dragonfly
  dragonfly_url: redis://cache:6380
  namespace: test-mud
persistence:
  dirty_queue_capacity: 32
logging:
  level: debug
  json: true
world:
  seed_default_zone: false
  default_zone_name: Limbo
";
        let config = parse_without_env(yaml);
        assert_eq!(config.store.backend, StoreBackend::Dragonfly);
        assert_eq!(config.store.dragonfly_url, "redis://cache:6380");
        assert_eq!(config.store.namespace, "test-mud");
        assert_eq!(config.persistence.dirty_queue_capacity, 32);
        assert_eq!(config.logging.level, "debug");
        assert!(config.logging.json);
        assert!(!config.world.seed_default_zone);
        assert_eq!(config.world.default_zone_name, "Limbo");
    }

    #[test]
    fn parse_minimal_yaml() {
        let config = parse_without_env("persistence:\n  dirty_queue_capacity: 3\n");
        assert_eq!(config.persistence.dirty_queue_capacity, 3);
        assert_eq!(config.store, StoreConfig::default());
        assert_eq!(config.world, WorldConfig::default());
    }

    #[test]
    fn parse_empty_yaml() {
        assert!(ServerConfig::parse("").is_ok());
        assert!(ServerConfig::parse("  \n").is_ok());
    }

    #[test]
    fn invalid_yaml_is_rejected() {
        assert!(matches!(
            ServerConfig::parse("store: [unterminated"),
            Err(ConfigError::Yaml { .. })
        ));
    }

    #[test]
    fn env_overrides_replace_store_settings() {
        let mut config = ServerConfig::default();
        config
            .apply_overrides(|name| match name {
                "DRAGONFLY_URL" => Some("redis://elsewhere:6379".to_owned()),
                "KMUD_STORE_BACKEND" => Some(" Dragonfly ".to_owned()),
                _ => None,
            })
            .unwrap();
        assert_eq!(config.store.dragonfly_url, "redis://elsewhere:6379");
        assert_eq!(config.store.backend, StoreBackend::Dragonfly);

        let bad = config.apply_overrides(|name| {
            (name == "KMUD_STORE_BACKEND").then(|| "postgres".to_owned())
        });
        assert!(matches!(bad, Err(ConfigError::UnknownBackend(_))));
    }

    #[test]
    fn load_project_config_file() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("..")
            .join("..")
            .join("kmud-config.yaml");
        if path.exists() {
            let config: Result<ServerConfig, _> = std::fs::read_to_string(&path)
                .map_err(ConfigError::from)
                .and_then(|yaml| serde_yml::from_str(&yaml).map_err(ConfigError::from));
            assert!(config.is_ok(), "Failed to load project config: {config:?}");
        }
    }
}
