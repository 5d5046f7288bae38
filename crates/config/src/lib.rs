//! Configuration loading, validation, and management for seatplan.
//!
//! Loads configuration from `~/.seatplan/config.toml` with environment
//! variable overrides. Validates all settings at startup.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// The root configuration structure.
///
/// Maps directly to `~/.seatplan/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Guest store configuration
    #[serde(default)]
    pub store: StoreConfig,

    /// Seating allocation defaults
    #[serde(default)]
    pub allocation: AllocationConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// `"sqlite"` or `"in_memory"`
    #[serde(default = "default_store_backend")]
    pub backend: String,

    /// SQLite database path; defaults to `~/.seatplan/guests.sqlite`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,

    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    /// Upper bound on how long a table-number transaction may wait for the
    /// database lock.
    #[serde(default = "default_busy_timeout_secs")]
    pub busy_timeout_secs: u64,
}

fn default_store_backend() -> String {
    "sqlite".into()
}
fn default_max_connections() -> u32 {
    4
}
fn default_busy_timeout_secs() -> u64 {
    5
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: default_store_backend(),
            path: None,
            max_connections: default_max_connections(),
            busy_timeout_secs: default_busy_timeout_secs(),
        }
    }
}

impl StoreConfig {
    pub fn busy_timeout(&self) -> Duration {
        Duration::from_secs(self.busy_timeout_secs)
    }

    /// Resolved database path.
    pub fn database_path(&self) -> PathBuf {
        self.path
            .clone()
            .unwrap_or_else(|| AppConfig::config_dir().join("guests.sqlite"))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AllocationConfig {
    /// Tables requested when the caller does not say
    #[serde(default = "default_num_tables")]
    pub default_num_tables: u32,

    /// Seats per table when the caller does not say
    #[serde(default = "default_seats_per_table")]
    pub default_seats_per_table: u32,

    /// Serialize concurrent runs for the same event within one process
    #[serde(default = "default_true")]
    pub serialize_per_event: bool,
}

fn default_num_tables() -> u32 {
    1
}
fn default_seats_per_table() -> u32 {
    10
}
fn default_true() -> bool {
    true
}

impl Default for AllocationConfig {
    fn default() -> Self {
        Self {
            default_num_tables: default_num_tables(),
            default_seats_per_table: default_seats_per_table(),
            serialize_per_event: true,
        }
    }
}

const KNOWN_BACKENDS: &[&str] = &["sqlite", "in_memory"];

impl AppConfig {
    /// Load configuration from the default path (~/.seatplan/config.toml).
    ///
    /// Environment overrides:
    /// - `SEATPLAN_STORE` — store backend
    /// - `SEATPLAN_DB_PATH` — SQLite database path
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_dir().join("config.toml");
        let mut config = Self::load_from(&config_path)?;
        config.apply_env_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Apply overrides from an environment lookup.
    pub fn apply_env_overrides(&mut self, env: impl Fn(&str) -> Option<String>) {
        if let Some(backend) = env("SEATPLAN_STORE") {
            self.store.backend = backend;
        }
        if let Some(path) = env("SEATPLAN_DB_PATH") {
            self.store.path = Some(PathBuf::from(path));
        }
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".seatplan")
    }

    /// Validate the configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        if !KNOWN_BACKENDS.contains(&self.store.backend.as_str()) {
            return Err(ConfigError::ValidationError(format!(
                "store.backend must be one of {KNOWN_BACKENDS:?} (got {:?})",
                self.store.backend
            )));
        }

        if self.store.max_connections == 0 {
            return Err(ConfigError::ValidationError(
                "store.max_connections must be > 0".into(),
            ));
        }

        if self.allocation.default_num_tables == 0 {
            return Err(ConfigError::ValidationError(
                "allocation.default_num_tables must be > 0".into(),
            ));
        }

        if self.allocation.default_seats_per_table == 0 {
            return Err(ConfigError::ValidationError(
                "allocation.default_seats_per_table must be > 0".into(),
            ));
        }

        Ok(())
    }

    /// Generate a default config TOML string (for the `init` command).
    pub fn default_toml() -> String {
        let config = Self::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}
