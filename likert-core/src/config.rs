//! Configuration loading and management
//!
//! Configuration is loaded from `~/.config/likert/config.toml`
//!
//! This module follows the XDG Base Directory Specification:
//! - Config: `$XDG_CONFIG_HOME/likert/` (~/.config/likert/)
//! - Data: `$XDG_DATA_HOME/likert/` (~/.local/share/likert/)
//! - State/Logs: `$XDG_STATE_HOME/likert/` (~/.local/state/likert/)

use crate::analytics::Period;
use crate::error::{Error, Result};
use serde::Deserialize;
use std::path::PathBuf;

/// Returns a best-effort home directory path.
fn home_dir() -> PathBuf {
    std::env::var_os("HOME")
        .map(PathBuf::from)
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Returns XDG_CONFIG_HOME or ~/.config
fn xdg_config_home() -> PathBuf {
    std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".config"))
}

/// Returns XDG_DATA_HOME or ~/.local/share
fn xdg_data_home() -> PathBuf {
    std::env::var("XDG_DATA_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".local/share"))
}

/// Returns XDG_STATE_HOME or ~/.local/state
fn xdg_state_home() -> PathBuf {
    std::env::var("XDG_STATE_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".local/state"))
}

/// Main configuration struct
#[derive(Debug, Deserialize, Default)]
pub struct Config {
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Snapshot storage
    #[serde(default)]
    pub store: StoreConfig,

    /// Chart defaults
    #[serde(default)]
    pub chart: ChartConfig,
}

/// Logging configuration
#[derive(Debug, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Maximum number of log files to keep
    #[serde(default = "default_max_log_files")]
    pub max_files: usize,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            max_files: default_max_log_files(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_max_log_files() -> usize {
    5
}

/// Where the snapshot document lives inside the key-value store
#[derive(Debug, Deserialize)]
pub struct StoreConfig {
    /// Key the whole snapshot is stored under
    #[serde(default = "default_snapshot_key")]
    pub snapshot_key: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            snapshot_key: default_snapshot_key(),
        }
    }
}

fn default_snapshot_key() -> String {
    "likert_data".to_string()
}

/// Defaults for the chart view
#[derive(Debug, Deserialize, Default)]
pub struct ChartConfig {
    /// Period used when none is given on the command line
    #[serde(default)]
    pub default_period: Period,
}

impl Config {
    /// Load configuration from the default path
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path();

        if !config_path.exists() {
            tracing::info!("No config file found at {:?}, using defaults", config_path);
            return Ok(Config::default());
        }

        Self::load_from(&config_path)
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &PathBuf) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("failed to read config file {:?}: {}", path, e)))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("failed to parse config: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration, returning error message if invalid
    pub fn validate(&self) -> Result<()> {
        if self.store.snapshot_key.trim().is_empty() {
            return Err(Error::Config(
                "store.snapshot_key must not be empty".to_string(),
            ));
        }
        if self.logging.max_files == 0 {
            return Err(Error::Config(
                "logging.max_files must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Returns the default config file path
    ///
    /// `$XDG_CONFIG_HOME/likert/config.toml` (~/.config/likert/config.toml)
    pub fn config_path() -> PathBuf {
        xdg_config_home().join("likert").join("config.toml")
    }

    /// Returns the data directory path (for the SQLite store)
    ///
    /// `$XDG_DATA_HOME/likert/` (~/.local/share/likert/)
    pub fn data_dir() -> PathBuf {
        xdg_data_home().join("likert")
    }

    /// Returns the state directory path (for logs)
    ///
    /// `$XDG_STATE_HOME/likert/` (~/.local/state/likert/)
    pub fn state_dir() -> PathBuf {
        xdg_state_home().join("likert")
    }

    /// Returns the database file path
    ///
    /// `$XDG_DATA_HOME/likert/data.db` (~/.local/share/likert/data.db)
    pub fn database_path() -> PathBuf {
        Self::data_dir().join("data.db")
    }

    /// Returns the log file path
    ///
    /// `$XDG_STATE_HOME/likert/likert.log` (~/.local/state/likert/likert.log)
    pub fn log_path() -> PathBuf {
        Self::state_dir().join("likert.log")
    }

    /// Ensure XDG base directory environment variables are set.
    ///
    /// This is mainly for CLI binaries that want explicit, stable path behavior
    /// before invoking other components that read these env vars.
    pub fn ensure_xdg_env() {
        let home = home_dir();

        if std::env::var("XDG_DATA_HOME").is_err() {
            std::env::set_var("XDG_DATA_HOME", home.join(".local/share"));
        }

        if std::env::var("XDG_STATE_HOME").is_err() {
            std::env::set_var("XDG_STATE_HOME", home.join(".local/state"));
        }

        if std::env::var("XDG_CONFIG_HOME").is_err() {
            std::env::set_var("XDG_CONFIG_HOME", home.join(".config"));
        }
    }
}
