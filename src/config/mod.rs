//! Configuration loaded from `config.toml`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Backend origin, e.g. `https://api.medesense.app`.
    pub api_base_url: String,
    /// Model requested for chat exchanges.
    pub model: String,
    /// Response-length cap sent with chat exchanges.
    pub max_tokens: u32,
    /// Directory holding the history database and stored login.
    pub data_dir: PathBuf,
    /// Whole-request timeout in seconds. Default: 120.
    pub request_timeout_secs: u64,
    /// TCP connect timeout in seconds. Default: 10.
    pub connect_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        let data_dir = dirs::data_dir()
            .map(|d| d.join("medesense"))
            .unwrap_or_else(|| PathBuf::from(".medesense"));

        Self {
            api_base_url: "http://localhost:8000".to_string(),
            model: "gpt-4o-mini".to_string(),
            max_tokens: 500,
            data_dir,
            request_timeout_secs: 120,
            connect_timeout_secs: 10,
        }
    }
}

impl Config {
    /// Path to the history `SQLite` database.
    pub fn history_db_path(&self) -> PathBuf {
        self.data_dir.join("history.db")
    }

    /// Path to the stored login.
    pub fn credentials_path(&self) -> PathBuf {
        self.data_dir.join("auth.json")
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    /// Default config file location.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .map(|d| d.join("medesense").join("config.toml"))
            .unwrap_or_else(|| PathBuf::from(".medesense/config.toml"))
    }

    /// Load from the default location, falling back to defaults.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::default_path())
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Config::default());
        }

        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }
}
