// ABOUTME: Application configuration loaded from ~/.toolbench/config.toml
// File values sit between built-in defaults and command-line overrides

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:5000";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config {0}: {1}")]
    ReadFailed(PathBuf, std::io::Error),

    #[error("Failed to parse config {0}: {1}")]
    ParseFailed(PathBuf, toml::de::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Base URL of the toolbench server
    pub server_url: String,
    /// Catalog file; the built-in catalog is used when unset
    pub catalog_path: Option<PathBuf>,
    /// Directory for log files; defaults to ~/.toolbench/logs
    pub log_dir: Option<PathBuf>,
    pub tick_rate_ms: u64,
    /// Delay between showing the terminal and fitting it to the modal
    pub fit_delay_ms: u64,
    pub request_timeout_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server_url: DEFAULT_SERVER_URL.to_string(),
            catalog_path: None,
            log_dir: None,
            tick_rate_ms: 50,
            fit_delay_ms: 100,
            request_timeout_secs: 120,
        }
    }
}

/// Values given on the command line; `None` leaves the file/default value alone
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub server_url: Option<String>,
    pub catalog_path: Option<PathBuf>,
}

impl AppConfig {
    /// Load config from a TOML file. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::debug!("No config file at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::ReadFailed(path.to_path_buf(), e))?;
        toml::from_str(&contents).map_err(|e| ConfigError::ParseFailed(path.to_path_buf(), e))
    }

    pub fn with_overrides(mut self, overrides: ConfigOverrides) -> Self {
        if let Some(server_url) = overrides.server_url {
            self.server_url = server_url;
        }
        if let Some(catalog_path) = overrides.catalog_path {
            self.catalog_path = Some(catalog_path);
        }
        self
    }

    pub fn tick_rate(&self) -> Duration {
        Duration::from_millis(self.tick_rate_ms.max(1))
    }

    pub fn fit_delay(&self) -> Duration {
        Duration::from_millis(self.fit_delay_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }

    pub fn log_dir(&self) -> PathBuf {
        self.log_dir
            .clone()
            .unwrap_or_else(|| base_dir().join("logs"))
    }
}

/// ~/.toolbench, or ./.toolbench when no home directory is known
pub fn base_dir() -> PathBuf {
    dirs::home_dir()
        .map(|home| home.join(".toolbench"))
        .unwrap_or_else(|| PathBuf::from(".toolbench"))
}

pub fn default_config_path() -> PathBuf {
    base_dir().join("config.toml")
}
