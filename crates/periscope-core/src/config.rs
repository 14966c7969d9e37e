//! Configuration for Periscope
//!
//! TOML with serde; every section and field has a default so a partial (or
//! absent) file always yields a working configuration.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Read(#[from] std::io::Error),

    #[error("failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("config file not found: {0}")]
    NotFound(PathBuf),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Complete Periscope configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PeriscopeConfig {
    pub capture: CaptureSettings,
    pub storage: StorageSettings,
    pub web: WebSettings,
}

impl PeriscopeConfig {
    pub fn from_path(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }
        let raw = std::fs::read_to_string(path)?;
        Self::from_toml(&raw)
    }

    pub fn from_toml(raw: &str) -> ConfigResult<Self> {
        Ok(toml::from_str(raw)?)
    }
}

/// Capture channel settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureSettings {
    /// Capture channel buffer; events beyond it are dropped, not queued
    pub buffer_size: usize,
}

impl Default for CaptureSettings {
    fn default() -> Self {
        Self {
            buffer_size: crate::capture::DEFAULT_BUFFER_SIZE,
        }
    }
}

/// Storage backend selection - configuration, not code branching in callers
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageSettings {
    pub driver: StorageDriver,

    /// Connection string for the sqlite/postgres drivers; ignored by memory
    pub url: String,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            driver: StorageDriver::Memory,
            url: String::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageDriver {
    #[default]
    Memory,
    Sqlite,
    Postgres,
}

/// Query API server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WebSettings {
    pub host: String,
    pub port: u16,
}

impl Default for WebSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 7979,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = PeriscopeConfig::default();
        assert_eq!(config.storage.driver, StorageDriver::Memory);
        assert_eq!(config.web.port, 7979);
        assert_eq!(config.capture.buffer_size, 4096);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = PeriscopeConfig::from_toml(
            r#"
            [storage]
            driver = "sqlite"
            url = "sqlite://periscope.db"
            "#,
        )
        .unwrap();
        assert_eq!(config.storage.driver, StorageDriver::Sqlite);
        assert_eq!(config.storage.url, "sqlite://periscope.db");
        assert_eq!(config.web.host, "127.0.0.1");
    }

    #[test]
    fn test_invalid_toml_is_an_error() {
        assert!(PeriscopeConfig::from_toml("storage = 3").is_err());
    }
}
