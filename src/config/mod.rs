//! Configuration management
//!
//! Handles loading, validation, and merging of configuration from:
//! - TOML files
//! - CLI arguments

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

pub mod types;

pub use types::{CacheConfig, LoggingConfig};

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];
const LOG_FORMATS: [&str; 3] = ["pretty", "compact", "json"];

/// Default configuration file location
///
/// `$XDG_CONFIG_HOME/browser-compat/config.toml`, or the working directory
/// when no config dir can be resolved.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir().map_or_else(
        || PathBuf::from("browser-compat.toml"),
        |d| d.join("browser-compat").join("config.toml"),
    )
}

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Cache shim configuration
    #[serde(default)]
    pub cache: CacheConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content).context("Failed to parse config file")?;

        config.validate()?;
        Ok(config)
    }

    /// Create default configuration
    pub fn default_config() -> Self {
        Self::default()
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.cache.default_ttl_ms == 0 {
            anyhow::bail!("cache.default_ttl_ms must be greater than zero");
        }

        if self.cache.quota_bytes == 0 {
            anyhow::bail!("cache.quota_bytes must be greater than zero");
        }

        if !LOG_LEVELS.contains(&self.logging.level.as_str()) {
            anyhow::bail!("Invalid log level: {}", self.logging.level);
        }

        if !LOG_FORMATS.contains(&self.logging.format.as_str()) {
            anyhow::bail!("Invalid log format: {}", self.logging.format);
        }

        Ok(())
    }

    /// Override config with CLI arguments
    pub fn with_overrides(mut self, verbose: u8, log_format: Option<String>) -> Self {
        match verbose {
            0 => {}
            1 => self.logging.level = "debug".to_string(),
            _ => self.logging.level = "trace".to_string(),
        }

        if let Some(format) = log_format {
            self.logging.format = format;
        }

        self
    }
}
