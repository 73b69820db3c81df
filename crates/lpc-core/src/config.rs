//! Configuration for record handling.
//!
//! # Example TOML
//!
//! ```toml
//! [envelope]
//! max_size = 65536
//!
//! [records]
//! max_records_per_peer = 8
//!
//! [logging]
//! level = "warn"
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read config file
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    /// Failed to parse config file
    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Invalid configuration value
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CoreConfig {
    #[serde(default)]
    pub envelope: EnvelopeConfig,

    #[serde(default)]
    pub records: RecordsConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Limits applied when opening envelopes received from the network.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnvelopeConfig {
    /// Largest marshaled envelope accepted, in bytes
    #[serde(default = "default_max_size")]
    pub max_size: usize,
}

fn default_max_size() -> usize {
    64 * 1024
}

impl Default for EnvelopeConfig {
    fn default() -> Self {
        Self { max_size: default_max_size() }
    }
}

/// Per-peer record history settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordsConfig {
    /// Signed records kept per peer after trimming, newest first
    #[serde(default = "default_max_records")]
    pub max_records_per_peer: usize,
}

fn default_max_records() -> usize {
    8
}

impl Default for RecordsConfig {
    fn default() -> Self {
        Self { max_records_per_peer: default_max_records() }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Filter directive passed to the log subscriber
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: default_log_level() }
    }
}

impl CoreConfig {
    /// Load and validate configuration from a TOML file.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.envelope.max_size == 0 {
            return Err(ConfigError::ValidationError(
                "envelope.max_size must be greater than zero".to_string(),
            ));
        }
        if self.records.max_records_per_peer == 0 {
            return Err(ConfigError::ValidationError(
                "records.max_records_per_peer must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}
