//! Configuration system
//!
//! Pool sizing and logging settings, loadable from TOML or RON files.

use std::collections::HashMap;

pub use serde::{Serialize, Deserialize};

/// Number of slots pre-created when a bucket is first requested
pub const DEFAULT_POOL_SIZE: usize = 10;

/// Configuration trait
pub trait Config: Serialize + for<'de> Deserialize<'de> + Default {
    /// Load configuration from file
    fn load_from_file(path: &str) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(ConfigError::Io)?;
        Self::parse_str(path, &contents)
    }

    /// Parse configuration text, picking the format from the path's extension
    fn parse_str(path: &str, contents: &str) -> Result<Self, ConfigError> {
        if path.ends_with(".toml") {
            toml::from_str(contents).map_err(|e| ConfigError::Parse(e.to_string()))
        } else if path.ends_with(".ron") {
            ron::from_str(contents).map_err(|e| ConfigError::Parse(e.to_string()))
        } else {
            Err(ConfigError::UnsupportedFormat(path.to_string()))
        }
    }

    /// Save configuration to file
    fn save_to_file(&self, path: &str) -> Result<(), ConfigError> {
        let contents = if path.ends_with(".toml") {
            toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))?
        } else if path.ends_with(".ron") {
            ron::ser::to_string_pretty(self, Default::default())
                .map_err(|e| ConfigError::Serialize(e.to_string()))?
        } else {
            return Err(ConfigError::UnsupportedFormat(path.to_string()));
        };

        std::fs::write(path, contents).map_err(ConfigError::Io)
    }
}

/// Configuration errors
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Parse error
    #[error("Parse error: {0}")]
    Parse(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialize(String),

    /// Unsupported format
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// A value was parsed but is not usable
    #[error("Invalid value for '{field}': {reason}")]
    Invalid {
        /// Offending field
        field: String,
        /// Why the value was rejected
        reason: String,
    },
}

/// # Pool Configuration
///
/// Controls how many slots each bucket is pre-warmed with. Keys of
/// `bucket_sizes` are type keys; any key not listed uses `default_pool_size`.
///
/// ```toml
/// default_pool_size = 10
/// log_level = "info"
///
/// [bucket_sizes]
/// bullet = 64
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolConfig {
    /// Slots pre-created for a new bucket
    pub default_pool_size: usize,
    /// Log level used when the host bootstraps logging from this config
    pub log_level: String,
    /// Per-type-key overrides of the pre-warm size
    pub bucket_sizes: HashMap<String, usize>,
}

impl PoolConfig {
    /// Create a configuration with the default pre-warm size
    pub fn new() -> Self {
        Self {
            default_pool_size: DEFAULT_POOL_SIZE,
            log_level: "info".to_string(),
            bucket_sizes: HashMap::new(),
        }
    }

    /// Set the default pre-warm size
    pub fn with_default_pool_size(mut self, size: usize) -> Self {
        self.default_pool_size = size;
        self
    }

    /// Override the pre-warm size for one type key
    pub fn with_bucket_size(mut self, type_key: impl Into<String>, size: usize) -> Self {
        self.bucket_sizes.insert(type_key.into(), size);
        self
    }

    /// Set log level
    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = level.into();
        self
    }

    /// Pre-warm size for a type key
    pub fn pool_size_for(&self, type_key: &str) -> usize {
        self.bucket_sizes
            .get(type_key)
            .copied()
            .unwrap_or(self.default_pool_size)
    }

    /// Validate the configuration
    ///
    /// A size of zero is allowed for the default and for overrides: the bucket
    /// then starts empty and grows on the first request.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.bucket_sizes.keys().any(String::is_empty) {
            return Err(ConfigError::Invalid {
                field: "bucket_sizes".to_string(),
                reason: "type keys cannot be empty".to_string(),
            });
        }

        Ok(())
    }
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl Config for PoolConfig {}
