//! Configuration module for tagquery
//!
//! Carries the category name/code table, the wildcard expansion limit,
//! and cache tuning. Configuration is plain TOML loaded from a path the
//! host application chooses; the library never touches user directories.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use config::{Config, ConfigError, File, FileFormat};
use serde::{Deserialize, Serialize};

/// Library configuration structure
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TagQueryConfig {
    /// Map of category names to their small integer codes (0 = general)
    #[serde(default = "default_categories")]
    pub categories: HashMap<String, u8>,

    /// Maximum number of concrete names a wildcard pattern may expand to
    #[serde(default = "default_wildcard_limit")]
    pub wildcard_limit: usize,

    /// TTL for cached category lookups, in seconds
    #[serde(default = "default_category_cache_ttl_secs")]
    pub category_cache_ttl_secs: u64,

    /// Maximum number of entries held by the shared cache
    #[serde(default = "default_cache_capacity")]
    pub cache_capacity: u64,

    /// Upper bound on the related-tags staleness window, in hours
    #[serde(default = "default_related_expiry_cap_hours")]
    pub related_expiry_cap_hours: f64,
}

fn default_categories() -> HashMap<String, u8> {
    HashMap::from([
        ("general".to_string(), 0),
        ("artist".to_string(), 1),
        ("copyright".to_string(), 3),
        ("character".to_string(), 4),
    ])
}

const fn default_wildcard_limit() -> usize {
    100
}

const fn default_category_cache_ttl_secs() -> u64 {
    3600
}

const fn default_cache_capacity() -> u64 {
    10_000
}

const fn default_related_expiry_cap_hours() -> f64 {
    24.0
}

impl Default for TagQueryConfig {
    fn default() -> Self {
        Self {
            categories: default_categories(),
            wildcard_limit: default_wildcard_limit(),
            category_cache_ttl_secs: default_category_cache_ttl_secs(),
            cache_capacity: default_cache_capacity(),
            related_expiry_cap_hours: default_related_expiry_cap_hours(),
        }
    }
}

impl TagQueryConfig {
    /// Load configuration from a TOML file
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file cannot be read or parsed.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::from(path.as_ref()).format(FileFormat::Toml))
            .build()?;

        settings.try_deserialize()
    }

    /// Load configuration from a file, falling back to defaults if it does not exist
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if an existing file cannot be read or parsed.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        if path.as_ref().exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Save configuration to a TOML file
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the configuration cannot be serialized or written.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        if let Some(parent) = path.as_ref().parent() {
            fs::create_dir_all(parent)
                .map_err(|e| ConfigError::Message(format!("Failed to create config directory: {e}")))?;
        }

        let toml_string = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::Message(format!("Failed to serialize config: {e}")))?;

        fs::write(path, toml_string)
            .map_err(|e| ConfigError::Message(format!("Failed to write config file: {e}")))?;

        Ok(())
    }
}
