//! Runtime configuration for the catalog client and the favorites store.
//!
//! Settings come from an optional TOML file and are then overridden by
//! environment variables:
//!
//! ```toml
//! [catalog]
//! base_url = "https://imdb236.p.rapidapi.com/imdb"
//! api_key = "..."
//! timeout_secs = 10
//!
//! [favorites]
//! data_dir = "/var/lib/movie-browser"
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::client::{DEFAULT_API_HOST, DEFAULT_BASE_URL};
use crate::error::ConfigError;
use crate::favorites::FAVORITES_KEY;
use crate::storage::is_valid_key;

pub const ENV_BASE_URL: &str = "CATALOG_BASE_URL";
pub const ENV_API_KEY: &str = "CATALOG_API_KEY";
pub const ENV_API_HOST: &str = "CATALOG_API_HOST";
pub const ENV_TIMEOUT_SECS: &str = "CATALOG_TIMEOUT_SECS";
pub const ENV_FAVORITES_DIR: &str = "FAVORITES_DIR";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CatalogConfig {
    pub base_url: String,
    pub api_key: String,
    pub api_host: String,
    pub timeout_secs: u64,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: String::new(),
            api_host: DEFAULT_API_HOST.to_string(),
            timeout_secs: 10,
        }
    }
}

impl CatalogConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FavoritesConfig {
    /// Directory holding one JSON file per storage key.
    pub data_dir: PathBuf,
    pub key: String,
}

impl Default for FavoritesConfig {
    fn default() -> Self {
        Self {
            data_dir: dirs::data_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("movie-browser"),
            key: FAVORITES_KEY.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub catalog: CatalogConfig,
    pub favorites: FavoritesConfig,
}

impl Config {
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(contents)?)
    }

    /// Read a TOML file, apply environment overrides and validate.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)?
            .with_overrides(|name| std::env::var(name).ok())?
            .validated()
    }

    /// Defaults plus environment overrides, validated.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::default()
            .with_overrides(|name| std::env::var(name).ok())?
            .validated()
    }

    /// Apply overrides from `lookup`, which maps a variable name to its value.
    pub fn with_overrides<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(ENV_BASE_URL) {
            self.catalog.base_url = url;
        }
        if let Some(key) = lookup(ENV_API_KEY) {
            self.catalog.api_key = key;
        }
        if let Some(host) = lookup(ENV_API_HOST) {
            self.catalog.api_host = host;
        }
        if let Some(secs) = lookup(ENV_TIMEOUT_SECS) {
            self.catalog.timeout_secs = secs.parse().map_err(|_| ConfigError::Invalid {
                key: ENV_TIMEOUT_SECS,
                value: secs,
            })?;
        }
        if let Some(dir) = lookup(ENV_FAVORITES_DIR) {
            self.favorites.data_dir = PathBuf::from(dir);
        }
        Ok(self)
    }

    pub fn validated(self) -> Result<Self, ConfigError> {
        if self.catalog.api_key.trim().is_empty() {
            return Err(ConfigError::Missing(ENV_API_KEY));
        }
        if self.catalog.timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                key: ENV_TIMEOUT_SECS,
                value: "0".to_string(),
            });
        }
        if self.favorites.key.is_empty() {
            return Err(ConfigError::Missing("favorites.key"));
        }
        if !is_valid_key(&self.favorites.key) {
            return Err(ConfigError::Invalid {
                key: "favorites.key",
                value: self.favorites.key,
            });
        }
        Ok(self)
    }
}
