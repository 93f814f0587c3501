//! Error types for the catalog client and the favorites store.
//!
//! # Design
//! The two halves of the core fail independently, so each has its own enum:
//! a failed catalog fetch never surfaces as a storage error and vice versa.
//! Nothing here retries; every error is handed back to the caller.

use thiserror::Error;

/// Errors returned by `CatalogClient` parse methods and `RemoteCatalog`.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The request never produced a response (connect failure, timeout, TLS).
    #[error("network error: {0}")]
    Transport(String),

    /// The service answered with a non-success status other than auth or a
    /// missing title.
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    /// The service rejected the API key (401 or 403).
    #[error("catalog rejected the API key (HTTP {status})")]
    Auth { status: u16 },

    /// The requested title does not exist in the catalog.
    #[error("title not found")]
    NotFound,

    /// The response body did not match the endpoint's shape.
    #[error("could not decode catalog response: {0}")]
    Decode(String),

    /// A search filter key or value outside the accepted set.
    #[error("invalid search filter: {0}")]
    InvalidFilter(String),
}

impl CatalogError {
    /// True when the screen should present the catalog as unavailable:
    /// transport, non-success status, undecodable body, or a rejected key.
    pub fn is_unavailable(&self) -> bool {
        matches!(
            self,
            CatalogError::Transport(_)
                | CatalogError::Http { .. }
                | CatalogError::Decode(_)
                | CatalogError::Auth { .. }
        )
    }
}

/// Errors returned by `FavoritesStore` and the pure collection helpers.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The persistence backend could not be read.
    #[error("favorites storage unreadable: {0}")]
    Read(#[source] std::io::Error),

    /// The stored payload is not a JSON array of favorites. It is left
    /// untouched on disk.
    #[error("favorites payload is corrupt: {0}")]
    Corrupt(#[source] serde_json::Error),

    /// The persistence backend rejected the write.
    #[error("favorites storage write failed: {0}")]
    Write(#[source] std::io::Error),
}

impl StoreError {
    /// Both unreachable storage and a corrupt payload count as read failures.
    pub fn is_read_error(&self) -> bool {
        matches!(self, StoreError::Read(_) | StoreError::Corrupt(_))
    }
}

/// Errors raised while loading `Config`.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("missing required setting: {0}")]
    Missing(&'static str),

    #[error("invalid value for {key}: {value}")]
    Invalid { key: &'static str, value: String },
}
