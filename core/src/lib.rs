//! Core of the movie browser: the remote catalog client and the favorites store.
//!
//! # Overview
//! Two independent halves that screens combine only at render time:
//! - **Catalog**: `CatalogClient` builds `HttpRequest` values and parses
//!   `HttpResponse` values without touching the network (host-does-IO
//!   pattern). `RemoteCatalog` pairs it with a `Transport` for async callers.
//!   All endpoint shapes are normalized into one `Movie`.
//! - **Favorites**: `FavoritesStore` persists a `FavoritesCollection` under a
//!   single key of a `KeyValueStore`, serializes its own mutations and
//!   broadcasts a `FavoritesChange` after each write.
//!
//! # Design
//! - Catalog and favorites never call each other; an error in one cannot
//!   touch the other's state.
//! - Nothing retries and nothing swallows errors; callers decide what to show.
//! - Types use owned `String` / `Vec` fields so the FFI crate can map them.

pub mod client;
pub mod collection;
pub mod config;
pub mod error;
pub mod favorites;
pub mod filters;
pub mod http;
pub mod normalize;
pub mod remote;
pub mod storage;
#[cfg(feature = "reqwest")]
pub mod transport;
pub mod types;

pub use client::CatalogClient;
pub use collection::{FavoritesCollection, ToggleOutcome};
pub use config::{CatalogConfig, Config, FavoritesConfig};
pub use error::{CatalogError, ConfigError, StoreError};
pub use favorites::{FavoritesChange, FavoritesStore, FAVORITES_KEY};
pub use filters::{SearchFilters, SortField, SortOrder};
pub use http::{HttpMethod, HttpRequest, HttpResponse, Transport};
pub use normalize::RawMovie;
pub use remote::RemoteCatalog;
pub use storage::{FileStorage, KeyValueStore, MemoryStorage};
#[cfg(feature = "reqwest")]
pub use transport::ReqwestTransport;
pub use types::{FavoriteEntry, Movie};
