//! Key-value persistence backends for the favorites collection.
//!
//! # Design
//! The store only needs whole-value `get`/`set` on one key, so the trait is
//! kept to those two calls. Backends report failures as `std::io::Error`;
//! `FavoritesStore` decides whether a failure is a read or a write error.

use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;

/// Abstraction over the durable key-value store holding serialized payloads.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Return the value stored under `key`, or `None` if it was never set.
    async fn get(&self, key: &str) -> io::Result<Option<String>>;

    /// Replace the value stored under `key`.
    async fn set(&self, key: &str, value: &str) -> io::Result<()>;
}

/// In-process storage. Contents are lost when the value is dropped.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    values: RwLock<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStorage {
    async fn get(&self, key: &str) -> io::Result<Option<String>> {
        Ok(self.values.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> io::Result<()> {
        self.values
            .write()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Whether `key` can name a file in a `FileStorage` directory: non-empty,
/// ASCII alphanumerics plus `-`, `_` and `.`, not starting with a dot.
pub fn is_valid_key(key: &str) -> bool {
    !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
        && !key.starts_with('.')
}

/// Distinguishes temporary files of concurrent writes within one process.
static TMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// File-backed storage: each key maps to `<dir>/<key>.json`.
///
/// Writes go to a temporary sibling first and are renamed into place, so a
/// crash mid-write never leaves a truncated payload behind. Every write gets
/// its own temporary file; concurrent writers sharing the directory end up
/// last-write-wins.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    /// Open storage rooted at `dir`. The directory is created on first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> io::Result<PathBuf> {
        if !is_valid_key(key) {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("invalid storage key `{key}`"),
            ));
        }
        Ok(self.dir.join(format!("{key}.json")))
    }
}

#[async_trait]
impl KeyValueStore for FileStorage {
    async fn get(&self, key: &str) -> io::Result<Option<String>> {
        let path = self.path_for(key)?;
        match tokio::fs::read_to_string(&path).await {
            Ok(contents) => {
                tracing::debug!(path = ?path, bytes = contents.len(), "read storage file");
                Ok(Some(contents))
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::debug!(path = ?path, "storage file absent");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    async fn set(&self, key: &str, value: &str) -> io::Result<()> {
        let path = self.path_for(key)?;
        tokio::fs::create_dir_all(&self.dir).await?;

        let tmp_path = self.dir.join(format!(
            ".{key}.{}.{}.tmp",
            std::process::id(),
            TMP_COUNTER.fetch_add(1, Ordering::Relaxed)
        ));
        tracing::trace!(tmp_path = ?tmp_path, "writing to temporary file");
        let written = match tokio::fs::write(&tmp_path, value).await {
            Ok(()) => tokio::fs::rename(&tmp_path, &path).await,
            Err(e) => Err(e),
        };
        if let Err(e) = written {
            let _ = tokio::fs::remove_file(&tmp_path).await;
            return Err(e);
        }

        tracing::debug!(path = ?path, bytes = value.len(), "storage file saved");
        Ok(())
    }
}
