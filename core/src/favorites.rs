//! Durable favorites store.
//!
//! # Design
//! The whole collection lives under one key and every mutation is a full
//! read-modify-write through `FavoritesCollection`. Mutations issued through
//! the same `FavoritesStore` are serialized by an async mutex, so two
//! overlapping `toggle` calls cannot lose an update or leave a duplicate.
//! Writers in other processes sharing the backend remain last-write-wins.
//!
//! After each successful write a `FavoritesChange` is broadcast. Screens
//! subscribe and re-read `list()` instead of caching what they saw earlier.

use tokio::sync::{broadcast, Mutex};

use crate::collection::{FavoritesCollection, ToggleOutcome};
use crate::error::StoreError;
use crate::storage::KeyValueStore;
use crate::types::{FavoriteEntry, Movie};

/// Storage key holding the serialized collection.
pub const FAVORITES_KEY: &str = "favoriteMovies";

const CHANGE_CAPACITY: usize = 64;

/// Notification sent after a mutation has been persisted.
#[derive(Debug, Clone, PartialEq)]
pub enum FavoritesChange {
    Added(FavoriteEntry),
    Removed { id: String },
}

pub struct FavoritesStore<S> {
    storage: S,
    key: String,
    write_lock: Mutex<()>,
    changes: broadcast::Sender<FavoritesChange>,
}

impl<S: KeyValueStore> FavoritesStore<S> {
    pub fn new(storage: S) -> Self {
        Self::with_key(storage, FAVORITES_KEY)
    }

    pub fn with_key(storage: S, key: impl Into<String>) -> Self {
        let (changes, _) = broadcast::channel(CHANGE_CAPACITY);
        Self {
            storage,
            key: key.into(),
            write_lock: Mutex::new(()),
            changes,
        }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Receive a `FavoritesChange` for every persisted mutation from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<FavoritesChange> {
        self.changes.subscribe()
    }

    /// All favorites in insertion order. Empty if nothing was ever written.
    pub async fn list(&self) -> Result<Vec<FavoriteEntry>, StoreError> {
        Ok(self.read().await?.into_entries())
    }

    pub async fn contains(&self, id: &str) -> Result<bool, StoreError> {
        Ok(self.read().await?.contains(id))
    }

    /// Append `movie` without checking whether it is already a favorite.
    ///
    /// Screens should call `toggle`; re-adding an existing id here stores a
    /// second entry for it.
    pub async fn add(&self, movie: &Movie) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().await;
        let mut collection = self.read().await?;
        let entry = FavoriteEntry::from(movie);
        collection.push(entry.clone());
        self.write(&collection).await?;

        tracing::debug!(id = %entry.id, count = collection.len(), "favorite added");
        self.notify(FavoritesChange::Added(entry));
        Ok(())
    }

    /// Remove every entry for `id`. Succeeds without writing if absent.
    pub async fn remove(&self, id: &str) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().await;
        let mut collection = self.read().await?;
        if !collection.remove(id) {
            tracing::debug!(id, "remove skipped, not a favorite");
            return Ok(());
        }
        self.write(&collection).await?;

        tracing::debug!(id, count = collection.len(), "favorite removed");
        self.notify(FavoritesChange::Removed { id: id.to_string() });
        Ok(())
    }

    /// Add `movie` if it is not a favorite, otherwise remove it.
    ///
    /// The check and the write happen under one guard, so concurrent toggles
    /// through this store apply one after the other.
    pub async fn toggle(&self, movie: &Movie) -> Result<ToggleOutcome, StoreError> {
        let _guard = self.write_lock.lock().await;
        let mut collection = self.read().await?;
        let outcome = collection.toggle(movie);
        self.write(&collection).await?;

        tracing::debug!(id = %movie.id, added = outcome.added, "favorite toggled");
        let change = if outcome.added {
            FavoritesChange::Added(FavoriteEntry::from(movie))
        } else {
            FavoritesChange::Removed {
                id: movie.id.clone(),
            }
        };
        self.notify(change);
        Ok(outcome)
    }

    async fn read(&self) -> Result<FavoritesCollection, StoreError> {
        let payload = self.storage.get(&self.key).await.map_err(|e| {
            tracing::warn!(key = %self.key, error = %e, "favorites read failed");
            StoreError::Read(e)
        })?;
        FavoritesCollection::from_payload(payload.as_deref()).inspect_err(|e| {
            tracing::warn!(key = %self.key, error = %e, "favorites payload rejected");
        })
    }

    async fn write(&self, collection: &FavoritesCollection) -> Result<(), StoreError> {
        let payload = collection.to_payload()?;
        self.storage
            .set(&self.key, &payload)
            .await
            .map_err(|e| {
                tracing::warn!(key = %self.key, error = %e, "favorites write failed");
                StoreError::Write(e)
            })
    }

    fn notify(&self, change: FavoritesChange) {
        // No subscribers is not an error.
        let _ = self.changes.send(change);
    }
}

#[cfg(test)]
mod tests {
    use std::io;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    use async_trait::async_trait;

    use super::*;
    use crate::storage::MemoryStorage;

    fn movie(id: &str, title: &str) -> Movie {
        Movie {
            id: id.to_string(),
            title: title.to_string(),
            image: Some(format!("https://img.example/{id}.jpg")),
            year: Some(2010),
            rating: Some(8.8),
            ..Movie::default()
        }
    }

    /// Storage whose reads or writes can be switched to fail.
    #[derive(Default)]
    struct FlakyStorage {
        inner: MemoryStorage,
        fail_reads: AtomicBool,
        fail_writes: AtomicBool,
    }

    #[async_trait]
    impl KeyValueStore for FlakyStorage {
        async fn get(&self, key: &str) -> io::Result<Option<String>> {
            if self.fail_reads.load(Ordering::SeqCst) {
                return Err(io::Error::new(io::ErrorKind::Other, "storage offline"));
            }
            self.inner.get(key).await
        }

        async fn set(&self, key: &str, value: &str) -> io::Result<()> {
            if self.fail_writes.load(Ordering::SeqCst) {
                return Err(io::Error::new(io::ErrorKind::Other, "quota exceeded"));
            }
            // Yield so overlapping mutations get a chance to interleave.
            tokio::task::yield_now().await;
            self.inner.set(key, value).await
        }
    }

    #[tokio::test]
    async fn list_on_fresh_store_is_empty() {
        let store = FavoritesStore::new(MemoryStorage::new());
        assert!(store.list().await.unwrap().is_empty());
        assert!(!store.contains("tt1").await.unwrap());
    }

    #[tokio::test]
    async fn add_then_remove_restores_length() {
        let store = FavoritesStore::new(MemoryStorage::new());
        store.add(&movie("tt0111161", "The Shawshank Redemption")).await.unwrap();
        let before = store.list().await.unwrap().len();

        let m = movie("tt1375666", "Inception");
        store.add(&m).await.unwrap();
        assert!(store.contains(&m.id).await.unwrap());
        store.remove(&m.id).await.unwrap();

        assert!(!store.contains(&m.id).await.unwrap());
        assert_eq!(store.list().await.unwrap().len(), before);
    }

    #[tokio::test]
    async fn add_keeps_duplicates() {
        let store = FavoritesStore::new(MemoryStorage::new());
        let m = movie("tt1", "One");
        store.add(&m).await.unwrap();
        store.add(&m).await.unwrap();
        assert_eq!(store.list().await.unwrap().len(), 2);

        store.remove("tt1").await.unwrap();
        assert!(store.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn remove_absent_id_does_not_write() {
        let store = FavoritesStore::new(MemoryStorage::new());
        store.remove("tt404").await.unwrap();
        assert_eq!(store.storage().get(FAVORITES_KEY).await.unwrap(), None);
    }

    #[tokio::test]
    async fn toggle_twice_round_trips() {
        let store = FavoritesStore::new(MemoryStorage::new());
        let m = movie("tt1375666", "Inception");

        assert!(store.toggle(&m).await.unwrap().added);
        assert!(store.contains(&m.id).await.unwrap());

        assert!(!store.toggle(&m).await.unwrap().added);
        assert!(!store.contains(&m.id).await.unwrap());
    }

    #[tokio::test]
    async fn stored_entry_is_the_projection() {
        let store = FavoritesStore::new(MemoryStorage::new());
        let mut m = movie("tt1375666", "Inception");
        m.genres = vec!["Sci-Fi".to_string()];
        store.toggle(&m).await.unwrap();

        let payload = store.storage().get(FAVORITES_KEY).await.unwrap().unwrap();
        let json: serde_json::Value = serde_json::from_str(&payload).unwrap();
        assert_eq!(json[0]["id"], "tt1375666");
        assert_eq!(json[0]["title"], "Inception");
        assert_eq!(json[0]["year"], 2010);
        assert!(json[0].get("genres").is_none());
    }

    #[tokio::test]
    async fn overlapping_toggles_never_duplicate() {
        let store = Arc::new(FavoritesStore::new(FlakyStorage::default()));
        let m = movie("tt1375666", "Inception");

        let (a, b) = tokio::join!(store.toggle(&m), store.toggle(&m));
        let a = a.unwrap();
        let b = b.unwrap();
        assert_ne!(a.added, b.added, "serialized toggles take opposite branches");

        let entries = store.list().await.unwrap();
        assert!(entries.iter().filter(|e| e.id == m.id).count() <= 1);
    }

    #[tokio::test]
    async fn many_concurrent_adds_are_not_lost() {
        let store = Arc::new(FavoritesStore::new(FlakyStorage::default()));
        let mut handles = Vec::new();
        for i in 0..16 {
            let store = Arc::clone(&store);
            handles.push(tokio::spawn(async move {
                store.toggle(&movie(&format!("tt{i}"), "Title")).await
            }));
        }
        for handle in handles {
            assert!(handle.await.unwrap().unwrap().added);
        }
        assert_eq!(store.list().await.unwrap().len(), 16);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn stores_sharing_a_directory_do_not_fail_each_other() {
        use crate::storage::FileStorage;

        let dir = tempfile::tempdir().unwrap();
        let first = Arc::new(FavoritesStore::new(FileStorage::new(dir.path())));
        let second = Arc::new(FavoritesStore::new(FileStorage::new(dir.path())));

        for round in 0..200 {
            let a = tokio::spawn({
                let store = Arc::clone(&first);
                async move { store.toggle(&movie(&format!("a{round}"), "A")).await }
            });
            let b = tokio::spawn({
                let store = Arc::clone(&second);
                async move { store.toggle(&movie(&format!("b{round}"), "B")).await }
            });
            a.await.unwrap().unwrap();
            b.await.unwrap().unwrap();

            // Last write wins across stores, but the payload is always whole.
            first.list().await.unwrap();
        }
    }

    #[tokio::test]
    async fn corrupt_payload_is_surfaced_not_repaired() {
        let storage = MemoryStorage::new();
        storage.set(FAVORITES_KEY, "not json").await.unwrap();
        let store = FavoritesStore::new(storage);

        let err = store.list().await.unwrap_err();
        assert!(matches!(err, StoreError::Corrupt(_)));
        assert!(err.is_read_error());

        assert!(store.toggle(&movie("tt1", "One")).await.is_err());
        let payload = store.storage().get(FAVORITES_KEY).await.unwrap();
        assert_eq!(payload.as_deref(), Some("not json"));
    }

    #[tokio::test]
    async fn unreachable_storage_is_a_read_error() {
        let storage = FlakyStorage::default();
        storage.fail_reads.store(true, Ordering::SeqCst);
        let store = FavoritesStore::new(storage);
        assert!(matches!(store.list().await.unwrap_err(), StoreError::Read(_)));
    }

    #[tokio::test]
    async fn failed_write_is_reported_and_state_unchanged() {
        let store = FavoritesStore::new(FlakyStorage::default());
        store.toggle(&movie("tt1", "One")).await.unwrap();

        store.storage().fail_writes.store(true, Ordering::SeqCst);
        let mut changes = store.subscribe();
        let err = store.toggle(&movie("tt2", "Two")).await.unwrap_err();
        assert!(matches!(err, StoreError::Write(_)));
        assert!(changes.try_recv().is_err());

        store.storage().fail_writes.store(false, Ordering::SeqCst);
        let ids: Vec<String> = store.list().await.unwrap().into_iter().map(|e| e.id).collect();
        assert_eq!(ids, vec!["tt1"]);
    }

    #[tokio::test]
    async fn subscribers_see_each_persisted_change() {
        let store = FavoritesStore::new(MemoryStorage::new());
        let mut changes = store.subscribe();
        let m = movie("tt1375666", "Inception");

        store.toggle(&m).await.unwrap();
        store.toggle(&m).await.unwrap();
        store.remove("tt404").await.unwrap();

        match changes.recv().await.unwrap() {
            FavoritesChange::Added(entry) => assert_eq!(entry.id, "tt1375666"),
            other => panic!("expected Added, got {other:?}"),
        }
        assert_eq!(
            changes.recv().await.unwrap(),
            FavoritesChange::Removed {
                id: "tt1375666".to_string()
            }
        );
        assert!(changes.try_recv().is_err());
    }

    #[tokio::test]
    async fn custom_key_is_isolated() {
        let store = FavoritesStore::with_key(MemoryStorage::new(), "otherFavorites");
        store.toggle(&movie("tt1", "One")).await.unwrap();
        assert!(store.storage().get(FAVORITES_KEY).await.unwrap().is_none());
        assert!(store.storage().get("otherFavorites").await.unwrap().is_some());
    }
}
