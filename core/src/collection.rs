//! The favorites collection as a pure value.
//!
//! The collection is persisted as one JSON array under a single key, and every
//! mutation rewrites it whole. This type holds the read-modify-write logic
//! with no I/O so that `FavoritesStore` and the C host share one
//! implementation.

use crate::error::StoreError;
use crate::types::{FavoriteEntry, Movie};

/// Which branch a toggle took.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToggleOutcome {
    pub added: bool,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FavoritesCollection {
    entries: Vec<FavoriteEntry>,
}

impl FavoritesCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode a stored payload. `None` means nothing was ever written.
    pub fn from_payload(payload: Option<&str>) -> Result<Self, StoreError> {
        let Some(payload) = payload else {
            return Ok(Self::new());
        };
        let entries = serde_json::from_str(payload).map_err(StoreError::Corrupt)?;
        Ok(Self { entries })
    }

    /// Encode for storage. A failure is reported as a write error so the
    /// caller never persists a substitute payload.
    pub fn to_payload(&self) -> Result<String, StoreError> {
        serde_json::to_string(&self.entries).map_err(|e| StoreError::Write(e.into()))
    }

    pub fn entries(&self) -> &[FavoriteEntry] {
        &self.entries
    }

    pub fn into_entries(self) -> Vec<FavoriteEntry> {
        self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.iter().any(|e| e.id == id)
    }

    /// Append without checking for an existing entry with the same id.
    pub fn push(&mut self, entry: FavoriteEntry) {
        self.entries.push(entry);
    }

    /// Drop every entry with `id`. Returns whether anything was removed.
    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.id != id);
        self.entries.len() != before
    }

    /// Remove `movie` if present, otherwise append its projection.
    pub fn toggle(&mut self, movie: &Movie) -> ToggleOutcome {
        if self.remove(&movie.id) {
            ToggleOutcome { added: false }
        } else {
            self.push(FavoriteEntry::from(movie));
            ToggleOutcome { added: true }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn movie(id: &str, title: &str) -> Movie {
        Movie {
            id: id.to_string(),
            title: title.to_string(),
            ..Movie::default()
        }
    }

    #[test]
    fn absent_payload_is_empty() {
        let collection = FavoritesCollection::from_payload(None).unwrap();
        assert!(collection.is_empty());
    }

    #[test]
    fn malformed_payload_is_corrupt() {
        let err = FavoritesCollection::from_payload(Some("{\"id\":1")).unwrap_err();
        assert!(matches!(err, StoreError::Corrupt(_)));

        let err = FavoritesCollection::from_payload(Some(r#"{"id":"tt1"}"#)).unwrap_err();
        assert!(matches!(err, StoreError::Corrupt(_)));
    }

    #[test]
    fn payload_preserves_insertion_order() {
        let mut collection = FavoritesCollection::new();
        collection.push(FavoriteEntry::from(&movie("tt3", "C")));
        collection.push(FavoriteEntry::from(&movie("tt1", "A")));
        collection.push(FavoriteEntry::from(&movie("tt2", "B")));

        let reread = FavoritesCollection::from_payload(Some(&collection.to_payload().unwrap())).unwrap();
        let ids: Vec<&str> = reread.entries().iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["tt3", "tt1", "tt2"]);
    }

    #[test]
    fn non_finite_rating_encodes_without_dropping_entries() {
        let mut collection = FavoritesCollection::new();
        collection.push(FavoriteEntry::from(&movie("tt1", "A")));
        collection.push(FavoriteEntry {
            rating: Some(f64::NAN),
            ..FavoriteEntry::from(&movie("tt2", "B"))
        });

        let payload = collection.to_payload().unwrap();
        let reread = FavoritesCollection::from_payload(Some(&payload)).unwrap();
        assert_eq!(reread.len(), 2);
        assert_eq!(reread.entries()[1].rating, None);
    }

    #[test]
    fn push_does_not_deduplicate() {
        let mut collection = FavoritesCollection::new();
        collection.push(FavoriteEntry::from(&movie("tt1", "A")));
        collection.push(FavoriteEntry::from(&movie("tt1", "A")));
        assert_eq!(collection.len(), 2);
    }

    #[test]
    fn remove_missing_id_reports_nothing_removed() {
        let mut collection = FavoritesCollection::new();
        collection.push(FavoriteEntry::from(&movie("tt1", "A")));
        assert!(!collection.remove("tt9"));
        assert_eq!(collection.len(), 1);
    }

    #[test]
    fn toggle_adds_then_removes() {
        let mut collection = FavoritesCollection::new();
        let m = movie("tt1375666", "Inception");

        assert_eq!(collection.toggle(&m), ToggleOutcome { added: true });
        assert!(collection.contains("tt1375666"));

        assert_eq!(collection.toggle(&m), ToggleOutcome { added: false });
        assert!(!collection.contains("tt1375666"));
        assert!(collection.is_empty());
    }

    #[test]
    fn toggle_clears_existing_duplicates() {
        let mut collection = FavoritesCollection::new();
        let m = movie("tt1", "A");
        collection.push(FavoriteEntry::from(&m));
        collection.push(FavoriteEntry::from(&m));

        assert!(!collection.toggle(&m).added);
        assert!(collection.is_empty());
    }
}
