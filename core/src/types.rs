//! Canonical domain types shared by the catalog client and the favorites store.
//!
//! # Design
//! `Movie` is the single shape every endpoint is normalized into; screens
//! never see the raw response variants. `FavoriteEntry` is the durable
//! projection kept in storage, and its serde shape is the on-disk format, so
//! every field but `id` is optional when reading to stay compatible with
//! entries written under an older layout.

use serde::{Deserialize, Serialize};

/// A catalog title, as returned by every `RemoteCatalog` operation.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Movie {
    pub id: String,
    pub title: String,
    pub image: Option<String>,
    pub year: Option<u32>,
    /// 0 to 10. Absent for titles without enough votes.
    pub rating: Option<f64>,
    #[serde(default)]
    pub genres: Vec<String>,
    pub description: Option<String>,
    #[serde(default)]
    pub countries_of_origin: Vec<String>,
    #[serde(default)]
    pub spoken_languages: Vec<String>,
}

/// A favorited title as persisted in the favorites collection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FavoriteEntry {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub year: Option<u32>,
    #[serde(default)]
    pub rating: Option<f64>,
}

impl From<&Movie> for FavoriteEntry {
    fn from(movie: &Movie) -> Self {
        Self {
            id: movie.id.clone(),
            title: movie.title.clone(),
            image: movie.image.clone(),
            year: movie.year,
            rating: movie.rating,
        }
    }
}
