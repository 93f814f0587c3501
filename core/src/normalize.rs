//! Raw catalog response shapes and their mapping onto `Movie`.
//!
//! # Design
//! Each endpoint answers with its own record layout. They are modelled as
//! separate serde types and collected in the tagged `RawMovie` union; there
//! is exactly one mapping function per shape, and `CatalogClient` never reads
//! a raw field directly.

use serde::Deserialize;

use crate::types::Movie;

/// One entry of the top-N listing.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingItem {
    pub id: String,
    pub primary_title: Option<String>,
    pub original_title: Option<String>,
    pub primary_image: Option<String>,
    pub start_year: Option<u32>,
    pub average_rating: Option<f64>,
    pub genres: Option<Vec<String>>,
}

/// The full record served by the single-title endpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetailRecord {
    pub id: String,
    pub primary_title: Option<String>,
    pub original_title: Option<String>,
    pub primary_image: Option<String>,
    pub start_year: Option<u32>,
    pub average_rating: Option<f64>,
    pub genres: Option<Vec<String>>,
    pub description: Option<String>,
    pub countries_of_origin: Option<Vec<String>>,
    pub spoken_languages: Option<Vec<String>>,
}

/// A single match inside a `SearchPage`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchHit {
    pub id: String,
    pub primary_title: Option<String>,
    pub original_title: Option<String>,
    pub primary_image: Option<String>,
    pub start_year: Option<u32>,
    pub average_rating: Option<f64>,
    pub genres: Option<Vec<String>>,
}

/// Envelope returned by the search endpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchPage {
    #[serde(default)]
    pub results: Vec<SearchHit>,
    pub num_found: Option<u64>,
}

/// A raw record tagged with the endpoint that produced it.
#[derive(Debug, Clone)]
pub enum RawMovie {
    Listing(ListingItem),
    Detail(DetailRecord),
    Search(SearchHit),
}

impl From<RawMovie> for Movie {
    fn from(raw: RawMovie) -> Self {
        normalize(raw)
    }
}

/// Map any raw record onto the canonical `Movie`.
pub fn normalize(raw: RawMovie) -> Movie {
    match raw {
        RawMovie::Listing(item) => from_listing(item),
        RawMovie::Detail(record) => from_detail(record),
        RawMovie::Search(hit) => from_search_hit(hit),
    }
}

fn from_listing(item: ListingItem) -> Movie {
    Movie {
        title: title(item.primary_title, item.original_title),
        image: non_empty(item.primary_image),
        year: item.start_year,
        rating: rating(item.average_rating),
        genres: item.genres.unwrap_or_default(),
        id: item.id,
        ..Movie::default()
    }
}

fn from_detail(record: DetailRecord) -> Movie {
    Movie {
        title: title(record.primary_title, record.original_title),
        image: non_empty(record.primary_image),
        year: record.start_year,
        rating: rating(record.average_rating),
        genres: record.genres.unwrap_or_default(),
        description: non_empty(record.description),
        countries_of_origin: record.countries_of_origin.unwrap_or_default(),
        spoken_languages: record.spoken_languages.unwrap_or_default(),
        id: record.id,
    }
}

fn from_search_hit(hit: SearchHit) -> Movie {
    Movie {
        title: title(hit.primary_title, hit.original_title),
        image: non_empty(hit.primary_image),
        year: hit.start_year,
        rating: rating(hit.average_rating),
        genres: hit.genres.unwrap_or_default(),
        id: hit.id,
        ..Movie::default()
    }
}

fn title(primary: Option<String>, original: Option<String>) -> String {
    non_empty(primary).or(non_empty(original)).unwrap_or_default()
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

fn rating(value: Option<f64>) -> Option<f64> {
    value.filter(|r| (0.0..=10.0).contains(r))
}

#[cfg(test)]
mod tests {
    use super::*;

    const INCEPTION_DETAIL: &str = r#"{
        "id": "tt1375666",
        "url": "https://www.imdb.com/title/tt1375666/",
        "primaryTitle": "Inception",
        "originalTitle": "Inception",
        "primaryImage": "https://img.example/inception.jpg",
        "startYear": 2010,
        "averageRating": 8.8,
        "genres": ["Action", "Adventure", "Sci-Fi"],
        "description": "A thief who steals corporate secrets through dream-sharing.",
        "countriesOfOrigin": ["US", "GB"],
        "spokenLanguages": ["en", "ja", "fr"]
    }"#;

    const INCEPTION_LISTING: &str = r#"{
        "id": "tt1375666",
        "primaryTitle": "Inception",
        "primaryImage": "https://img.example/inception.jpg",
        "startYear": 2010,
        "averageRating": 8.8
    }"#;

    #[test]
    fn detail_maps_every_field() {
        let record: DetailRecord = serde_json::from_str(INCEPTION_DETAIL).unwrap();
        let movie = normalize(RawMovie::Detail(record));
        assert_eq!(movie.id, "tt1375666");
        assert_eq!(movie.title, "Inception");
        assert_eq!(movie.image.as_deref(), Some("https://img.example/inception.jpg"));
        assert_eq!(movie.year, Some(2010));
        assert_eq!(movie.rating, Some(8.8));
        assert_eq!(movie.genres, vec!["Action", "Adventure", "Sci-Fi"]);
        assert_eq!(movie.countries_of_origin, vec!["US", "GB"]);
        assert_eq!(movie.spoken_languages, vec!["en", "ja", "fr"]);
        assert!(movie.description.is_some());
    }

    #[test]
    fn listing_and_detail_agree_on_identity() {
        let detail: DetailRecord = serde_json::from_str(INCEPTION_DETAIL).unwrap();
        let listing: ListingItem = serde_json::from_str(INCEPTION_LISTING).unwrap();
        let from_detail = Movie::from(RawMovie::Detail(detail));
        let from_listing = Movie::from(RawMovie::Listing(listing));

        assert_eq!(from_detail.id, from_listing.id);
        assert_eq!(from_detail.title, from_listing.title);
        assert_eq!(from_detail.image, from_listing.image);
        assert_eq!(from_detail.year, from_listing.year);
        assert_eq!(from_detail.rating, from_listing.rating);
        assert!(from_listing.genres.is_empty());
        assert!(from_listing.description.is_none());
    }

    #[test]
    fn search_hit_maps_onto_movie() {
        let page: SearchPage = serde_json::from_str(
            r#"{"results":[{"id":"tt0068646","primaryTitle":"The Godfather","startYear":1972,"averageRating":9.2}],"numFound":1}"#,
        )
        .unwrap();
        assert_eq!(page.num_found, Some(1));
        let hit = page.results.into_iter().next().unwrap();
        let movie = normalize(RawMovie::Search(hit));
        assert_eq!(movie.title, "The Godfather");
        assert!(movie.image.is_none());
    }

    #[test]
    fn title_falls_back_to_original_title() {
        let item: ListingItem = serde_json::from_str(
            r#"{"id":"tt0245429","primaryTitle":"","originalTitle":"Sen to Chihiro no kamikakushi"}"#,
        )
        .unwrap();
        assert_eq!(normalize(RawMovie::Listing(item)).title, "Sen to Chihiro no kamikakushi");
    }

    #[test]
    fn null_lists_become_empty() {
        let record: DetailRecord = serde_json::from_str(
            r#"{"id":"tt1","primaryTitle":"X","genres":null,"countriesOfOrigin":null}"#,
        )
        .unwrap();
        let movie = normalize(RawMovie::Detail(record));
        assert!(movie.genres.is_empty());
        assert!(movie.countries_of_origin.is_empty());
        assert!(movie.spoken_languages.is_empty());
    }

    #[test]
    fn out_of_range_rating_is_dropped() {
        let item: ListingItem =
            serde_json::from_str(r#"{"id":"tt1","primaryTitle":"X","averageRating":42.0}"#).unwrap();
        assert!(normalize(RawMovie::Listing(item)).rating.is_none());
    }
}
