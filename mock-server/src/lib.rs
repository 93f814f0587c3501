use std::{cmp::Ordering, sync::Arc};

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;

/// Key accepted by `app()`.
pub const DEFAULT_API_KEY: &str = "test-key";
pub const API_KEY_HEADER: &str = "x-rapidapi-key";

const SEED: &str = include_str!("../data/catalog.json");
const DEFAULT_ROWS: usize = 25;
const MAX_ROWS: usize = 50;
const SORT_FIELDS: [&str; 4] = ["id", "primaryTitle", "startYear", "averageRating"];

/// A title as the detail endpoint serves it.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Title {
    pub id: String,
    pub primary_title: String,
    pub original_title: String,
    pub primary_image: Option<String>,
    pub start_year: Option<u32>,
    pub average_rating: Option<f64>,
    pub genres: Vec<String>,
    pub description: Option<String>,
    pub countries_of_origin: Vec<String>,
    pub spoken_languages: Vec<String>,
}

/// The reduced record used by the top listing.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingEntry {
    pub id: String,
    pub url: String,
    pub primary_title: String,
    pub primary_image: Option<String>,
    pub start_year: Option<u32>,
    pub average_rating: Option<f64>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchEntry {
    pub id: String,
    pub primary_title: String,
    pub original_title: String,
    pub primary_image: Option<String>,
    pub start_year: Option<u32>,
    pub average_rating: Option<f64>,
    pub genres: Vec<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResults {
    pub results: Vec<SearchEntry>,
    pub num_found: usize,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchParams {
    pub query: Option<String>,
    pub genre: Option<String>,
    pub rows: Option<usize>,
    pub sort_field: Option<String>,
    pub sort_order: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

impl From<&Title> for ListingEntry {
    fn from(t: &Title) -> Self {
        Self {
            id: t.id.clone(),
            url: format!("https://www.imdb.com/title/{}/", t.id),
            primary_title: t.primary_title.clone(),
            primary_image: t.primary_image.clone(),
            start_year: t.start_year,
            average_rating: t.average_rating,
        }
    }
}

impl From<&Title> for SearchEntry {
    fn from(t: &Title) -> Self {
        Self {
            id: t.id.clone(),
            primary_title: t.primary_title.clone(),
            original_title: t.original_title.clone(),
            primary_image: t.primary_image.clone(),
            start_year: t.start_year,
            average_rating: t.average_rating,
            genres: t.genres.clone(),
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    titles: Arc<Vec<Title>>,
    api_key: Arc<str>,
}

impl AppState {
    pub fn new(titles: Vec<Title>, api_key: &str) -> Self {
        Self {
            titles: Arc::new(titles),
            api_key: Arc::from(api_key),
        }
    }

    /// State backed by the bundled catalog fixture.
    pub fn seeded(api_key: &str) -> Self {
        let titles = serde_json::from_str(SEED).unwrap_or_else(|e| {
            tracing::error!(error = %e, "bundled catalog fixture is invalid");
            Vec::new()
        });
        Self::new(titles, api_key)
    }

    pub fn titles(&self) -> &[Title] {
        &self.titles
    }
}

pub fn app() -> Router {
    app_with_state(AppState::seeded(DEFAULT_API_KEY))
}

pub fn app_with_state(state: AppState) -> Router {
    Router::new()
        .route("/imdb/top250-movies", get(top_movies))
        .route("/imdb/search", get(search))
        .route("/imdb/{id}", get(get_title))
        .with_state(state)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

pub async fn run_with_state(listener: TcpListener, state: AppState) -> Result<(), std::io::Error> {
    axum::serve(listener, app_with_state(state)).await
}

/// 401 when the key header is missing, 403 when it does not match.
fn authorize(headers: &HeaderMap, state: &AppState) -> Result<(), StatusCode> {
    match headers.get(API_KEY_HEADER).and_then(|v| v.to_str().ok()) {
        None => Err(StatusCode::UNAUTHORIZED),
        Some(key) if key == &*state.api_key => Ok(()),
        Some(_) => {
            tracing::debug!("rejected request with wrong API key");
            Err(StatusCode::FORBIDDEN)
        }
    }
}

async fn top_movies(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Vec<ListingEntry>>, StatusCode> {
    authorize(&headers, &state)?;
    let mut ranked: Vec<&Title> = state.titles.iter().collect();
    ranked.sort_by(|a, b| compare_rating(b.average_rating, a.average_rating));
    Ok(Json(ranked.into_iter().map(ListingEntry::from).collect()))
}

async fn get_title(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<Title>, StatusCode> {
    authorize(&headers, &state)?;
    state
        .titles
        .iter()
        .find(|t| t.id == id)
        .cloned()
        .map(Json)
        .ok_or(StatusCode::NOT_FOUND)
}

async fn search(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<SearchParams>,
) -> Result<Json<SearchResults>, StatusCode> {
    authorize(&headers, &state)?;
    if params.kind.as_deref().is_some_and(|k| k != "movie") {
        return Ok(Json(SearchResults {
            results: Vec::new(),
            num_found: 0,
        }));
    }

    let query = params.query.unwrap_or_default().to_lowercase();
    let mut matches: Vec<&Title> = state
        .titles
        .iter()
        .filter(|t| {
            query.is_empty()
                || t.primary_title.to_lowercase().contains(&query)
                || t.original_title.to_lowercase().contains(&query)
        })
        .filter(|t| match &params.genre {
            Some(genre) => t.genres.iter().any(|g| g.eq_ignore_ascii_case(genre)),
            None => true,
        })
        .collect();

    let descending = match params.sort_order.as_deref() {
        None => false,
        Some(o) if o.eq_ignore_ascii_case("asc") => false,
        Some(o) if o.eq_ignore_ascii_case("desc") => true,
        Some(_) => return Err(StatusCode::BAD_REQUEST),
    };
    if let Some(field) = params.sort_field.as_deref() {
        if !SORT_FIELDS.contains(&field) {
            return Err(StatusCode::BAD_REQUEST);
        }
        matches.sort_by(|a, b| match field {
            "primaryTitle" => a.primary_title.cmp(&b.primary_title),
            "startYear" => a.start_year.cmp(&b.start_year),
            "averageRating" => compare_rating(a.average_rating, b.average_rating),
            _ => a.id.cmp(&b.id),
        });
        if descending {
            matches.reverse();
        }
    }

    let num_found = matches.len();
    let rows = params.rows.unwrap_or(DEFAULT_ROWS).min(MAX_ROWS);
    let results = matches.into_iter().take(rows).map(SearchEntry::from).collect();
    Ok(Json(SearchResults { results, num_found }))
}

/// Unrated titles sort below every rated one.
fn compare_rating(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
        (Some(_), None) => Ordering::Greater,
        (None, Some(_)) => Ordering::Less,
        (None, None) => Ordering::Equal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seed_fixture_parses() {
        let state = AppState::seeded(DEFAULT_API_KEY);
        assert!(state.titles().len() >= 8);
        assert!(state.titles().iter().any(|t| t.id == "tt1375666"));
    }

    #[test]
    fn listing_entry_drops_detail_fields() {
        let state = AppState::seeded(DEFAULT_API_KEY);
        let entry = ListingEntry::from(&state.titles()[0]);
        let json = serde_json::to_value(&entry).unwrap();
        assert!(json.get("description").is_none());
        assert!(json.get("spokenLanguages").is_none());
        assert!(json["url"].as_str().unwrap().contains(&entry.id));
    }

    #[test]
    fn title_serializes_camel_case() {
        let state = AppState::seeded(DEFAULT_API_KEY);
        let json = serde_json::to_value(&state.titles()[0]).unwrap();
        assert!(json.get("primaryTitle").is_some());
        assert!(json.get("countriesOfOrigin").is_some());
    }

    #[test]
    fn unrated_titles_sort_last() {
        assert_eq!(compare_rating(Some(1.0), None), Ordering::Greater);
        assert_eq!(compare_rating(None, Some(1.0)), Ordering::Less);
        assert_eq!(compare_rating(Some(8.8), Some(9.3)), Ordering::Less);
    }

    #[test]
    fn search_params_accept_the_client_query_string() {
        let params: SearchParams = serde_json::from_value(serde_json::json!({
            "type": "movie",
            "query": "inception",
            "genre": "Drama",
            "rows": 25,
            "sortField": "id",
            "sortOrder": "ASC"
        }))
        .unwrap();
        assert_eq!(params.kind.as_deref(), Some("movie"));
        assert_eq!(params.sort_field.as_deref(), Some("id"));
    }
}
