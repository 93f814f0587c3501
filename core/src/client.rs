//! Stateless HTTP request builder and response parser for the catalog service.
//!
//! # Design
//! `CatalogClient` holds only the base URL and the credential headers and
//! carries no mutable state between calls. Each operation is split into a
//! `build_*` method that produces an `HttpRequest` and a `parse_*` method
//! that consumes an `HttpResponse`. The caller executes the HTTP round-trip,
//! keeping the core deterministic and free of I/O dependencies.
//!
//! Every `parse_*` method funnels the body through the matching raw shape in
//! `normalize`, so all three endpoints yield the same `Movie` layout.

use serde::de::DeserializeOwned;

use crate::config::CatalogConfig;
use crate::error::CatalogError;
use crate::filters::SearchFilters;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::normalize::{normalize, DetailRecord, ListingItem, RawMovie, SearchPage};
use crate::types::Movie;

pub const DEFAULT_BASE_URL: &str = "https://imdb236.p.rapidapi.com/imdb";
pub const DEFAULT_API_HOST: &str = "imdb236.p.rapidapi.com";

pub const API_KEY_HEADER: &str = "x-rapidapi-key";
pub const API_HOST_HEADER: &str = "x-rapidapi-host";

/// Synchronous, stateless client for the catalog service.
///
/// Builds `HttpRequest` values and parses `HttpResponse` values without
/// touching the network.
#[derive(Debug, Clone)]
pub struct CatalogClient {
    base_url: String,
    api_key: String,
    api_host: String,
}

impl CatalogClient {
    pub fn new(base_url: &str, api_key: &str, api_host: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            api_host: api_host.to_string(),
        }
    }

    pub fn from_config(config: &CatalogConfig) -> Self {
        Self::new(&config.base_url, &config.api_key, &config.api_host)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn get(&self, url: String) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Get,
            url,
            headers: vec![
                (API_KEY_HEADER.to_string(), self.api_key.clone()),
                (API_HOST_HEADER.to_string(), self.api_host.clone()),
            ],
        }
    }

    pub fn build_top(&self) -> HttpRequest {
        self.get(format!("{}/top250-movies", self.base_url))
    }

    pub fn build_detail(&self, id: &str) -> HttpRequest {
        self.get(format!("{}/{}", self.base_url, urlencoding::encode(id.trim())))
    }

    /// Build a search request. An empty `query` is sent as-is and yields the
    /// service's default result set.
    pub fn build_search(
        &self,
        query: &str,
        filters: &SearchFilters,
    ) -> Result<HttpRequest, CatalogError> {
        filters.validate()?;

        let mut pairs = vec![("type", "movie".to_string()), ("query", query.to_string())];
        pairs.extend(filters.query_pairs());
        let query_string = pairs
            .iter()
            .map(|(k, v)| format!("{k}={}", urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&");

        Ok(self.get(format!("{}/search?{query_string}", self.base_url)))
    }

    /// Parse the top-N listing, keeping at most `limit` titles in rank order.
    pub fn parse_top(
        &self,
        response: HttpResponse,
        limit: Option<usize>,
    ) -> Result<Vec<Movie>, CatalogError> {
        check_status(&response)?;
        let items: Vec<ListingItem> = decode(&response.body)?;
        let limit = limit.unwrap_or(items.len());
        Ok(items
            .into_iter()
            .take(limit)
            .map(|item| normalize(RawMovie::Listing(item)))
            .collect())
    }

    pub fn parse_detail(&self, response: HttpResponse) -> Result<Movie, CatalogError> {
        if response.status == 404 {
            return Err(CatalogError::NotFound);
        }
        check_status(&response)?;
        let record: Option<DetailRecord> = decode(&response.body)?;
        let record = record.ok_or(CatalogError::NotFound)?;
        Ok(normalize(RawMovie::Detail(record)))
    }

    pub fn parse_search(&self, response: HttpResponse) -> Result<Vec<Movie>, CatalogError> {
        check_status(&response)?;
        let page: SearchPage = decode(&response.body)?;
        Ok(page
            .results
            .into_iter()
            .map(|hit| normalize(RawMovie::Search(hit)))
            .collect())
    }
}

/// Map non-success status codes to the appropriate `CatalogError` variant.
fn check_status(response: &HttpResponse) -> Result<(), CatalogError> {
    if response.is_success() {
        return Ok(());
    }
    if matches!(response.status, 401 | 403) {
        return Err(CatalogError::Auth {
            status: response.status,
        });
    }
    Err(CatalogError::Http {
        status: response.status,
        body: response.body.clone(),
    })
}

fn decode<T: DeserializeOwned>(body: &str) -> Result<T, CatalogError> {
    serde_json::from_str(body).map_err(|e| CatalogError::Decode(e.to_string()))
}
