//! C-ABI wrapper around `movie-core`.
//!
//! # Overview
//! Exposes the catalog request builders and response parsers, plus the pure
//! favorites-collection operations, through `extern "C"` functions. Native
//! screens perform the HTTP round-trip and the key-value persistence
//! themselves and never link Rust's async runtime.
//!
//! # Design
//! - Every `extern "C"` function wraps its body in `catch_unwind` so panics
//!   never cross the FFI boundary.
//! - Per-operation `build_*` / `parse_*` mirrors the core API 1:1.
//! - A single `FfiMovieResult` envelope with `FfiDataTag` + `void* data`
//!   conveys success payloads and errors uniformly.
//! - Favorites functions take the stored `favoriteMovies` payload (null when
//!   nothing was stored yet) and hand back the payload to write.
//! - The C caller owns all returned pointers and must call the matching
//!   `movie_free_*` function to release them.

pub mod types;

use std::ffi::CStr;
use std::os::raw::c_char;
use std::panic::catch_unwind;

use movie_core::client::DEFAULT_API_HOST;
use movie_core::http::HttpResponse;
use movie_core::{CatalogClient, FavoritesCollection, Movie, SearchFilters};

use types::*;

/// Borrow a C string as UTF-8. `None` for null or invalid UTF-8.
fn read_str<'a>(ptr: *const c_char) -> Option<&'a str> {
    if ptr.is_null() {
        return None;
    }
    unsafe { CStr::from_ptr(ptr) }.to_str().ok()
}

// ---------------------------------------------------------------------------
// Client lifecycle
// ---------------------------------------------------------------------------

/// Create a new `CatalogClient` bound to `base_url` and authenticated with
/// `api_key`. A null `api_host` selects the default catalog host.
///
/// Returns null if `base_url` or `api_key` is null or if an internal panic
/// occurs. The caller must free the returned pointer with `movie_client_free`.
#[unsafe(no_mangle)]
pub extern "C" fn movie_client_new(
    base_url: *const c_char,
    api_key: *const c_char,
    api_host: *const c_char,
) -> *mut FfiCatalogClient {
    catch_unwind(|| {
        let (Some(url), Some(key)) = (read_str(base_url), read_str(api_key)) else {
            return std::ptr::null_mut();
        };
        let host = read_str(api_host).unwrap_or(DEFAULT_API_HOST);
        let client = CatalogClient::new(url, key, host);
        Box::into_raw(Box::new(FfiCatalogClient { inner: client }))
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Free a `CatalogClient` created by `movie_client_new`. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn movie_client_free(client: *mut FfiCatalogClient) {
    if !client.is_null() {
        let _ = catch_unwind(|| {
            drop(unsafe { Box::from_raw(client) });
        });
    }
}

// ---------------------------------------------------------------------------
// Build request functions
// ---------------------------------------------------------------------------

/// Build an HTTP request for the ranked top listing.
///
/// Returns null if `client` is null.
/// The caller must free the returned pointer with `movie_free_request`.
#[unsafe(no_mangle)]
pub extern "C" fn movie_build_top(client: *const FfiCatalogClient) -> *mut FfiHttpRequest {
    catch_unwind(|| {
        if client.is_null() {
            return std::ptr::null_mut();
        }
        let client = unsafe { &*client };
        FfiHttpRequest::from_core(client.inner.build_top())
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Build an HTTP request for a single title.
///
/// Returns null if `client` or `id` is null, or if `id` is blank.
#[unsafe(no_mangle)]
pub extern "C" fn movie_build_detail(
    client: *const FfiCatalogClient,
    id: *const c_char,
) -> *mut FfiHttpRequest {
    catch_unwind(|| {
        if client.is_null() {
            return std::ptr::null_mut();
        }
        let client = unsafe { &*client };
        match read_str(id) {
            Some(id) if !id.trim().is_empty() => {
                FfiHttpRequest::from_core(client.inner.build_detail(id))
            }
            _ => std::ptr::null_mut(),
        }
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Build an HTTP request for a free-text search.
///
/// `filters_json` may be null (no filters) or a JSON object with any of
/// `genre`, `rows`, `sortField`, `sortOrder`. Returns null if `client` or
/// `query` is null, or if the filters are rejected.
#[unsafe(no_mangle)]
pub extern "C" fn movie_build_search(
    client: *const FfiCatalogClient,
    query: *const c_char,
    filters_json: *const c_char,
) -> *mut FfiHttpRequest {
    catch_unwind(|| {
        if client.is_null() {
            return std::ptr::null_mut();
        }
        let client = unsafe { &*client };
        let Some(query) = read_str(query) else {
            return std::ptr::null_mut();
        };
        let filters = if filters_json.is_null() {
            SearchFilters::default()
        } else {
            match read_str(filters_json).map(SearchFilters::from_json) {
                Some(Ok(filters)) => filters,
                _ => return std::ptr::null_mut(),
            }
        };
        match client.inner.build_search(query, &filters) {
            Ok(req) => FfiHttpRequest::from_core(req),
            Err(_) => std::ptr::null_mut(),
        }
    })
    .unwrap_or(std::ptr::null_mut())
}

// ---------------------------------------------------------------------------
// Parse response functions
// ---------------------------------------------------------------------------

/// Convert an `FfiHttpResponse` to a core `HttpResponse`. A null body is
/// read as empty.
fn ffi_response_to_core(resp: &FfiHttpResponse) -> HttpResponse {
    HttpResponse {
        status: resp.status,
        headers: Vec::new(),
        body: read_str(resp.body).unwrap_or("").to_string(),
    }
}

/// Resolve the two pointers every parse function takes.
fn parse_args<'a>(
    client: *const FfiCatalogClient,
    response: *const FfiHttpResponse,
) -> Result<(&'a CatalogClient, HttpResponse), *mut FfiMovieResult> {
    if client.is_null() {
        return Err(FfiMovieResult::null_arg("client"));
    }
    if response.is_null() {
        return Err(FfiMovieResult::null_arg("response"));
    }
    let client = unsafe { &*client };
    let resp = unsafe { &*response };
    Ok((&client.inner, ffi_response_to_core(resp)))
}

/// Parse the response of a top-listing request, keeping at most `limit`
/// titles. A negative `limit` keeps the whole listing.
///
/// Returns a result with `data_tag = MovieList` on success.
#[unsafe(no_mangle)]
pub extern "C" fn movie_parse_top(
    client: *const FfiCatalogClient,
    response: *const FfiHttpResponse,
    limit: i64,
) -> *mut FfiMovieResult {
    catch_unwind(|| {
        let (client, resp) = match parse_args(client, response) {
            Ok(args) => args,
            Err(result) => return result,
        };
        let limit = usize::try_from(limit).ok();
        match client.parse_top(resp, limit) {
            Ok(movies) => FfiMovieResult::ok_movie_list(movies),
            Err(e) => FfiMovieResult::from_catalog_error(e),
        }
    })
    .unwrap_or_else(|_| FfiMovieResult::panic("panic in movie_parse_top"))
}

/// Parse the response of a detail request.
///
/// Returns a result with `data_tag = Movie` on success.
#[unsafe(no_mangle)]
pub extern "C" fn movie_parse_detail(
    client: *const FfiCatalogClient,
    response: *const FfiHttpResponse,
) -> *mut FfiMovieResult {
    catch_unwind(|| {
        let (client, resp) = match parse_args(client, response) {
            Ok(args) => args,
            Err(result) => return result,
        };
        match client.parse_detail(resp) {
            Ok(movie) => FfiMovieResult::ok_movie(movie),
            Err(e) => FfiMovieResult::from_catalog_error(e),
        }
    })
    .unwrap_or_else(|_| FfiMovieResult::panic("panic in movie_parse_detail"))
}

/// Parse the response of a search request.
///
/// Returns a result with `data_tag = MovieList` on success.
#[unsafe(no_mangle)]
pub extern "C" fn movie_parse_search(
    client: *const FfiCatalogClient,
    response: *const FfiHttpResponse,
) -> *mut FfiMovieResult {
    catch_unwind(|| {
        let (client, resp) = match parse_args(client, response) {
            Ok(args) => args,
            Err(result) => return result,
        };
        match client.parse_search(resp) {
            Ok(movies) => FfiMovieResult::ok_movie_list(movies),
            Err(e) => FfiMovieResult::from_catalog_error(e),
        }
    })
    .unwrap_or_else(|_| FfiMovieResult::panic("panic in movie_parse_search"))
}

// ---------------------------------------------------------------------------
// Favorites functions
// ---------------------------------------------------------------------------

/// Decode the stored payload. A null `payload` means nothing was stored.
fn load_collection(payload: *const c_char) -> Result<FavoritesCollection, *mut FfiMovieResult> {
    if payload.is_null() {
        return Ok(FavoritesCollection::new());
    }
    let Some(payload) = read_str(payload) else {
        return Err(FfiMovieResult::invalid_input(
            "payload is not valid UTF-8".to_string(),
        ));
    };
    FavoritesCollection::from_payload(Some(payload)).map_err(FfiMovieResult::from_store_error)
}

/// List the favorites in stored order.
///
/// Returns a result with `data_tag = FavoriteList` on success, or
/// `StorageRead` if the payload is corrupt.
#[unsafe(no_mangle)]
pub extern "C" fn movie_favorites_list(payload: *const c_char) -> *mut FfiMovieResult {
    catch_unwind(|| match load_collection(payload) {
        Ok(collection) => FfiMovieResult::ok_favorites(collection.into_entries()),
        Err(result) => result,
    })
    .unwrap_or_else(|_| FfiMovieResult::panic("panic in movie_favorites_list"))
}

/// Returns 1 if `id` is a favorite, 0 if not, and -1 if `id` is null or the
/// payload cannot be read.
#[unsafe(no_mangle)]
pub extern "C" fn movie_favorites_contains(payload: *const c_char, id: *const c_char) -> i32 {
    catch_unwind(|| {
        let Some(id) = read_str(id) else {
            return -1;
        };
        match load_collection(payload) {
            Ok(collection) => i32::from(collection.contains(id)),
            Err(result) => {
                unsafe { FfiMovieResult::free(result) };
                -1
            }
        }
    })
    .unwrap_or(-1)
}

/// Toggle `movie_json` (a `Movie` as JSON) in the collection.
///
/// Returns a result with `data_tag = FavoritesUpdate` whose payload the host
/// must persist; `added` tells which branch was taken.
#[unsafe(no_mangle)]
pub extern "C" fn movie_favorites_toggle(
    payload: *const c_char,
    movie_json: *const c_char,
) -> *mut FfiMovieResult {
    catch_unwind(|| {
        let Some(movie_json) = read_str(movie_json) else {
            return FfiMovieResult::null_arg("movie_json");
        };
        let movie: Movie = match serde_json::from_str(movie_json) {
            Ok(movie) => movie,
            Err(e) => return FfiMovieResult::invalid_input(format!("invalid movie: {e}")),
        };
        let mut collection = match load_collection(payload) {
            Ok(collection) => collection,
            Err(result) => return result,
        };
        let outcome = collection.toggle(&movie);
        match collection.to_payload() {
            Ok(payload) => FfiMovieResult::ok_update(payload, outcome.added, true),
            Err(e) => FfiMovieResult::from_store_error(e),
        }
    })
    .unwrap_or_else(|_| FfiMovieResult::panic("panic in movie_favorites_toggle"))
}

/// Remove every entry for `id`.
///
/// Returns a result with `data_tag = FavoritesUpdate`. When `changed` is
/// false the id was absent and the host should skip the write.
#[unsafe(no_mangle)]
pub extern "C" fn movie_favorites_remove(
    payload: *const c_char,
    id: *const c_char,
) -> *mut FfiMovieResult {
    catch_unwind(|| {
        let Some(id) = read_str(id) else {
            return FfiMovieResult::null_arg("id");
        };
        let mut collection = match load_collection(payload) {
            Ok(collection) => collection,
            Err(result) => return result,
        };
        let changed = collection.remove(id);
        match collection.to_payload() {
            Ok(payload) => FfiMovieResult::ok_update(payload, false, changed),
            Err(e) => FfiMovieResult::from_store_error(e),
        }
    })
    .unwrap_or_else(|_| FfiMovieResult::panic("panic in movie_favorites_remove"))
}

// ---------------------------------------------------------------------------
// Free functions
// ---------------------------------------------------------------------------

/// Free an `FfiHttpRequest` returned by any `movie_build_*` function.
/// Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn movie_free_request(req: *mut FfiHttpRequest) {
    if req.is_null() {
        return;
    }
    let _ = catch_unwind(|| unsafe { FfiHttpRequest::free(req) });
}

/// Free an `FfiMovieResult` returned by any `movie_parse_*` or
/// `movie_favorites_*` function. Safe to call with null. Uses `data_tag` to
/// determine what `data` points to.
#[unsafe(no_mangle)]
pub extern "C" fn movie_free_result(result: *mut FfiMovieResult) {
    if result.is_null() {
        return;
    }
    let _ = catch_unwind(|| unsafe { FfiMovieResult::free(result) });
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
