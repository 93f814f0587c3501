//! `#[repr(C)]` types for the FFI boundary.
//!
//! # Design
//! Each type mirrors a core type but uses C-compatible representations:
//! `*mut c_char` instead of `String`, raw pointers instead of `Vec`, and
//! tagged enums with explicit discriminants. Optional numbers travel as a
//! `has_*` flag next to the value. Conversion functions live here to keep
//! `lib.rs` focused on the `extern "C"` surface.

use std::ffi::{c_void, CString};
use std::os::raw::c_char;

use movie_core::error::{CatalogError, StoreError};
use movie_core::http::HttpMethod;
use movie_core::{FavoriteEntry, Movie};

/// Opaque handle to a `CatalogClient`. C callers receive a pointer to this
/// and pass it back into every catalog function.
pub struct FfiCatalogClient {
    pub(crate) inner: movie_core::CatalogClient,
}

/// Convert an owned string into a C string. Interior NUL bytes are dropped.
pub(crate) fn c_string(s: String) -> *mut c_char {
    let s = if s.contains('\0') { s.replace('\0', "") } else { s };
    CString::new(s).unwrap_or_default().into_raw()
}

fn c_string_opt(s: Option<String>) -> *mut c_char {
    s.map_or(std::ptr::null_mut(), c_string)
}

/// Free a C string allocated by `c_string`. Null is ignored.
pub(crate) fn free_c_string(s: *mut c_char) {
    if !s.is_null() {
        drop(unsafe { CString::from_raw(s) });
    }
}

/// Leak a vector as a (pointer, length) pair. Empty vectors become null.
fn into_raw_parts<T>(items: Vec<T>) -> (*mut T, u32) {
    if items.is_empty() {
        return (std::ptr::null_mut(), 0);
    }
    let len = items.len() as u32;
    let boxed = items.into_boxed_slice();
    (Box::into_raw(boxed) as *mut T, len)
}

/// Reclaim a vector leaked by `into_raw_parts`.
///
/// # Safety
/// `ptr` and `len` must come from a single `into_raw_parts` call.
unsafe fn from_raw_parts<T>(ptr: *mut T, len: u32) -> Vec<T> {
    if ptr.is_null() || len == 0 {
        return Vec::new();
    }
    let slice = std::ptr::slice_from_raw_parts_mut(ptr, len as usize);
    unsafe { Box::from_raw(slice) }.into_vec()
}

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// HTTP method as a C enum. The catalog service is read-only.
#[repr(C)]
pub enum FfiHttpMethod {
    Get = 0,
}

impl From<HttpMethod> for FfiHttpMethod {
    fn from(m: HttpMethod) -> Self {
        match m {
            HttpMethod::Get => FfiHttpMethod::Get,
        }
    }
}

/// A single HTTP header as a key-value pair of C strings.
#[repr(C)]
pub struct FfiHeader {
    pub key: *mut c_char,
    pub value: *mut c_char,
}

/// An HTTP request described as C-compatible plain data.
///
/// Built by `movie_build_*` functions. The C caller executes the request
/// and passes the response back through `movie_parse_*`. `url` is absolute
/// and already carries the encoded query string.
#[repr(C)]
pub struct FfiHttpRequest {
    pub method: FfiHttpMethod,
    pub url: *mut c_char,
    pub headers: *mut FfiHeader,
    pub headers_len: u32,
}

impl FfiHttpRequest {
    /// Convert a core `HttpRequest` into a heap-allocated `FfiHttpRequest`.
    pub(crate) fn from_core(req: movie_core::HttpRequest) -> *mut Self {
        let headers: Vec<FfiHeader> = req
            .headers
            .into_iter()
            .map(|(k, v)| FfiHeader {
                key: c_string(k),
                value: c_string(v),
            })
            .collect();
        let (headers, headers_len) = into_raw_parts(headers);

        Box::into_raw(Box::new(FfiHttpRequest {
            method: req.method.into(),
            url: c_string(req.url),
            headers,
            headers_len,
        }))
    }

    /// Release a request built by `from_core`.
    ///
    /// # Safety
    /// `req` must come from `from_core` and not have been freed.
    pub(crate) unsafe fn free(req: *mut Self) {
        let req = unsafe { Box::from_raw(req) };
        free_c_string(req.url);
        for h in unsafe { from_raw_parts(req.headers, req.headers_len) } {
            free_c_string(h.key);
            free_c_string(h.value);
        }
    }
}

// ---------------------------------------------------------------------------
// Response input (caller-provided, not heap-allocated by us)
// ---------------------------------------------------------------------------

/// An HTTP response described as C-compatible plain data.
///
/// The C caller constructs this on the stack after executing an HTTP request,
/// then passes a pointer to a `movie_parse_*` function. The FFI layer reads
/// but does not free these fields.
#[repr(C)]
pub struct FfiHttpResponse {
    pub status: u16,
    pub body: *const c_char,
}

// ---------------------------------------------------------------------------
// Result types
// ---------------------------------------------------------------------------

/// Error codes returned in `FfiMovieResult`.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiErrorCode {
    Ok = 0,
    NotFound = 1,
    Http = 2,
    Auth = 3,
    Network = 4,
    Decode = 5,
    InvalidInput = 6,
    StorageRead = 7,
    StorageWrite = 8,
    Panic = 9,
    NullArg = 10,
}

/// Tag that tells `movie_free_result` what `FfiMovieResult::data` points to.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiDataTag {
    None = 0,
    Movie = 1,
    MovieList = 2,
    FavoriteList = 3,
    FavoritesUpdate = 4,
}

/// A list of C strings.
#[repr(C)]
pub struct FfiStringList {
    pub items: *mut *mut c_char,
    pub len: u32,
}

impl FfiStringList {
    fn from_core(values: Vec<String>) -> Self {
        let (items, len) = into_raw_parts(values.into_iter().map(c_string).collect());
        FfiStringList { items, len }
    }

    unsafe fn free(&self) {
        for s in unsafe { from_raw_parts(self.items, self.len) } {
            free_c_string(s);
        }
    }
}

/// A catalog title exposed to C. Nullable strings are null when absent.
#[repr(C)]
pub struct FfiMovie {
    pub id: *mut c_char,
    pub title: *mut c_char,
    pub image: *mut c_char,
    pub has_year: bool,
    pub year: u32,
    pub has_rating: bool,
    pub rating: f64,
    pub genres: FfiStringList,
    pub description: *mut c_char,
    pub countries_of_origin: FfiStringList,
    pub spoken_languages: FfiStringList,
}

impl FfiMovie {
    fn from_core(movie: Movie) -> Self {
        FfiMovie {
            id: c_string(movie.id),
            title: c_string(movie.title),
            image: c_string_opt(movie.image),
            has_year: movie.year.is_some(),
            year: movie.year.unwrap_or(0),
            has_rating: movie.rating.is_some(),
            rating: movie.rating.unwrap_or(0.0),
            genres: FfiStringList::from_core(movie.genres),
            description: c_string_opt(movie.description),
            countries_of_origin: FfiStringList::from_core(movie.countries_of_origin),
            spoken_languages: FfiStringList::from_core(movie.spoken_languages),
        }
    }

    /// Free the owned fields (but not the struct itself).
    unsafe fn free_fields(&self) {
        free_c_string(self.id);
        free_c_string(self.title);
        free_c_string(self.image);
        free_c_string(self.description);
        unsafe {
            self.genres.free();
            self.countries_of_origin.free();
            self.spoken_languages.free();
        }
    }
}

/// A list of catalog titles exposed to C.
#[repr(C)]
pub struct FfiMovieList {
    pub items: *mut FfiMovie,
    pub len: u32,
}

/// A favorited title exposed to C.
#[repr(C)]
pub struct FfiFavoriteEntry {
    pub id: *mut c_char,
    pub title: *mut c_char,
    pub image: *mut c_char,
    pub has_year: bool,
    pub year: u32,
    pub has_rating: bool,
    pub rating: f64,
}

impl FfiFavoriteEntry {
    fn from_core(entry: FavoriteEntry) -> Self {
        FfiFavoriteEntry {
            id: c_string(entry.id),
            title: c_string(entry.title),
            image: c_string_opt(entry.image),
            has_year: entry.year.is_some(),
            year: entry.year.unwrap_or(0),
            has_rating: entry.rating.is_some(),
            rating: entry.rating.unwrap_or(0.0),
        }
    }

    fn free_fields(&self) {
        free_c_string(self.id);
        free_c_string(self.title);
        free_c_string(self.image);
    }
}

/// The favorites collection in stored order.
#[repr(C)]
pub struct FfiFavoriteList {
    pub items: *mut FfiFavoriteEntry,
    pub len: u32,
}

/// Outcome of a favorites mutation.
///
/// `payload` is the new collection for the host to persist under
/// `favoriteMovies`. When `changed` is false nothing needs to be written.
#[repr(C)]
pub struct FfiFavoritesUpdate {
    pub payload: *mut c_char,
    pub added: bool,
    pub changed: bool,
}

/// Result envelope for all parse and favorites operations.
///
/// On success `error_code` is `Ok`, `error_message` is null, and `data`
/// points to the payload (tagged by `data_tag`).
/// On failure `error_code` describes the category, `error_message` is a
/// human-readable C string, and `data` is null.
#[repr(C)]
pub struct FfiMovieResult {
    pub error_code: FfiErrorCode,
    pub error_message: *mut c_char,
    pub http_status: u16,
    pub data_tag: FfiDataTag,
    pub data: *mut c_void,
}

impl FfiMovieResult {
    fn ok(data_tag: FfiDataTag, data: *mut c_void) -> *mut Self {
        Box::into_raw(Box::new(FfiMovieResult {
            error_code: FfiErrorCode::Ok,
            error_message: std::ptr::null_mut(),
            http_status: 0,
            data_tag,
            data,
        }))
    }

    fn err(error_code: FfiErrorCode, http_status: u16, msg: String) -> *mut Self {
        Box::into_raw(Box::new(FfiMovieResult {
            error_code,
            error_message: c_string(msg),
            http_status,
            data_tag: FfiDataTag::None,
            data: std::ptr::null_mut(),
        }))
    }

    /// Build a success result carrying a single `FfiMovie`.
    pub(crate) fn ok_movie(movie: Movie) -> *mut Self {
        let data = Box::into_raw(Box::new(FfiMovie::from_core(movie)));
        Self::ok(FfiDataTag::Movie, data as *mut c_void)
    }

    /// Build a success result carrying a `FfiMovieList`.
    pub(crate) fn ok_movie_list(movies: Vec<Movie>) -> *mut Self {
        let (items, len) = into_raw_parts(movies.into_iter().map(FfiMovie::from_core).collect());
        let data = Box::into_raw(Box::new(FfiMovieList { items, len }));
        Self::ok(FfiDataTag::MovieList, data as *mut c_void)
    }

    /// Build a success result carrying a `FfiFavoriteList`.
    pub(crate) fn ok_favorites(entries: Vec<FavoriteEntry>) -> *mut Self {
        let (items, len) =
            into_raw_parts(entries.into_iter().map(FfiFavoriteEntry::from_core).collect());
        let data = Box::into_raw(Box::new(FfiFavoriteList { items, len }));
        Self::ok(FfiDataTag::FavoriteList, data as *mut c_void)
    }

    /// Build a success result carrying a `FfiFavoritesUpdate`.
    pub(crate) fn ok_update(payload: String, added: bool, changed: bool) -> *mut Self {
        let data = Box::into_raw(Box::new(FfiFavoritesUpdate {
            payload: c_string(payload),
            added,
            changed,
        }));
        Self::ok(FfiDataTag::FavoritesUpdate, data as *mut c_void)
    }

    /// Build an error result from a `CatalogError`.
    pub(crate) fn from_catalog_error(err: CatalogError) -> *mut Self {
        let (code, status) = match &err {
            CatalogError::NotFound => (FfiErrorCode::NotFound, 404),
            CatalogError::Http { status, .. } => (FfiErrorCode::Http, *status),
            CatalogError::Auth { status } => (FfiErrorCode::Auth, *status),
            CatalogError::Transport(_) => (FfiErrorCode::Network, 0),
            CatalogError::Decode(_) => (FfiErrorCode::Decode, 0),
            CatalogError::InvalidFilter(_) => (FfiErrorCode::InvalidInput, 0),
        };
        Self::err(code, status, err.to_string())
    }

    /// Build an error result from a `StoreError`.
    pub(crate) fn from_store_error(err: StoreError) -> *mut Self {
        let code = if err.is_read_error() {
            FfiErrorCode::StorageRead
        } else {
            FfiErrorCode::StorageWrite
        };
        Self::err(code, 0, err.to_string())
    }

    /// Build an error result for an argument that is not valid input.
    pub(crate) fn invalid_input(msg: String) -> *mut Self {
        Self::err(FfiErrorCode::InvalidInput, 0, msg)
    }

    /// Build an error result for a null argument.
    pub(crate) fn null_arg(name: &str) -> *mut Self {
        Self::err(FfiErrorCode::NullArg, 0, format!("null argument: {name}"))
    }

    /// Build an error result for a caught panic.
    pub(crate) fn panic(msg: &str) -> *mut Self {
        Self::err(FfiErrorCode::Panic, 0, msg.to_string())
    }

    /// Release a result and whatever its `data` points to.
    ///
    /// # Safety
    /// `result` must come from one of the constructors above and not have
    /// been freed.
    pub(crate) unsafe fn free(result: *mut Self) {
        let result = unsafe { Box::from_raw(result) };
        free_c_string(result.error_message);
        if result.data.is_null() {
            return;
        }
        match result.data_tag {
            FfiDataTag::Movie => {
                let movie = unsafe { Box::from_raw(result.data as *mut FfiMovie) };
                unsafe { movie.free_fields() };
            }
            FfiDataTag::MovieList => {
                let list = unsafe { Box::from_raw(result.data as *mut FfiMovieList) };
                for movie in unsafe { from_raw_parts(list.items, list.len) } {
                    unsafe { movie.free_fields() };
                }
            }
            FfiDataTag::FavoriteList => {
                let list = unsafe { Box::from_raw(result.data as *mut FfiFavoriteList) };
                for entry in unsafe { from_raw_parts(list.items, list.len) } {
                    entry.free_fields();
                }
            }
            FfiDataTag::FavoritesUpdate => {
                let update = unsafe { Box::from_raw(result.data as *mut FfiFavoritesUpdate) };
                free_c_string(update.payload);
            }
            FfiDataTag::None => {}
        }
    }
}
