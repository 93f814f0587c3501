//! Async catalog facade: build, execute through a `Transport`, parse.

use crate::client::CatalogClient;
use crate::error::CatalogError;
use crate::filters::SearchFilters;
use crate::http::Transport;
use crate::types::Movie;

/// The operations screens call to obtain `Movie` records.
///
/// Nothing is cached: every call goes to the service, and a caller that no
/// longer wants a result simply drops it.
pub struct RemoteCatalog<T> {
    client: CatalogClient,
    transport: T,
}

impl<T: Transport> RemoteCatalog<T> {
    pub fn new(client: CatalogClient, transport: T) -> Self {
        Self { client, transport }
    }

    pub fn client(&self) -> &CatalogClient {
        &self.client
    }

    /// Top-ranked titles, truncated to `n` when given.
    pub async fn fetch_top(&self, n: Option<usize>) -> Result<Vec<Movie>, CatalogError> {
        let request = self.client.build_top();
        let response = self.transport.execute(request).await?;
        let movies = self
            .client
            .parse_top(response, n)
            .inspect_err(|e| tracing::warn!(error = %e, "top listing failed"))?;
        tracing::debug!(count = movies.len(), "fetched top listing");
        Ok(movies)
    }

    pub async fn fetch_detail(&self, id: &str) -> Result<Movie, CatalogError> {
        let request = self.client.build_detail(id);
        let response = self.transport.execute(request).await?;
        let movie = self
            .client
            .parse_detail(response)
            .inspect_err(|e| tracing::warn!(id, error = %e, "detail fetch failed"))?;
        tracing::debug!(id = %movie.id, "fetched detail");
        Ok(movie)
    }

    /// Free-text search. Invalid filters fail before any request is sent.
    pub async fn search(
        &self,
        query: &str,
        filters: &SearchFilters,
    ) -> Result<Vec<Movie>, CatalogError> {
        let request = self.client.build_search(query, filters)?;
        let response = self.transport.execute(request).await?;
        let movies = self
            .client
            .parse_search(response)
            .inspect_err(|e| tracing::warn!(query, error = %e, "search failed"))?;
        tracing::debug!(query, count = movies.len(), "search complete");
        Ok(movies)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::http::{HttpRequest, HttpResponse};

    /// Replays one canned response and records the requests it saw.
    struct CannedTransport {
        status: u16,
        body: String,
        seen: Mutex<Vec<HttpRequest>>,
    }

    impl CannedTransport {
        fn new(status: u16, body: &str) -> Self {
            Self {
                status,
                body: body.to_string(),
                seen: Mutex::new(Vec::new()),
            }
        }

        fn requests(&self) -> Vec<HttpRequest> {
            self.seen.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Transport for CannedTransport {
        async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, CatalogError> {
            self.seen.lock().unwrap().push(request);
            Ok(HttpResponse {
                status: self.status,
                headers: Vec::new(),
                body: self.body.clone(),
            })
        }
    }

    struct DownTransport;

    #[async_trait]
    impl Transport for DownTransport {
        async fn execute(&self, _request: HttpRequest) -> Result<HttpResponse, CatalogError> {
            Err(CatalogError::Transport("connection refused".to_string()))
        }
    }

    fn catalog<T: Transport>(transport: T) -> RemoteCatalog<T> {
        RemoteCatalog::new(
            CatalogClient::new("https://catalog.test/imdb", "key", "catalog.test"),
            transport,
        )
    }

    #[tokio::test]
    async fn fetch_detail_normalizes_the_record() {
        let remote = catalog(CannedTransport::new(
            200,
            r#"{"id":"tt1375666","primaryTitle":"Inception","primaryImage":"https://img.example/i.jpg","startYear":2010,"averageRating":8.8}"#,
        ));
        let movie = remote.fetch_detail("tt1375666").await.unwrap();
        assert_eq!(movie.id, "tt1375666");
        assert_eq!(movie.title, "Inception");
        assert_eq!(movie.image.as_deref(), Some("https://img.example/i.jpg"));
        assert_eq!(movie.year, Some(2010));
        assert_eq!(movie.rating, Some(8.8));

        let requests = remote.transport.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].url, "https://catalog.test/imdb/tt1375666");
    }

    #[tokio::test]
    async fn search_returns_each_match() {
        let remote = catalog(CannedTransport::new(
            200,
            r#"{"results":[{"id":"tt1375666","primaryTitle":"Inception"},{"id":"tt5295990","primaryTitle":"Inception: The Cobol Job"}]}"#,
        ));
        let filters = SearchFilters::from_json(
            r#"{"genre":"Drama","rows":25,"sortField":"id","sortOrder":"asc"}"#,
        )
        .unwrap();
        let movies = remote.search("inception", &filters).await.unwrap();
        assert_eq!(movies.len(), 2);
        assert!(movies.iter().all(|m| !m.id.is_empty() && !m.title.is_empty()));
    }

    #[tokio::test]
    async fn invalid_filters_send_nothing() {
        let remote = catalog(CannedTransport::new(200, "{}"));
        let filters = SearchFilters {
            rows: Some(0),
            ..SearchFilters::default()
        };
        assert!(remote.search("x", &filters).await.is_err());
        assert!(remote.transport.requests().is_empty());
    }

    #[tokio::test]
    async fn transport_failure_is_unavailable() {
        let remote = catalog(DownTransport);
        let err = remote.fetch_top(Some(10)).await.unwrap_err();
        assert!(matches!(err, CatalogError::Transport(_)));
        assert!(err.is_unavailable());
    }

    #[tokio::test]
    async fn rejected_key_is_auth_error() {
        let remote = catalog(CannedTransport::new(403, r#"{"message":"You are not subscribed"}"#));
        let err = remote.fetch_top(None).await.unwrap_err();
        assert!(matches!(err, CatalogError::Auth { status: 403 }));
    }
}
