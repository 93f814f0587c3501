//! reqwest-backed `Transport`.

use std::time::Duration;

use async_trait::async_trait;

use crate::config::CatalogConfig;
use crate::error::CatalogError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse, Transport};

/// Executes requests with a shared `reqwest::Client`.
///
/// Every status comes back as data; connect errors, timeouts and body read
/// failures become `CatalogError::Transport`.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self, CatalogError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| CatalogError::Transport(e.to_string()))?;
        Ok(Self::new(client))
    }

    pub fn from_config(config: &CatalogConfig) -> Result<Self, CatalogError> {
        Self::with_timeout(config.timeout())
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, CatalogError> {
        let mut builder = match request.method {
            HttpMethod::Get => self.client.get(&request.url),
        };
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        let response = builder.send().await.map_err(|e| {
            tracing::warn!(url = %request.url, error = %e, "catalog request failed");
            CatalogError::Transport(e.to_string())
        })?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(k, v)| Some((k.as_str().to_string(), v.to_str().ok()?.to_string())))
            .collect();
        let body = response
            .text()
            .await
            .map_err(|e| CatalogError::Transport(e.to_string()))?;

        tracing::trace!(url = %request.url, status, bytes = body.len(), "catalog response");
        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}
