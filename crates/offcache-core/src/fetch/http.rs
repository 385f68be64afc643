//! reqwest-backed network fetcher.

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use crate::error::FetchError;
use crate::models::{ProxyRequest, ProxyResponse};

use super::NetworkFetch;

/// Network fetcher over a shared HTTP client.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
///
/// No request timeout is configured: the proxy enforces none and relies on
/// the transport's own failure signaling.
#[derive(Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new() -> Result<Self, FetchError> {
        let client = Client::builder().build()?;
        Ok(Self { client })
    }

    /// Wrap an existing client, sharing its connection pool.
    pub fn from_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl NetworkFetch for HttpFetcher {
    async fn fetch(&self, request: &ProxyRequest) -> Result<ProxyResponse, FetchError> {
        let mut builder = self
            .client
            .request(request.method().clone(), request.url());
        for (name, value) in request.headers() {
            builder = builder.header(name, value);
        }
        if let Some(body) = request.body() {
            builder = builder.body(body.to_vec());
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .map(|(name, value)| {
                (
                    name.to_string(),
                    String::from_utf8_lossy(value.as_bytes()).into_owned(),
                )
            })
            .collect();
        let body = response.bytes().await?.to_vec();

        debug!(url = request.url(), status = status, bytes = body.len(), "network fetch complete");
        Ok(ProxyResponse::network(status, headers, body))
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unroutable_url_is_transport_error() {
        let fetcher = HttpFetcher::new().unwrap();
        let request = ProxyRequest::get("http://nonexistent.invalid/resource");
        let result = fetcher.fetch(&request).await;
        assert!(matches!(result, Err(FetchError::Transport(_))));
    }

    #[tokio::test]
    async fn test_relative_url_is_transport_error() {
        let fetcher = HttpFetcher::new().unwrap();
        let request = ProxyRequest::get("index.html");
        let result = fetcher.fetch(&request).await;
        assert!(result.is_err());
    }
}
