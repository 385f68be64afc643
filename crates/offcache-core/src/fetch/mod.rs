//! Network fetch capability.
//!
//! The proxy forwards cache misses through a [`NetworkFetch`]
//! implementation. [`HttpFetcher`] is the reqwest-backed default; hosts
//! embedding the proxy in another transport implement the trait themselves.

pub mod http;

use async_trait::async_trait;

use crate::error::FetchError;
use crate::models::{ProxyRequest, ProxyResponse};

pub use http::HttpFetcher;

/// Forward a request to the network.
///
/// Returns `Err` only for transport failures (DNS, connection, stream
/// errors). An HTTP error status is a successful fetch and comes back as a
/// normal response.
#[async_trait]
pub trait NetworkFetch: Send + Sync {
    async fn fetch(&self, request: &ProxyRequest) -> Result<ProxyResponse, FetchError>;
}
