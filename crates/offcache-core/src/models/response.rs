//! Response snapshots and persisted cache entries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::request::CacheKey;

use crate::error::FetchError;

/// HTTP status served when the network is unreachable
const OFFLINE_STATUS: u16 = 503;

/// Whether a response's status and content can be inspected.
///
/// Opaque responses (e.g. cross-origin without permission) are passed
/// through to the caller but never cached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseKind {
    Basic,
    Opaque,
}

/// Where a response served by the proxy came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseSource {
    /// Served from the current cache generation
    Cache,
    /// Fetched from the network for this request
    Network,
    /// Synthesized locally after a transport failure
    Synthetic,
}

/// A response snapshot: status, headers, and fully buffered body.
#[derive(Debug, Clone)]
pub struct ProxyResponse {
    status: u16,
    headers: Vec<(String, String)>,
    body: Vec<u8>,
    kind: ResponseKind,
    source: ResponseSource,
}

impl ProxyResponse {
    /// A response received from the network capability.
    pub fn network(status: u16, headers: Vec<(String, String)>, body: Vec<u8>) -> Self {
        Self {
            status,
            headers,
            body,
            kind: ResponseKind::Basic,
            source: ResponseSource::Network,
        }
    }

    /// An opaque network response. Returned as-is, never cached.
    pub fn opaque(body: Vec<u8>) -> Self {
        Self {
            status: 0,
            headers: Vec::new(),
            body,
            kind: ResponseKind::Opaque,
            source: ResponseSource::Network,
        }
    }

    /// The synthetic 503 served when a network fetch fails at the
    /// transport level. The caller always receives a well-formed response.
    pub fn offline(message: &str, error: &FetchError) -> Self {
        Self {
            status: OFFLINE_STATUS,
            headers: vec![
                ("content-type".to_string(), "text/plain".to_string()),
                ("x-offline-reason".to_string(), error.to_string()),
            ],
            body: message.as_bytes().to_vec(),
            kind: ResponseKind::Basic,
            source: ResponseSource::Synthetic,
        }
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    /// Look up a header value, case-insensitively on the name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    pub fn kind(&self) -> ResponseKind {
        self.kind
    }

    pub fn source(&self) -> ResponseSource {
        self.source
    }

    /// An entry is only stored if the originating response had a successful
    /// status and was not opaque. HTTP errors (404, 500, ...) pass through
    /// to the caller but are never cached.
    pub fn is_cacheable(&self) -> bool {
        self.status == 200 && self.kind == ResponseKind::Basic
    }
}

/// A stored request→response pair, as persisted in a cache generation.
///
/// `cached_at` is recorded for observability (entry age in hit logs); the
/// proxy never consults it for eviction - entries live until their
/// generation is swept.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CachedEntry {
    pub key: CacheKey,
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
    pub cached_at: DateTime<Utc>,
}

impl CachedEntry {
    /// Snapshot a response for storage. This is the "duplicate before dual
    /// use" point: the caller keeps the original response while this copy
    /// goes to the cache.
    pub fn from_response(key: CacheKey, response: &ProxyResponse) -> Self {
        Self {
            key,
            status: response.status(),
            headers: response.headers().to_vec(),
            body: response.body().to_vec(),
            cached_at: Utc::now(),
        }
    }

    /// Rehydrate the stored snapshot as a servable response.
    pub fn into_response(self) -> ProxyResponse {
        ProxyResponse {
            status: self.status,
            headers: self.headers,
            body: self.body,
            kind: ResponseKind::Basic,
            source: ResponseSource::Cache,
        }
    }

    pub fn age_minutes(&self) -> i64 {
        (Utc::now() - self.cached_at).num_minutes()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::Method;

    fn key() -> CacheKey {
        CacheKey::for_request(&Method::GET, "https://example.com/app.js")
    }

    #[test]
    fn test_offline_response_shape() {
        let error = FetchError::Connection("dns failure".to_string());
        let response = ProxyResponse::offline("Offline - please check your connection", &error);
        assert_eq!(response.status(), 503);
        assert_eq!(response.header("Content-Type"), Some("text/plain"));
        assert_eq!(response.source(), ResponseSource::Synthetic);
        assert!(!response.is_cacheable());
        assert_eq!(
            response.body(),
            b"Offline - please check your connection".as_slice()
        );
    }

    #[test]
    fn test_cacheability() {
        let ok = ProxyResponse::network(200, vec![], b"hi".to_vec());
        assert!(ok.is_cacheable());

        let not_found = ProxyResponse::network(404, vec![], vec![]);
        assert!(!not_found.is_cacheable());

        let server_error = ProxyResponse::network(500, vec![], vec![]);
        assert!(!server_error.is_cacheable());

        let opaque = ProxyResponse::opaque(b"???".to_vec());
        assert!(!opaque.is_cacheable());
    }

    #[test]
    fn test_entry_round_trips_response() {
        let original = ProxyResponse::network(
            200,
            vec![("content-type".to_string(), "text/html".to_string())],
            b"<html></html>".to_vec(),
        );
        let entry = CachedEntry::from_response(key(), &original);
        let served = entry.into_response();
        assert_eq!(served.status(), 200);
        assert_eq!(served.body(), original.body());
        assert_eq!(served.source(), ResponseSource::Cache);
    }

    #[test]
    fn test_entry_age_starts_at_zero() {
        let entry = CachedEntry::from_response(key(), &ProxyResponse::network(200, vec![], vec![]));
        assert!(entry.age_minutes() <= 1);
    }
}
