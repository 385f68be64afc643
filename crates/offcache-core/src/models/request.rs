//! Intercepted requests and their cache identity.

use std::fmt;

use reqwest::Method;
use serde::{Deserialize, Serialize};
use url::Url;

/// A resource request intercepted from the hosting page context.
///
/// The proxy reads requests immutably; the network fetcher builds its own
/// outbound request from these fields, so the caller-visible request is
/// never consumed or mutated.
#[derive(Debug, Clone)]
pub struct ProxyRequest {
    method: Method,
    url: String,
    headers: Vec<(String, String)>,
    body: Option<Vec<u8>>,
}

impl ProxyRequest {
    /// A GET request for the given URL. Most intercepted traffic and all
    /// precache seeding goes through here.
    pub fn get(url: impl Into<String>) -> Self {
        Self::new(Method::GET, url)
    }

    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn with_body(mut self, body: Vec<u8>) -> Self {
        self.body = Some(body);
        self
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    pub fn body(&self) -> Option<&[u8]> {
        self.body.as_deref()
    }

    /// The normalized identity this request is cached under.
    pub fn cache_key(&self) -> CacheKey {
        CacheKey::for_request(&self.method, &self.url)
    }
}

/// Normalized request identity: method plus canonicalized URL.
///
/// Lookup is exact-match only - no partial-URL, query-stripping, or
/// wildcard matching. The query string is part of the identity verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CacheKey(String);

impl CacheKey {
    /// Build a key from a method and a raw URL.
    ///
    /// Canonicalization lowercases the host, drops an explicit default port,
    /// and strips the fragment. URLs the `url` crate cannot parse (e.g.
    /// relative paths) are kept as-is, trimmed, so key derivation never
    /// fails.
    pub fn for_request(method: &Method, raw_url: &str) -> Self {
        let normalized = match Url::parse(raw_url) {
            Ok(mut url) => {
                url.set_fragment(None);
                url.to_string()
            }
            Err(_) => raw_url.trim().to_string(),
        };
        CacheKey(format!("{} {}", method, normalized))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ============================================================================
// Tests
// ============================================================================
