//! Error types for the cache proxy.
//!
//! Three layers: [`CacheError`] for the store capability, [`FetchError`] for
//! the network capability, and [`ProxyError`] for lifecycle operations.
//! Per-request failures never surface as errors - `intercept` recovers them
//! into a synthetic response or a warn log.

use thiserror::Error;

use crate::models::CacheKey;

/// Failures from a cache store backend.
#[derive(Error, Debug)]
pub enum CacheError {
    #[error("cache store unavailable: {0}")]
    Open(String),

    #[error("cache I/O failure at {path}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("corrupt cache entry at {path}")]
    Corrupt {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Transport-level fetch failures (DNS, connection, stream errors).
///
/// An HTTP error status is not a `FetchError` - the response is passed
/// through to the caller as-is.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("network transport failure: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("connection failed: {0}")]
    Connection(String),
}

/// Failures from the lifecycle operations (`initialize`, `activate`).
///
/// These are fatal to the lifecycle step: a failed install must not be
/// promoted to ready, and a failed sweep leaves the proxy in
/// [`Lifecycle::Failed`](crate::Lifecycle::Failed).
#[derive(Error, Debug)]
pub enum ProxyError {
    #[error("failed to open cache generation")]
    CacheOpen(#[source] CacheError),

    #[error("failed to precache {url}")]
    SeedFetch {
        url: String,
        #[source]
        source: FetchError,
    },

    #[error("precache URL {url} returned non-cacheable status {status}")]
    SeedRejected { url: String, status: u16 },

    #[error("failed to store precached entry {key}")]
    SeedStore {
        key: CacheKey,
        #[source]
        source: CacheError,
    },

    #[error("failed to sweep generation {generation}")]
    Sweep {
        generation: String,
        #[source]
        source: CacheError,
    },
}
