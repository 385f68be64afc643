//! offcache-core - an offline-first cache proxy.
//!
//! This library sits between a hosting runtime and the network: intercepted
//! resource requests are served from a named cache generation when possible,
//! otherwise forwarded to the network and opportunistically cached. It also
//! manages the generation lifecycle - precache seeding at install time and
//! eviction of superseded generations at activation.
//!
//! The hosting runtime drives the proxy directly: construct a [`CacheProxy`]
//! with a [`ProxyConfig`], call [`CacheProxy::initialize`] and
//! [`CacheProxy::activate`] during rollout, and route requests through
//! [`CacheProxy::intercept`]. Network access and storage are capability
//! traits ([`NetworkFetch`], [`CacheStore`]) so hosts can swap backends.

pub mod config;
pub mod error;
pub mod fetch;
pub mod models;
pub mod proxy;
pub mod store;

pub use config::ProxyConfig;
pub use error::{CacheError, FetchError, ProxyError};
pub use fetch::{HttpFetcher, NetworkFetch};
pub use models::{
    CacheKey, CachedEntry, ControlMessage, ProxyRequest, ProxyResponse, ResponseKind,
    ResponseSource,
};
pub use proxy::{CacheProxy, Lifecycle};
pub use store::{CacheStore, DiskStore, MemoryStore};
