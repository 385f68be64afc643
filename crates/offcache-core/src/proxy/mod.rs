//! The cache proxy: request interception and generation lifecycle.
//!
//! Per intercepted request the flow is cache-first:
//!
//! ```text
//! RECEIVED -> CHECK_CACHE
//! CHECK_CACHE --hit--> respond from cache
//! CHECK_CACHE --miss--> FETCH_NETWORK
//! FETCH_NETWORK --200, not opaque--> store a copy, respond from network
//! FETCH_NETWORK --other status or opaque--> respond from network, uncached
//! FETCH_NETWORK --transport failure--> respond with a synthetic 503
//! ```
//!
//! A cached entry always wins over the network; freshness is traded for
//! offline availability and latency, and entries live until their
//! generation is swept by [`CacheProxy::activate`].

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use futures::future::try_join_all;
use reqwest::Method;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::config::ProxyConfig;
use crate::error::ProxyError;
use crate::fetch::NetworkFetch;
use crate::models::{CachedEntry, ControlMessage, ProxyRequest, ProxyResponse};
use crate::store::CacheStore;

/// Lifecycle of a proxy instance, for observability.
///
/// The hosting runtime is expected to hold the instance open until
/// `initialize` and `activate` complete; the proxy records state but does
/// not gate `intercept` on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    New,
    Installing,
    Installed,
    Activating,
    Active,
    Failed,
}

/// Phase of a single request moving through `intercept`, used in logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RequestPhase {
    CheckingCache,
    CacheHit,
    NetworkFetch,
    NetworkSuccess,
    NetworkFailure,
}

impl fmt::Display for RequestPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RequestPhase::CheckingCache => "checking-cache",
            RequestPhase::CacheHit => "cache-hit",
            RequestPhase::NetworkFetch => "network-fetch",
            RequestPhase::NetworkSuccess => "network-success",
            RequestPhase::NetworkFailure => "network-failure",
        };
        f.write_str(name)
    }
}

/// Offline cache proxy over a network capability `F` and a store `S`.
///
/// One instance per deployed version; the current generation name and the
/// precache seed list are fixed at construction via [`ProxyConfig`].
pub struct CacheProxy<F, S> {
    config: ProxyConfig,
    fetcher: F,
    store: Arc<S>,
    lifecycle: RwLock<Lifecycle>,
    skip_waiting: AtomicBool,
}

impl<F, S> CacheProxy<F, S>
where
    F: NetworkFetch,
    S: CacheStore + 'static,
{
    pub fn new(config: ProxyConfig, fetcher: F, store: S) -> Self {
        Self {
            config,
            fetcher,
            store: Arc::new(store),
            lifecycle: RwLock::new(Lifecycle::New),
            skip_waiting: AtomicBool::new(false),
        }
    }

    pub fn config(&self) -> &ProxyConfig {
        &self.config
    }

    /// The underlying store, mainly for host observability.
    pub fn store(&self) -> &S {
        &self.store
    }

    pub async fn lifecycle(&self) -> Lifecycle {
        *self.lifecycle.read().await
    }

    async fn set_lifecycle(&self, state: Lifecycle) {
        *self.lifecycle.write().await = state;
    }

    /// Serve an intercepted request. Never fails: transport failures become
    /// a synthetic 503 with a plain-text body.
    ///
    /// Only GET requests participate in caching; anything else is forwarded
    /// straight to the network and never stored. A successful, cacheable
    /// network response is copied into the current generation by a spawned
    /// task so the write cannot delay the response.
    pub async fn intercept(&self, request: ProxyRequest) -> ProxyResponse {
        let key = request.cache_key();
        let is_get = *request.method() == Method::GET;

        if is_get {
            debug!(key = %key, phase = %RequestPhase::CheckingCache, "intercepted request");
            match self.store.get(self.config.generation(), &key).await {
                Ok(Some(entry)) => {
                    debug!(
                        key = %key,
                        phase = %RequestPhase::CacheHit,
                        age_minutes = entry.age_minutes(),
                        "serving from cache"
                    );
                    return entry.into_response();
                }
                Ok(None) => {}
                Err(error) => {
                    warn!(key = %key, error = %error, "cache lookup failed, treating as miss");
                }
            }
        }

        debug!(key = %key, phase = %RequestPhase::NetworkFetch, "forwarding to network");
        match self.fetcher.fetch(&request).await {
            Ok(response) => {
                debug!(
                    key = %key,
                    phase = %RequestPhase::NetworkSuccess,
                    status = response.status(),
                    "network response"
                );
                if is_get && response.is_cacheable() {
                    self.store_copy(CachedEntry::from_response(key, &response));
                }
                response
            }
            Err(error) => {
                warn!(
                    key = %key,
                    phase = %RequestPhase::NetworkFailure,
                    error = %error,
                    "network fetch failed, synthesizing offline response"
                );
                ProxyResponse::offline(self.config.offline_message(), &error)
            }
        }
    }

    /// Write a duplicated response snapshot to the current generation in
    /// the background. Failures are logged and otherwise ignored - the
    /// response path is already committed.
    fn store_copy(&self, entry: CachedEntry) {
        let store = Arc::clone(&self.store);
        let generation = self.config.generation().to_string();
        tokio::spawn(async move {
            let key = entry.key.clone();
            if let Err(error) = store.put(&generation, entry).await {
                warn!(generation = %generation, key = %key, error = %error, "cache write failed");
            }
        });
    }

    /// Install-time precaching: open the configured generation and fetch
    /// and store every seed URL.
    ///
    /// All-or-nothing: every seed is fetched (and must be cacheable) before
    /// anything is stored, and a store failure rolls back the keys written
    /// in this attempt. Entries from a prior generation - or a prior
    /// successful install of this one - are left untouched.
    ///
    /// The host must let this complete before tearing the instance down.
    pub async fn initialize(&self) -> Result<(), ProxyError> {
        self.set_lifecycle(Lifecycle::Installing).await;
        info!(
            generation = self.config.generation(),
            seeds = self.config.seed_urls().len(),
            "installing"
        );

        match self.install().await {
            Ok(()) => {
                self.set_lifecycle(Lifecycle::Installed).await;
                info!(generation = self.config.generation(), "install complete");
                Ok(())
            }
            Err(error) => {
                self.set_lifecycle(Lifecycle::Failed).await;
                Err(error)
            }
        }
    }

    async fn install(&self) -> Result<(), ProxyError> {
        let generation = self.config.generation();
        self.store
            .open(generation)
            .await
            .map_err(ProxyError::CacheOpen)?;

        // Fetch everything before storing anything
        let seeds =
            try_join_all(self.config.seed_urls().iter().map(|url| self.fetch_seed(url))).await?;

        let mut written = Vec::new();
        for entry in seeds {
            let key = entry.key.clone();
            if let Err(source) = self.store.put(generation, entry).await {
                for rollback_key in &written {
                    let _ = self.store.delete(generation, rollback_key).await;
                }
                return Err(ProxyError::SeedStore { key, source });
            }
            written.push(key);
        }
        Ok(())
    }

    async fn fetch_seed(&self, url: &str) -> Result<CachedEntry, ProxyError> {
        let request = ProxyRequest::get(url);
        let response = self
            .fetcher
            .fetch(&request)
            .await
            .map_err(|source| ProxyError::SeedFetch {
                url: url.to_string(),
                source,
            })?;
        if !response.is_cacheable() {
            return Err(ProxyError::SeedRejected {
                url: url.to_string(),
                status: response.status(),
            });
        }
        debug!(url = url, bytes = response.body().len(), "precached seed");
        Ok(CachedEntry::from_response(request.cache_key(), &response))
    }

    /// Activation sweep: delete every generation whose name differs from
    /// the configured one and return the deleted names. Idempotent - a
    /// second call finds nothing left to delete.
    ///
    /// The host must let this complete before routing fetches here.
    pub async fn activate(&self) -> Result<Vec<String>, ProxyError> {
        self.set_lifecycle(Lifecycle::Activating).await;

        let result = self.sweep().await;
        match &result {
            Ok(deleted) => {
                self.set_lifecycle(Lifecycle::Active).await;
                info!(
                    generation = self.config.generation(),
                    evicted = deleted.len(),
                    "activation complete"
                );
            }
            Err(_) => self.set_lifecycle(Lifecycle::Failed).await,
        }
        result
    }

    async fn sweep(&self) -> Result<Vec<String>, ProxyError> {
        let current = self.config.generation();
        let generations =
            self.store
                .list_generations()
                .await
                .map_err(|source| ProxyError::Sweep {
                    generation: current.to_string(),
                    source,
                })?;

        let mut deleted = Vec::new();
        for name in generations {
            if name == current {
                continue;
            }
            match self.store.delete_generation(&name).await {
                Ok(_) => {
                    info!(generation = %name, "evicted stale generation");
                    deleted.push(name);
                }
                Err(source) => {
                    return Err(ProxyError::Sweep {
                        generation: name,
                        source,
                    })
                }
            }
        }
        Ok(deleted)
    }

    /// Begin governing requests immediately instead of waiting for existing
    /// clients to close. Trades a brief window of mixed old/new behavior
    /// for faster rollout; the host queries
    /// [`takes_control_immediately`](Self::takes_control_immediately) when
    /// sequencing the handover.
    pub fn take_control_immediately(&self) {
        self.skip_waiting.store(true, Ordering::SeqCst);
        info!(generation = self.config.generation(), "taking control immediately");
    }

    pub fn takes_control_immediately(&self) -> bool {
        self.skip_waiting.load(Ordering::SeqCst)
    }

    /// Dispatch a control-plane message from the hosting page.
    pub fn handle_message(&self, message: ControlMessage) {
        match message {
            ControlMessage::SkipWaiting => self.take_control_immediately(),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
