//! Proxy configuration.
//!
//! Configuration is passed in at construction time - one proxy instance per
//! deployed version. The generation name doubles as the cache namespace, so
//! shipping a new version means constructing a proxy with a new name and
//! letting activation sweep the old generation away.

use serde::{Deserialize, Serialize};

/// Body text for the synthetic response served when the network is down
const DEFAULT_OFFLINE_MESSAGE: &str = "Offline - please check your connection";

/// Construction-time configuration for a [`CacheProxy`](crate::CacheProxy).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProxyConfig {
    generation: String,
    seed_urls: Vec<String>,
    offline_message: String,
}

impl ProxyConfig {
    /// Create a configuration for the given generation name.
    ///
    /// Generation names are free-form version strings, conventionally
    /// `"<product>-v<N>"`.
    pub fn new(generation: impl Into<String>) -> Self {
        Self {
            generation: generation.into(),
            seed_urls: Vec::new(),
            offline_message: DEFAULT_OFFLINE_MESSAGE.to_string(),
        }
    }

    /// URLs fetched and stored eagerly during `initialize`.
    pub fn with_seed_urls<I, S>(mut self, urls: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.seed_urls = urls.into_iter().map(Into::into).collect();
        self
    }

    /// Override the plain-text body of the synthetic offline response.
    pub fn with_offline_message(mut self, message: impl Into<String>) -> Self {
        self.offline_message = message.into();
        self
    }

    pub fn generation(&self) -> &str {
        &self.generation
    }

    pub fn seed_urls(&self) -> &[String] {
        &self.seed_urls
    }

    pub fn offline_message(&self) -> &str {
        &self.offline_message
    }
}

// ============================================================================
// Tests
// ============================================================================
