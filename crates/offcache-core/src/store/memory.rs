//! In-memory cache store.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::CacheError;
use crate::models::{CacheKey, CachedEntry};

use super::CacheStore;

/// A cache store held entirely in memory.
///
/// Suitable for tests and for hosts whose cache does not need to outlive
/// the process. Operations never fail.
#[derive(Default)]
pub struct MemoryStore {
    generations: RwLock<HashMap<String, HashMap<CacheKey, CachedEntry>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entries in a generation, for observability.
    pub async fn len(&self, generation: &str) -> usize {
        self.generations
            .read()
            .await
            .get(generation)
            .map_or(0, HashMap::len)
    }

    pub async fn is_empty(&self, generation: &str) -> bool {
        self.len(generation).await == 0
    }
}

#[async_trait]
impl CacheStore for MemoryStore {
    async fn open(&self, generation: &str) -> Result<(), CacheError> {
        self.generations
            .write()
            .await
            .entry(generation.to_string())
            .or_default();
        Ok(())
    }

    async fn get(
        &self,
        generation: &str,
        key: &CacheKey,
    ) -> Result<Option<CachedEntry>, CacheError> {
        Ok(self
            .generations
            .read()
            .await
            .get(generation)
            .and_then(|entries| entries.get(key))
            .cloned())
    }

    async fn put(&self, generation: &str, entry: CachedEntry) -> Result<(), CacheError> {
        self.generations
            .write()
            .await
            .entry(generation.to_string())
            .or_default()
            .insert(entry.key.clone(), entry);
        Ok(())
    }

    async fn delete(&self, generation: &str, key: &CacheKey) -> Result<bool, CacheError> {
        Ok(self
            .generations
            .write()
            .await
            .get_mut(generation)
            .and_then(|entries| entries.remove(key))
            .is_some())
    }

    async fn delete_generation(&self, generation: &str) -> Result<bool, CacheError> {
        Ok(self.generations.write().await.remove(generation).is_some())
    }

    async fn list_generations(&self) -> Result<Vec<String>, CacheError> {
        let mut names: Vec<String> = self.generations.read().await.keys().cloned().collect();
        names.sort();
        Ok(names)
    }
}

// ============================================================================
// Tests
// ============================================================================
