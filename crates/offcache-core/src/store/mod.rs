//! Cache store capability and backends.
//!
//! A store holds named generations, each mapping normalized request
//! identities to stored response snapshots. Two backends are provided:
//! [`MemoryStore`] for tests and short-lived hosts, [`DiskStore`] for
//! persistence across restarts.
//!
//! Concurrency: puts to distinct keys are independent; puts to the same key
//! are last-write-wins with no ordering guarantee.

pub mod disk;
pub mod memory;

use async_trait::async_trait;

use crate::error::CacheError;
use crate::models::{CacheKey, CachedEntry};

pub use disk::DiskStore;
pub use memory::MemoryStore;

/// Keyed cache store: get/put/delete/list by generation name and request
/// identity.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Open the named generation, creating it if absent.
    async fn open(&self, generation: &str) -> Result<(), CacheError>;

    /// Look up an entry by exact key match.
    async fn get(&self, generation: &str, key: &CacheKey) -> Result<Option<CachedEntry>, CacheError>;

    /// Store an entry, overwriting any existing entry for the same key.
    async fn put(&self, generation: &str, entry: CachedEntry) -> Result<(), CacheError>;

    /// Remove a single entry. Returns whether it existed.
    async fn delete(&self, generation: &str, key: &CacheKey) -> Result<bool, CacheError>;

    /// Remove a whole generation and everything in it. Returns whether it
    /// existed.
    async fn delete_generation(&self, generation: &str) -> Result<bool, CacheError>;

    /// Names of all generations currently present, sorted.
    async fn list_generations(&self) -> Result<Vec<String>, CacheError>;
}
