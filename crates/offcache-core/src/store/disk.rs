//! Disk-backed cache store.
//!
//! Layout: one directory per generation under a root directory, one JSON
//! file per entry. Entry files are named by the sha256 hex digest of the
//! normalized request identity, so arbitrary URLs never leak into paths.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::error::CacheError;
use crate::models::{CacheKey, CachedEntry};

use super::CacheStore;

/// A cache store persisted as JSON snapshots on disk.
pub struct DiskStore {
    root: PathBuf,
}

impl DiskStore {
    /// Open a store rooted at the given directory, creating it if needed.
    pub fn new(root: PathBuf) -> Result<Self, CacheError> {
        std::fs::create_dir_all(&root).map_err(|source| io_error(&root, source))?;
        Ok(Self { root })
    }

    /// Open a store under the platform cache directory
    /// (e.g. `~/.cache/<product>` on Linux).
    pub fn in_user_cache_dir(product: &str) -> Result<Self, CacheError> {
        let base = dirs::cache_dir()
            .ok_or_else(|| CacheError::Open("no user cache directory".to_string()))?;
        Self::new(base.join(product))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Generation names become directory names, so path-traversal characters
    /// are rejected rather than escaped.
    fn generation_dir(&self, generation: &str) -> Result<PathBuf, CacheError> {
        if generation.is_empty()
            || generation.contains(['/', '\\'])
            || generation.contains("..")
        {
            return Err(CacheError::Open(format!(
                "invalid generation name: {:?}",
                generation
            )));
        }
        Ok(self.root.join(generation))
    }

    fn entry_path(&self, generation: &str, key: &CacheKey) -> Result<PathBuf, CacheError> {
        let digest = hex::encode(Sha256::digest(key.as_str().as_bytes()));
        Ok(self.generation_dir(generation)?.join(format!("{}.json", digest)))
    }
}

#[async_trait]
impl CacheStore for DiskStore {
    async fn open(&self, generation: &str) -> Result<(), CacheError> {
        let dir = self.generation_dir(generation)?;
        std::fs::create_dir_all(&dir).map_err(|source| io_error(&dir, source))?;
        debug!(generation = generation, dir = %dir.display(), "opened cache generation");
        Ok(())
    }

    async fn get(
        &self,
        generation: &str,
        key: &CacheKey,
    ) -> Result<Option<CachedEntry>, CacheError> {
        let path = self.entry_path(generation, key)?;
        if !path.exists() {
            return Ok(None);
        }
        let contents =
            std::fs::read_to_string(&path).map_err(|source| io_error(&path, source))?;
        let entry = serde_json::from_str(&contents).map_err(|source| CacheError::Corrupt {
            path: path.display().to_string(),
            source,
        })?;
        Ok(Some(entry))
    }

    async fn put(&self, generation: &str, entry: CachedEntry) -> Result<(), CacheError> {
        let dir = self.generation_dir(generation)?;
        std::fs::create_dir_all(&dir).map_err(|source| io_error(&dir, source))?;

        let path = self.entry_path(generation, &entry.key)?;
        // Compact encoding: bodies are byte arrays and dominate the file
        let contents = serde_json::to_string(&entry).map_err(|source| CacheError::Corrupt {
            path: path.display().to_string(),
            source,
        })?;
        std::fs::write(&path, contents).map_err(|source| io_error(&path, source))?;
        Ok(())
    }

    async fn delete(&self, generation: &str, key: &CacheKey) -> Result<bool, CacheError> {
        let path = self.entry_path(generation, key)?;
        if !path.exists() {
            return Ok(false);
        }
        std::fs::remove_file(&path).map_err(|source| io_error(&path, source))?;
        Ok(true)
    }

    async fn delete_generation(&self, generation: &str) -> Result<bool, CacheError> {
        let dir = self.generation_dir(generation)?;
        if !dir.exists() {
            return Ok(false);
        }
        std::fs::remove_dir_all(&dir).map_err(|source| io_error(&dir, source))?;
        Ok(true)
    }

    async fn list_generations(&self) -> Result<Vec<String>, CacheError> {
        let mut names = Vec::new();
        let dir = std::fs::read_dir(&self.root).map_err(|source| io_error(&self.root, source))?;
        for item in dir {
            let item = item.map_err(|source| io_error(&self.root, source))?;
            let is_dir = item
                .file_type()
                .map_err(|source| io_error(&item.path(), source))?
                .is_dir();
            if is_dir {
                names.push(item.file_name().to_string_lossy().into_owned());
            }
        }
        names.sort();
        Ok(names)
    }
}

fn io_error(path: &Path, source: std::io::Error) -> CacheError {
    CacheError::Io {
        path: path.display().to_string(),
        source,
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ProxyResponse;
    use reqwest::Method;
    use tempfile::TempDir;

    fn entry(url: &str, body: &[u8]) -> CachedEntry {
        let key = CacheKey::for_request(&Method::GET, url);
        CachedEntry::from_response(key, &ProxyResponse::network(200, vec![], body.to_vec()))
    }

    fn store() -> (TempDir, DiskStore) {
        let dir = TempDir::new().unwrap();
        let store = DiskStore::new(dir.path().join("cache")).unwrap();
        (dir, store)
    }

    #[tokio::test]
    async fn test_put_get_round_trip() {
        let (_dir, store) = store();
        let e = entry("https://example.com/index.html", b"<html></html>");
        let key = e.key.clone();
        store.put("portal-v1", e).await.unwrap();

        let found = store.get("portal-v1", &key).await.unwrap().unwrap();
        assert_eq!(found.body, b"<html></html>");
        assert_eq!(found.status, 200);
    }

    #[tokio::test]
    async fn test_missing_entry_is_none() {
        let (_dir, store) = store();
        store.open("portal-v1").await.unwrap();
        let key = CacheKey::for_request(&Method::GET, "https://example.com/missing");
        assert!(store.get("portal-v1", &key).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_corrupt_entry_is_reported() {
        let (_dir, store) = store();
        let e = entry("https://example.com/a", b"alpha");
        let key = e.key.clone();
        store.put("portal-v1", e).await.unwrap();

        let path = store.entry_path("portal-v1", &key).unwrap();
        std::fs::write(&path, "not json").unwrap();

        let result = store.get("portal-v1", &key).await;
        assert!(matches!(result, Err(CacheError::Corrupt { .. })));
    }

    #[tokio::test]
    async fn test_delete_generation_removes_directory() {
        let (_dir, store) = store();
        let e = entry("https://example.com/a", b"alpha");
        let key = e.key.clone();
        store.put("portal-v1", e).await.unwrap();

        assert!(store.delete_generation("portal-v1").await.unwrap());
        assert!(store.get("portal-v1", &key).await.unwrap().is_none());
        assert!(!store.delete_generation("portal-v1").await.unwrap());
        assert!(store.list_generations().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_list_generations_sorted() {
        let (_dir, store) = store();
        store.open("portal-v2").await.unwrap();
        store.open("portal-v1").await.unwrap();
        assert_eq!(
            store.list_generations().await.unwrap(),
            vec!["portal-v1", "portal-v2"]
        );
    }

    #[tokio::test]
    async fn test_path_traversal_generation_rejected() {
        let (_dir, store) = store();
        assert!(matches!(
            store.open("../escape").await,
            Err(CacheError::Open(_))
        ));
        assert!(matches!(
            store.open("a/b").await,
            Err(CacheError::Open(_))
        ));
    }
}
