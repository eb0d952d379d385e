use super::{CacheBackend, CacheEntry};
use crate::types::{NewsError, Result};
use async_trait::async_trait;
use sha2::{Digest, Sha256};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;
use uuid::Uuid;

/// One JSON file per key, named by the SHA-256 of the key.
#[derive(Debug, Clone)]
pub struct DiskCache {
    root: PathBuf,
}

impl DiskCache {
    pub fn new(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        std::fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path_for(&self, key: &str) -> PathBuf {
        let digest = Sha256::digest(key.as_bytes());
        self.root.join(format!("{}.json", hex::encode(digest)))
    }
}

#[async_trait]
impl CacheBackend for DiskCache {
    async fn get(&self, key: &str) -> Result<Option<CacheEntry>> {
        let path = self.path_for(key);
        let raw = match tokio::fs::read_to_string(&path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let entry: CacheEntry = serde_json::from_str(&raw)?;
        if entry.key != key {
            return Err(NewsError::cache(format!("key mismatch in {:?}", path)));
        }
        Ok(Some(entry))
    }

    async fn set(&self, entry: CacheEntry) -> Result<()> {
        let path = self.path_for(&entry.key);
        // Readers only ever see a complete file
        let tmp = path.with_extension(format!("{}.tmp", Uuid::new_v4().simple()));
        let raw = serde_json::to_vec(&entry)?;

        tokio::fs::write(&tmp, raw).await?;
        if let Err(e) = tokio::fs::rename(&tmp, &path).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(e.into());
        }
        debug!("Wrote cache file {:?}", path);
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "disk"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use tempfile::TempDir;

    fn entry(key: &str, value: &str) -> CacheEntry {
        CacheEntry {
            key: key.to_string(),
            value: value.to_string(),
            expires_at: Utc::now() + Duration::hours(1),
        }
    }

    #[tokio::test]
    async fn round_trips_through_the_filesystem() {
        let dir = TempDir::new().unwrap();
        let cache = DiskCache::new(dir.path().join("nested")).unwrap();

        assert!(cache.get("news:teacher:india:").await.unwrap().is_none());

        let stored = entry("news:teacher:india:", "{\"articles\":[]}");
        cache.set(stored.clone()).await.unwrap();
        assert_eq!(cache.get("news:teacher:india:").await.unwrap(), Some(stored));

        let reopened = DiskCache::new(dir.path().join("nested")).unwrap();
        assert_eq!(reopened.get("news:teacher:india:").await.unwrap().unwrap().value, "{\"articles\":[]}");
    }

    #[tokio::test]
    async fn file_names_are_hashed_and_no_temp_files_remain() {
        let dir = TempDir::new().unwrap();
        let cache = DiskCache::new(dir.path()).unwrap();
        cache.set(entry("a/b:c", "1")).await.unwrap();
        cache.set(entry("a/b:c", "2")).await.unwrap();

        let names: Vec<String> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names.len(), 1);
        assert_eq!(names[0].len(), 64 + ".json".len());
        assert_eq!(cache.get("a/b:c").await.unwrap().unwrap().value, "2");
    }

    #[tokio::test]
    async fn corrupt_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let cache = DiskCache::new(dir.path()).unwrap();
        std::fs::write(cache.path_for("k"), "garbage").unwrap();
        assert!(matches!(cache.get("k").await, Err(NewsError::Serialization(_))));
    }
}
