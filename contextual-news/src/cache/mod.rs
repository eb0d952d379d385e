pub mod disk;
pub mod memory;
pub mod postgres;

pub use disk::DiskCache;
pub use memory::MemoryCache;
pub use postgres::PostgresCache;

use crate::types::{Result, UserProfile};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub key: String,
    pub value: String,
    pub expires_at: DateTime<Utc>,
}

impl CacheEntry {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

/// Storage strategy behind the response cache. Implementations store and
/// return entries verbatim; expiry is decided by the caller.
#[async_trait]
pub trait CacheBackend: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<CacheEntry>>;

    async fn set(&self, entry: CacheEntry) -> Result<()>;

    fn backend_name(&self) -> &'static str;
}

/// Deterministic cache key for a profile. Interests are order-insensitive.
pub fn fingerprint(profile: &UserProfile) -> String {
    let interests: BTreeSet<String> = profile
        .interests
        .iter()
        .map(|i| i.trim().to_lowercase())
        .filter(|i| !i.is_empty())
        .collect();

    format!(
        "news:{}:{}:{}",
        profile.profession.trim().to_lowercase(),
        profile.location.trim().to_lowercase(),
        interests.into_iter().collect::<Vec<_>>().join(",")
    )
}

/// TTL wrapper over a backend. Expiry is passive: an expired entry reads as
/// a miss and is overwritten by the next write. Backend failures never
/// surface; reads become misses and writes become no-ops.
#[derive(Clone)]
pub struct ResponseCache {
    backend: Arc<dyn CacheBackend>,
    ttl: Duration,
}

impl ResponseCache {
    pub fn new(backend: Arc<dyn CacheBackend>, ttl: Duration) -> Self {
        Self { backend, ttl }
    }

    pub fn in_memory(ttl: Duration) -> Self {
        Self::new(Arc::new(MemoryCache::new()), ttl)
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend.backend_name()
    }

    pub async fn get(&self, key: &str) -> Option<String> {
        self.get_at(key, Utc::now()).await
    }

    pub async fn get_at(&self, key: &str, now: DateTime<Utc>) -> Option<String> {
        match self.backend.get(key).await {
            Ok(Some(entry)) if entry.is_expired(now) => {
                debug!("Cache entry expired: {}", key);
                None
            }
            Ok(Some(entry)) => {
                debug!("Cache hit: {}", key);
                Some(entry.value)
            }
            Ok(None) => {
                debug!("Cache miss: {}", key);
                None
            }
            Err(e) => {
                warn!(backend = self.backend.backend_name(), error = %e, "cache read failed, treating as miss");
                None
            }
        }
    }

    pub async fn set(&self, key: &str, value: String) {
        self.set_at(key, value, Utc::now()).await
    }

    pub async fn set_at(&self, key: &str, value: String, now: DateTime<Utc>) {
        let entry = CacheEntry {
            key: key.to_string(),
            value,
            expires_at: now.checked_add_signed(self.ttl).unwrap_or(DateTime::<Utc>::MAX_UTC),
        };
        if let Err(e) = self.backend.set(entry).await {
            warn!(backend = self.backend.backend_name(), error = %e, "cache write failed, skipping");
        }
    }

    /// Typed read. A value that no longer deserializes is a miss.
    pub async fn get_json<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = self.get(key).await?;
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(error = %e, "cached value for {} is unreadable, treating as miss", key);
                None
            }
        }
    }

    pub async fn set_json<T: Serialize>(&self, key: &str, value: &T) {
        match serde_json::to_string(value) {
            Ok(raw) => self.set(key, raw).await,
            Err(e) => warn!(error = %e, "could not serialize value for {}", key),
        }
    }
}
