//! Disk-backed content cache with logical expiration.
//!
//! Each entry is a content file plus a JSON metadata sidecar, keyed by
//! the SHA-256 of the logical resource key. Entries older than the TTL
//! are treated as absent; nothing is ever physically deleted. Missing
//! or corrupt metadata is a miss, not an error.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::error::Result;

/// Logical time-to-live for cache entries.
pub const CACHE_TTL_HOURS: i64 = 24;

/// Sidecar metadata written next to each content file.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct CacheMetadata {
    /// Original resource key (URL), kept for operational inspection
    key: String,

    /// Which tier or fallback produced the content
    source: String,

    /// Content size in bytes at write time
    size: usize,

    cached_at: DateTime<Utc>,
}

/// Summary of the cache directory for operational visibility.
#[derive(Debug, Clone, Serialize)]
pub struct CacheStatus {
    pub entries: usize,
    pub total_bytes: u64,
    pub oldest_entry: Option<DateTime<Utc>>,
}

/// Disk-backed key/value cache of raw fetched content.
#[derive(Debug, Clone)]
pub struct CacheStore {
    dir: PathBuf,
    ttl: Duration,
}

impl CacheStore {
    /// Create a cache over the given directory with the standard TTL.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            ttl: Duration::hours(CACHE_TTL_HOURS),
        }
    }

    /// Override the TTL (used by tests).
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Hash a resource key into a filesystem-safe cache key.
    fn hash_key(key: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(key.as_bytes());
        format!("{:x}", hasher.finalize())
    }

    fn content_path(&self, hashed: &str) -> PathBuf {
        self.dir.join(format!("{hashed}.html"))
    }

    fn meta_path(&self, hashed: &str) -> PathBuf {
        self.dir.join(format!("{hashed}.json"))
    }

    /// Persist content plus its metadata sidecar.
    ///
    /// Content is written before metadata so the sidecar never
    /// references an absent content file.
    pub async fn put(&self, key: &str, content: &str, source: &str) -> Result<()> {
        tokio::fs::create_dir_all(&self.dir).await?;

        let hashed = Self::hash_key(key);
        tokio::fs::write(self.content_path(&hashed), content).await?;

        let meta = CacheMetadata {
            key: key.to_string(),
            source: source.to_string(),
            size: content.len(),
            cached_at: Utc::now(),
        };
        let json = serde_json::to_vec_pretty(&meta)?;
        tokio::fs::write(self.meta_path(&hashed), json).await?;

        debug!(key = %key, source = %source, size = meta.size, "Cached content");
        Ok(())
    }

    /// Return content for a key if present and within TTL.
    ///
    /// Every failure mode (missing files, unreadable metadata, expired
    /// timestamp) is a miss.
    pub async fn get(&self, key: &str) -> Option<String> {
        let hashed = Self::hash_key(key);

        let meta_bytes = tokio::fs::read(self.meta_path(&hashed)).await.ok()?;
        let meta: CacheMetadata = match serde_json::from_slice(&meta_bytes) {
            Ok(meta) => meta,
            Err(e) => {
                warn!(key = %key, error = %e, "Corrupt cache metadata, treating as miss");
                return None;
            }
        };

        let age = Utc::now() - meta.cached_at;
        if age > self.ttl {
            debug!(key = %key, age_hours = age.num_hours(), "Cache entry expired");
            return None;
        }

        match tokio::fs::read_to_string(self.content_path(&hashed)).await {
            Ok(content) => {
                debug!(key = %key, source = %meta.source, "Cache hit");
                Some(content)
            }
            Err(e) => {
                warn!(key = %key, error = %e, "Cache content missing, treating as miss");
                None
            }
        }
    }

    /// Scan the cache directory for an operational summary.
    pub async fn status(&self) -> Result<CacheStatus> {
        let mut status = CacheStatus {
            entries: 0,
            total_bytes: 0,
            oldest_entry: None,
        };

        let mut entries = match tokio::fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            // Directory not created yet means an empty cache
            Err(_) => return Ok(status),
        };

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                if let Ok(meta) = entry.metadata().await {
                    status.total_bytes += meta.len();
                }
                continue;
            }
            status.entries += 1;
            if let Ok(bytes) = tokio::fs::read(&path).await {
                if let Ok(meta) = serde_json::from_slice::<CacheMetadata>(&bytes) {
                    status.oldest_entry = match status.oldest_entry {
                        Some(oldest) if oldest <= meta.cached_at => Some(oldest),
                        _ => Some(meta.cached_at),
                    };
                }
            }
        }

        Ok(status)
    }

    /// Directory backing this cache.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Write an entry with a doctored timestamp, for TTL boundary tests.
    #[cfg(test)]
    async fn put_at(&self, key: &str, content: &str, cached_at: DateTime<Utc>) -> Result<()> {
        tokio::fs::create_dir_all(&self.dir).await?;
        let hashed = Self::hash_key(key);
        tokio::fs::write(self.content_path(&hashed), content).await?;
        let meta = CacheMetadata {
            key: key.to_string(),
            source: "test".to_string(),
            size: content.len(),
            cached_at,
        };
        tokio::fs::write(self.meta_path(&hashed), serde_json::to_vec(&meta)?).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_cache() -> (tempfile::TempDir, CacheStore) {
        let dir = tempfile::tempdir().unwrap();
        let cache = CacheStore::new(dir.path());
        (dir, cache)
    }

    #[tokio::test]
    async fn test_put_then_get() {
        let (_dir, cache) = temp_cache();

        cache
            .put("https://example.com/zones", "<html>zones</html>", "primary_http")
            .await
            .unwrap();

        let content = cache.get("https://example.com/zones").await;
        assert_eq!(content.as_deref(), Some("<html>zones</html>"));
    }

    #[tokio::test]
    async fn test_miss_on_unknown_key() {
        let (_dir, cache) = temp_cache();
        assert!(cache.get("https://example.com/missing").await.is_none());
    }

    #[tokio::test]
    async fn test_ttl_boundary() {
        let (_dir, cache) = temp_cache();
        let ttl = Duration::hours(CACHE_TTL_HOURS);

        // One second inside the TTL: hit
        cache
            .put_at("fresh", "fresh content", Utc::now() - ttl + Duration::seconds(1))
            .await
            .unwrap();
        assert!(cache.get("fresh").await.is_some());

        // One second past the TTL: miss
        cache
            .put_at("stale", "stale content", Utc::now() - ttl - Duration::seconds(1))
            .await
            .unwrap();
        assert!(cache.get("stale").await.is_none());
    }

    #[tokio::test]
    async fn test_corrupt_metadata_is_miss() {
        let (_dir, cache) = temp_cache();
        cache.put("key", "content", "test").await.unwrap();

        let hashed = CacheStore::hash_key("key");
        tokio::fs::write(cache.meta_path(&hashed), b"not json")
            .await
            .unwrap();

        assert!(cache.get("key").await.is_none());
    }

    #[tokio::test]
    async fn test_overwrite_refreshes_entry() {
        let (_dir, cache) = temp_cache();
        cache.put("key", "old", "primary_http").await.unwrap();
        cache.put("key", "new", "synthetic").await.unwrap();

        assert_eq!(cache.get("key").await.as_deref(), Some("new"));
    }

    #[tokio::test]
    async fn test_status_counts_entries() {
        let (_dir, cache) = temp_cache();
        cache.put("a", "aaaa", "test").await.unwrap();
        cache.put("b", "bb", "test").await.unwrap();

        let status = cache.status().await.unwrap();
        assert_eq!(status.entries, 2);
        assert!(status.total_bytes >= 6);
        assert!(status.oldest_entry.is_some());
    }
}
