//! TTL'd cache for filtered list queries.
//!
//! Entries expire after a short TTL and every mutation invalidates by
//! key prefix, so a stale list can survive at most one TTL window.

use std::time::Duration;

use moka::future::Cache;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use atrium_core::config::cache::CacheConfig;

/// Moka-backed query cache with prefix invalidation.
#[derive(Debug, Clone)]
pub struct ListCache {
    cache: Cache<String, String>,
}

impl ListCache {
    /// Create a new list cache from configuration.
    pub fn new(config: &CacheConfig) -> Self {
        let cache = Cache::builder()
            .max_capacity(config.max_capacity)
            .time_to_live(Duration::from_secs(config.list_ttl_seconds))
            .build();
        Self { cache }
    }

    /// Fetch a cached list, if present and fresh.
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Option<Vec<T>> {
        let raw = self.cache.get(key).await?;
        serde_json::from_str(&raw).ok()
    }

    /// Store a list under `key`.
    pub async fn put<T: Serialize>(&self, key: &str, items: &[T]) {
        if let Ok(raw) = serde_json::to_string(items) {
            self.cache.insert(key.to_string(), raw).await;
        }
    }

    /// Invalidate every entry whose key starts with `prefix`.
    ///
    /// Moka has no pattern scanning, so we sync pending writes, collect
    /// matching keys, and remove them one by one.
    pub async fn invalidate_prefix(&self, prefix: &str) -> u64 {
        self.cache.run_pending_tasks().await;
        let keys_to_remove: Vec<String> = self
            .cache
            .iter()
            .filter(|entry| entry.0.starts_with(prefix))
            .map(|entry| entry.0.to_string())
            .collect();

        let mut count = 0u64;
        for key in keys_to_remove {
            self.cache.remove(&key).await;
            count += 1;
        }

        debug!(prefix, count, "Invalidated cached lists");
        count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_cache() -> ListCache {
        ListCache::new(&CacheConfig {
            list_ttl_seconds: 60,
            max_capacity: 100,
        })
    }

    #[tokio::test]
    async fn test_put_get() {
        let cache = make_cache();
        cache.put("k:a", &["x".to_string(), "y".to_string()]).await;
        let items: Option<Vec<String>> = cache.get("k:a").await;
        assert_eq!(items, Some(vec!["x".to_string(), "y".to_string()]));
    }

    #[tokio::test]
    async fn test_miss_is_none() {
        let cache = make_cache();
        let items: Option<Vec<String>> = cache.get("absent").await;
        assert!(items.is_none());
    }

    #[tokio::test]
    async fn test_invalidate_prefix() {
        let cache = make_cache();
        cache.put("lists:a", &[1, 2]).await;
        cache.put("lists:b", &[3]).await;
        cache.put("other:c", &[4]).await;

        let removed = cache.invalidate_prefix("lists:").await;
        assert_eq!(removed, 2);

        let a: Option<Vec<i32>> = cache.get("lists:a").await;
        let c: Option<Vec<i32>> = cache.get("other:c").await;
        assert!(a.is_none());
        assert_eq!(c, Some(vec![4]));
    }
}
