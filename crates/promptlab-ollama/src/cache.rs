//! Time-boxed model-list cache.
//!
//! The cache holds at most one snapshot. A snapshot is built completely and
//! then swapped in under the write lock, so readers see either the old
//! pair of models and capture time or the new one.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use promptlab_core::{CacheInfo, ModelInfo};
use tokio::sync::RwLock;
use tokio::time::Instant;

struct Snapshot {
    models: Vec<ModelInfo>,
    captured_at: Instant,
    captured_at_utc: DateTime<Utc>,
}

impl Snapshot {
    fn age(&self) -> Duration {
        self.captured_at.elapsed()
    }
}

/// Single-slot model cache with a fixed TTL.
pub struct ModelCache {
    ttl: Duration,
    slot: RwLock<Option<Arc<Snapshot>>>,
}

impl ModelCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            slot: RwLock::new(None),
        }
    }

    async fn current(&self) -> Option<Arc<Snapshot>> {
        self.slot.read().await.clone()
    }

    /// A copy of the cached models, if the snapshot is younger than the TTL.
    pub async fn fresh(&self) -> Option<Vec<ModelInfo>> {
        self.current()
            .await
            .filter(|snapshot| snapshot.age() < self.ttl)
            .map(|snapshot| snapshot.models.clone())
    }

    /// Replace the snapshot.
    pub async fn store(&self, models: Vec<ModelInfo>) {
        let snapshot = Arc::new(Snapshot {
            models,
            captured_at: Instant::now(),
            captured_at_utc: Utc::now(),
        });
        *self.slot.write().await = Some(snapshot);
    }

    pub async fn clear(&self) {
        *self.slot.write().await = None;
    }

    pub async fn info(&self) -> CacheInfo {
        let ttl_seconds = self.ttl.as_secs();
        match self.current().await {
            None => CacheInfo {
                cached: false,
                cache_time: None,
                cache_age_seconds: None,
                cache_valid: false,
                models_count: 0,
                ttl_seconds,
            },
            Some(snapshot) => {
                let age = snapshot.age();
                CacheInfo {
                    cached: true,
                    cache_time: Some(snapshot.captured_at_utc),
                    cache_age_seconds: Some(age.as_secs()),
                    cache_valid: age < self.ttl,
                    models_count: snapshot.models.len(),
                    ttl_seconds,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn models(n: usize) -> Vec<ModelInfo> {
        (0..n)
            .map(|i| ModelInfo::new(format!("model-{i}"), 1024, "", ""))
            .collect()
    }

    #[tokio::test]
    async fn test_empty_cache() {
        let cache = ModelCache::new(Duration::from_secs(300));
        assert!(cache.fresh().await.is_none());

        let info = cache.info().await;
        assert!(!info.cached);
        assert!(!info.cache_valid);
        assert_eq!(info.cache_age_seconds, None);
        assert_eq!(info.ttl_seconds, 300);
    }

    #[tokio::test(start_paused = true)]
    async fn test_snapshot_expires_after_ttl() {
        let cache = ModelCache::new(Duration::from_secs(300));
        cache.store(models(2)).await;
        assert_eq!(cache.fresh().await.map(|m| m.len()), Some(2));

        tokio::time::advance(Duration::from_secs(299)).await;
        assert!(cache.fresh().await.is_some());
        let info = cache.info().await;
        assert_eq!(info.cache_age_seconds, Some(299));
        assert!(info.cache_valid);

        tokio::time::advance(Duration::from_secs(1)).await;
        assert!(cache.fresh().await.is_none());
        let info = cache.info().await;
        assert!(info.cached);
        assert!(!info.cache_valid);
        assert_eq!(info.models_count, 2);
    }

    #[tokio::test]
    async fn test_zero_ttl_never_serves() {
        let cache = ModelCache::new(Duration::ZERO);
        cache.store(models(1)).await;
        assert!(cache.fresh().await.is_none());
    }

    #[tokio::test]
    async fn test_clear() {
        let cache = ModelCache::new(Duration::from_secs(60));
        cache.store(models(3)).await;
        cache.clear().await;
        assert!(cache.fresh().await.is_none());
        assert!(!cache.info().await.cached);
    }
}
