//! Cache of advisory refinements, keyed by prompt hash.
//!
//! Owned by the advisor that fills it; there is no process-wide instance.

use std::{fmt, time::Duration};

use edu_srs::Refinement;
use moka::future::Cache;

/// Bounded refinement cache with a fixed time-to-live
#[derive(Clone)]
pub struct RefinementCache {
    cache: Cache<String, Refinement>,
    max_capacity: u64,
    ttl: Duration,
}

impl RefinementCache {
    /// A cache with `max_capacity == 0` keeps nothing.
    pub fn new(max_capacity: u64, ttl: Duration) -> Self {
        let cache = Cache::builder()
            .max_capacity(max_capacity)
            .time_to_live(ttl)
            .build();

        tracing::info!(max_capacity, ?ttl, "Initialized advisor cache");

        Self {
            cache,
            max_capacity,
            ttl,
        }
    }

    pub const fn max_capacity(&self) -> u64 {
        self.max_capacity
    }

    pub const fn ttl(&self) -> Duration {
        self.ttl
    }

    pub async fn get(&self, key: &str) -> Option<Refinement> {
        let hit = self.cache.get(key).await;
        if hit.is_some() {
            tracing::debug!(cache_key = %key, "Advisor cache hit");
        }
        hit
    }

    pub async fn insert(&self, key: String, refinement: Refinement) {
        self.cache.insert(key, refinement).await;
    }

    /// Number of live entries, after pending evictions are applied
    pub async fn entry_count(&self) -> u64 {
        self.cache.run_pending_tasks().await;
        self.cache.entry_count()
    }

    pub async fn clear(&self) {
        self.cache.invalidate_all();
        self.cache.run_pending_tasks().await;
    }
}

impl fmt::Debug for RefinementCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RefinementCache")
            .field("max_capacity", &self.max_capacity)
            .field("ttl", &self.ttl)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HOUR: Duration = Duration::from_secs(3600);

    fn refinement(adjustment: f64) -> Refinement {
        Refinement {
            timing_adjustment_days: adjustment,
            study_tips: vec![],
            learning_strategy: None,
            focus_areas: vec![],
            estimated_improvement: None,
        }
    }

    #[tokio::test]
    async fn test_get_returns_inserted_value() {
        let cache = RefinementCache::new(4, HOUR);
        cache.insert("prompt-a".to_string(), refinement(1.0)).await;

        assert_eq!(cache.get("prompt-a").await, Some(refinement(1.0)));
        assert_eq!(cache.get("prompt-b").await, None);
        assert_eq!(cache.entry_count().await, 1);
    }

    #[tokio::test]
    async fn test_entries_expire_after_ttl() {
        let cache = RefinementCache::new(4, Duration::from_millis(20));
        cache.insert("k".to_string(), refinement(0.5)).await;

        tokio::time::sleep(Duration::from_millis(60)).await;
        assert_eq!(cache.get("k").await, None);
    }

    #[tokio::test]
    async fn test_overwrite_keeps_latest() {
        let cache = RefinementCache::new(4, HOUR);
        cache.insert("a".to_string(), refinement(1.0)).await;
        cache.insert("a".to_string(), refinement(-1.0)).await;

        assert_eq!(cache.get("a").await, Some(refinement(-1.0)));
        assert_eq!(cache.entry_count().await, 1);
    }

    #[tokio::test]
    async fn test_clear() {
        let cache = RefinementCache::new(3, HOUR);
        cache.insert("x".to_string(), refinement(1.0)).await;
        cache.insert("y".to_string(), refinement(2.0)).await;
        cache.clear().await;

        assert_eq!(cache.get("x").await, None);
        assert_eq!(cache.entry_count().await, 0);
    }
}
