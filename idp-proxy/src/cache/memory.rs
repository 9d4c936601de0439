use super::SnapshotCache;
use crate::hierarchy::HierarchyConfig;
use async_trait::async_trait;
use moka::future::Cache as MokaCache;
use std::sync::Arc;
use std::time::{Duration, SystemTime};

#[derive(Clone)]
pub struct InMemoryCache {
    cache: MokaCache<(), Arc<HierarchyConfig>>,
}

impl InMemoryCache {
    /// Initialize a cache whose snapshot expires `ttl` after it was stored
    pub fn new(ttl: Duration) -> Self {
        let cache = MokaCache::builder()
            .time_to_live(ttl)
            .max_capacity(1)
            .build();

        Self { cache }
    }
}

#[async_trait]
impl SnapshotCache for InMemoryCache {
    async fn get(&self) -> Option<Arc<HierarchyConfig>> {
        self.cache.get(&()).await
    }

    async fn set(&self, config: Arc<HierarchyConfig>, _modified: Option<SystemTime>) {
        self.cache.insert((), config).await;
    }

    async fn invalidate(&self) {
        self.cache.invalidate(&()).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_cache_operations() {
        let cache = InMemoryCache::new(Duration::from_secs(1));
        let config = Arc::new(HierarchyConfig::fallback());

        cache.set(config.clone(), None).await;
        assert_eq!(cache.get().await, Some(config));

        // Test expiration
        tokio::time::sleep(Duration::from_secs(2)).await;
        assert!(cache.get().await.is_none());
    }

    #[tokio::test]
    async fn test_set_replaces_snapshot() {
        let cache = InMemoryCache::new(Duration::from_secs(60));
        cache.set(Arc::new(HierarchyConfig::fallback()), None).await;

        let replacement = Arc::new(HierarchyConfig {
            groups: vec![crate::hierarchy::GroupMapping {
                group_id: 9,
                roles: vec!["Leitung".to_string()],
                level: crate::hierarchy::HierarchyLevel::Leader,
            }],
        });
        cache.set(replacement.clone(), None).await;
        assert_eq!(cache.get().await, Some(replacement));
    }
}
