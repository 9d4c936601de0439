use crate::config::{ConfigError, HierarchySettings, RefreshPolicy};
use crate::hierarchy::HierarchyConfig;
use std::sync::Arc;
use std::time::SystemTime;

pub mod memory;
pub mod mtime;
pub mod null;

/// Snapshot cache interface for the hierarchy configuration.
///
/// Implementations hold at most one parsed configuration. A `None` from
/// [`SnapshotCache::get`] means the caller has to read the file again.
#[async_trait::async_trait]
pub trait SnapshotCache: Send + Sync {
    /// Returns the cached snapshot if it is still fresh
    async fn get(&self) -> Option<Arc<HierarchyConfig>>;

    /// Stores a freshly read snapshot.
    ///
    /// `modified` is the file's modification time taken *before* the file was
    /// read, so an edit racing with the read is never attributed to the old content.
    async fn set(&self, config: Arc<HierarchyConfig>, modified: Option<SystemTime>);

    /// Drops the cached snapshot
    async fn invalidate(&self);
}

/// Snapshot cache selected by the configured refresh policy.
///
/// The concrete implementation is chosen at startup; callers only see the
/// [`SnapshotCache`] interface.
#[derive(Clone)]
pub enum Cache {
    /// Time-bounded in-memory cache using Moka
    InMemory(memory::InMemoryCache),
    /// Cache validated against the file's modification time
    Mtime(mtime::MtimeCache),
    /// No caching, the file is read on every request
    Null(null::NullCache),
}

#[async_trait::async_trait]
impl SnapshotCache for Cache {
    async fn get(&self) -> Option<Arc<HierarchyConfig>> {
        match self {
            Self::InMemory(cache) => cache.get().await,
            Self::Mtime(cache) => cache.get().await,
            Self::Null(cache) => cache.get().await,
        }
    }

    async fn set(&self, config: Arc<HierarchyConfig>, modified: Option<SystemTime>) {
        match self {
            Self::InMemory(cache) => cache.set(config, modified).await,
            Self::Mtime(cache) => cache.set(config, modified).await,
            Self::Null(cache) => cache.set(config, modified).await,
        }
    }

    async fn invalidate(&self) {
        match self {
            Self::InMemory(cache) => cache.invalidate().await,
            Self::Mtime(cache) => cache.invalidate().await,
            Self::Null(cache) => cache.invalidate().await,
        }
    }
}

/// Creates the snapshot cache matching the configured refresh policy
pub fn create_cache(settings: &HierarchySettings) -> Result<Cache, ConfigError> {
    match settings.refresh_policy()? {
        RefreshPolicy::Ttl(ttl) => Ok(Cache::InMemory(memory::InMemoryCache::new(ttl))),
        RefreshPolicy::Mtime => Ok(Cache::Mtime(mtime::MtimeCache::new(settings.path.clone()))),
        RefreshPolicy::Always => Ok(Cache::Null(null::NullCache::new())),
    }
}
