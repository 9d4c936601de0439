use super::SnapshotCache;
use crate::hierarchy::HierarchyConfig;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::SystemTime;

/// NullCache never holds a snapshot, so the file is read on every request.
#[derive(Clone, Debug)]
pub struct NullCache;

impl NullCache {
    /// Create a new NullCache instance
    pub fn new() -> Self {
        NullCache
    }
}

impl Default for NullCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SnapshotCache for NullCache {
    async fn get(&self) -> Option<Arc<HierarchyConfig>> {
        None
    }

    async fn set(&self, _config: Arc<HierarchyConfig>, _modified: Option<SystemTime>) {}

    async fn invalidate(&self) {}
}
