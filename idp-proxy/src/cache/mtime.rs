use super::SnapshotCache;
use crate::hierarchy::HierarchyConfig;
use async_trait::async_trait;
use log::debug;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;
use tokio::sync::RwLock;

/// Keeps the last snapshot while the file's modification time is unchanged.
#[derive(Clone)]
pub struct MtimeCache {
    path: PathBuf,
    entry: Arc<RwLock<Option<(SystemTime, Arc<HierarchyConfig>)>>>,
}

impl MtimeCache {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            entry: Arc::new(RwLock::new(None)),
        }
    }
}

/// Modification time of `path`, if the file exists and the platform reports one
pub(crate) async fn modified(path: &Path) -> Option<SystemTime> {
    tokio::fs::metadata(path).await.ok()?.modified().ok()
}

#[async_trait]
impl SnapshotCache for MtimeCache {
    async fn get(&self) -> Option<Arc<HierarchyConfig>> {
        let current = modified(&self.path).await?;
        let entry = self.entry.read().await;
        match entry.as_ref() {
            Some((cached_at, config)) if *cached_at == current => Some(config.clone()),
            Some(_) => {
                debug!("hierarchy config {} changed on disk", self.path.display());
                None
            }
            None => None,
        }
    }

    async fn set(&self, config: Arc<HierarchyConfig>, modified: Option<SystemTime>) {
        // Without a modification time there is nothing to validate against
        let Some(read_at) = modified else {
            return;
        };
        *self.entry.write().await = Some((read_at, config));
    }

    async fn invalidate(&self) {
        *self.entry.write().await = None;
    }
}
