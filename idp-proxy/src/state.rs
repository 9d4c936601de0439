use crate::config::{ConfigError, ProxyConfig};
use crate::hierarchy::HierarchyConfigStore;
use crate::upstream::UpstreamClient;
use std::sync::Arc;
use thiserror::Error;

/// Errors while assembling the application state
#[derive(Debug, Error)]
pub enum StateError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("Failed to create upstream HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ProxyConfig>,
    pub upstream: Arc<UpstreamClient>,
    pub hierarchy: Arc<HierarchyConfigStore>,
}

impl AppState {
    pub fn new(config: &ProxyConfig) -> Result<Self, StateError> {
        Ok(Self {
            config: Arc::new(config.clone()),
            upstream: Arc::new(UpstreamClient::new(&config.upstream)?),
            hierarchy: Arc::new(HierarchyConfigStore::new(&config.hierarchy)?),
        })
    }

    #[cfg(test)]
    pub fn for_testing(config: &ProxyConfig) -> Self {
        Self::new(config).expect("Failed to create test state")
    }
}
