//! Persistence of the hierarchy configuration file.
//!
//! The configuration sits on the hot path of every `/userinfo` call. A missing
//! or broken file must not lock users out, so [`HierarchyConfigStore::load`]
//! never fails: it falls back to [`HierarchyConfig::fallback`], persists it and
//! reports the fallback through [`LoadOutcome::Defaulted`].

use super::HierarchyConfig;
use crate::cache::mtime::modified;
use crate::cache::{create_cache, Cache, SnapshotCache};
use crate::config::{ConfigError, HierarchySettings};
use log::{debug, error, warn};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use thiserror::Error;

/// Errors that can occur while persisting the configuration
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Failed to serialize hierarchy config: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("Failed to write hierarchy config to {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Why a default configuration was used instead of the file's content
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DefaultReason {
    /// The file does not exist
    Missing,
    /// The file exists but could not be read
    Unreadable(String),
    /// The file is not a valid hierarchy configuration
    Invalid(String),
}

impl std::fmt::Display for DefaultReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Missing => write!(f, "file not found"),
            Self::Unreadable(e) => write!(f, "file unreadable: {e}"),
            Self::Invalid(e) => write!(f, "invalid content: {e}"),
        }
    }
}

/// Result of loading the configuration
#[derive(Debug, Clone, PartialEq)]
pub enum LoadOutcome {
    /// The configuration was read from the file (or a fresh cached copy of it)
    Loaded(Arc<HierarchyConfig>),
    /// The default configuration was synthesized
    Defaulted {
        config: Arc<HierarchyConfig>,
        reason: DefaultReason,
    },
}

impl LoadOutcome {
    pub fn config(&self) -> &Arc<HierarchyConfig> {
        match self {
            Self::Loaded(config) => config,
            Self::Defaulted { config, .. } => config,
        }
    }

    pub fn is_defaulted(&self) -> bool {
        matches!(self, Self::Defaulted { .. })
    }
}

/// Owner of the on-disk hierarchy configuration
pub struct HierarchyConfigStore {
    path: PathBuf,
    cache: Cache,
    default_fallbacks: AtomicU64,
    last_defaulted: AtomicBool,
}

impl HierarchyConfigStore {
    /// Creates a store for the configured path and refresh policy
    pub fn new(settings: &HierarchySettings) -> Result<Self, ConfigError> {
        Ok(Self::with_cache(settings.path.clone(), create_cache(settings)?))
    }

    pub fn with_cache(path: PathBuf, cache: Cache) -> Self {
        Self {
            path,
            cache,
            default_fallbacks: AtomicU64::new(0),
            last_defaulted: AtomicBool::new(false),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of times a default configuration had to be synthesized
    pub fn default_fallbacks(&self) -> u64 {
        self.default_fallbacks.load(Ordering::Relaxed)
    }

    /// Whether the most recent read had to fall back to the default
    pub fn last_load_defaulted(&self) -> bool {
        self.last_defaulted.load(Ordering::Relaxed)
    }

    /// Returns the current configuration, honouring the refresh policy
    pub async fn snapshot(&self) -> LoadOutcome {
        if let Some(config) = self.cache.get().await {
            debug!("serving cached hierarchy config");
            return LoadOutcome::Loaded(config);
        }

        // Stamp the snapshot with the modification time seen before reading
        let read_at = modified(&self.path).await;
        let outcome = self.load().await;
        // Defaults are not cached so that a repaired file is picked up right away
        if let LoadOutcome::Loaded(config) = &outcome {
            self.cache.set(config.clone(), read_at).await;
        }
        outcome
    }

    /// Reads the configuration file, falling back to (and persisting) the default
    pub async fn load(&self) -> LoadOutcome {
        let reason = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => match serde_json::from_str::<HierarchyConfig>(&content) {
                Ok(config) => {
                    self.last_defaulted.store(false, Ordering::Relaxed);
                    return LoadOutcome::Loaded(Arc::new(config));
                }
                Err(e) => DefaultReason::Invalid(e.to_string()),
            },
            Err(e) if e.kind() == ErrorKind::NotFound => DefaultReason::Missing,
            Err(e) => DefaultReason::Unreadable(e.to_string()),
        };

        warn!(
            "hierarchy config {} could not be used ({}), falling back to default",
            self.path.display(),
            reason
        );
        self.default_fallbacks.fetch_add(1, Ordering::Relaxed);
        self.last_defaulted.store(true, Ordering::Relaxed);

        let config = HierarchyConfig::fallback();
        if let Err(e) = self.write(&config).await {
            error!("Failed to persist default hierarchy config: {}", e);
        }
        LoadOutcome::Defaulted {
            config: Arc::new(config),
            reason,
        }
    }

    /// Persists `config` and drops any cached snapshot
    pub async fn save(&self, config: &HierarchyConfig) -> Result<(), StoreError> {
        self.write(config).await?;
        self.cache.invalidate().await;
        self.last_defaulted.store(false, Ordering::Relaxed);
        Ok(())
    }

    /// Writes to a temporary sibling first and renames it over the target,
    /// so concurrent writers never leave a torn file behind
    async fn write(&self, config: &HierarchyConfig) -> Result<(), StoreError> {
        let mut content = serde_json::to_string_pretty(config)?;
        content.push('\n');

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|source| StoreError::Io {
                    path: parent.to_path_buf(),
                    source,
                })?;
        }

        let tmp_path = temporary_path(&self.path);
        if let Err(source) = tokio::fs::write(&tmp_path, content).await {
            return Err(StoreError::Io {
                path: tmp_path,
                source,
            });
        }
        if let Err(source) = tokio::fs::rename(&tmp_path, &self.path).await {
            let _ = tokio::fs::remove_file(&tmp_path).await;
            return Err(StoreError::Io {
                path: self.path.clone(),
                source,
            });
        }
        debug!("hierarchy config written to {}", self.path.display());
        Ok(())
    }
}

fn temporary_path(path: &Path) -> PathBuf {
    static COUNTER: AtomicU64 = AtomicU64::new(0);
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "hierarchy_config.json".to_string());
    let unique = COUNTER.fetch_add(1, Ordering::Relaxed);
    path.with_file_name(format!(
        ".{}.{}.{}.tmp",
        file_name,
        std::process::id(),
        unique
    ))
}
