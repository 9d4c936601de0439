use crate::config::ConfigError;
use confique::Config;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// Configuration for the group-to-level hierarchy file
#[derive(Debug, Config, Clone)]
pub struct HierarchySettings {
    /// Location of the hierarchy configuration JSON file
    #[config(env = "HIERARCHY_CONFIG_PATH", default = "config/hierarchy_config.json")]
    pub path: PathBuf,

    /// How snapshots are refreshed: "always", "ttl" or "mtime" (default: always)
    #[config(env = "HIERARCHY_CONFIG_REFRESH", default = "always")]
    pub refresh: String,

    /// Cache lifetime in seconds for the "ttl" refresh policy (default: 30)
    #[config(env = "HIERARCHY_CONFIG_TTL", default = 30)]
    pub ttl: u64,
}

impl HierarchySettings {
    /// Resolves the configured refresh policy
    pub fn refresh_policy(&self) -> Result<RefreshPolicy, ConfigError> {
        match self.refresh.parse::<RefreshPolicy>()? {
            RefreshPolicy::Ttl(_) => Ok(RefreshPolicy::Ttl(Duration::from_secs(self.ttl))),
            policy => Ok(policy),
        }
    }
}

/// Specifies when the hierarchy configuration file is re-read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshPolicy {
    /// Read the file on every request
    Always,
    /// Keep a parsed snapshot for the given duration
    Ttl(Duration),
    /// Keep a parsed snapshot until the file's modification time changes
    Mtime,
}

impl FromStr for RefreshPolicy {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "always" | "none" => Ok(Self::Always),
            "ttl" => Ok(Self::Ttl(Duration::ZERO)),
            "mtime" => Ok(Self::Mtime),
            _ => Err(ConfigError::InvalidRefreshPolicy(value.to_string())),
        }
    }
}
