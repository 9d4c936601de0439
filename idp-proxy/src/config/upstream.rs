use confique::Config;
use std::time::Duration;

/// Configuration for calls to the upstream IDP
#[derive(Debug, Config, Clone)]
pub struct UpstreamConfig {
    /// Total timeout for a token or userinfo call in seconds (default: 10)
    #[config(env = "UPSTREAM_TIMEOUT", default = 10)]
    pub timeout: u64,

    /// Connection timeout in seconds (default: 2)
    #[config(env = "UPSTREAM_CONNECT_TIMEOUT", default = 2)]
    pub connect_timeout: u64,
}

impl UpstreamConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout)
    }
}
