pub(crate) use crate::config::hierarchy::{HierarchySettings, RefreshPolicy};
pub(crate) use crate::config::upstream::UpstreamConfig;
use confique::Config;
use thiserror::Error;
use url::Url;

pub mod hierarchy;
pub mod upstream;

/// Errors that prevent the proxy from starting
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0}")]
    Load(#[from] confique::Error),
    #[error("{name} is not a valid absolute URL ({value:?}): {source}")]
    InvalidUrl {
        name: &'static str,
        value: String,
        source: url::ParseError,
    },
    #[error("HIERARCHY_CONFIG_REFRESH must be one of 'always', 'ttl' or 'mtime', got {0:?}")]
    InvalidRefreshPolicy(String),
}

/// Main configuration structure for the proxy
#[derive(Debug, Config, Clone)]
pub struct ProxyConfig {
    /// Base URL of the IDP's authorization endpoint
    #[config(env = "AUTHORIZE_BASE_URL")]
    pub authorize_base_url: String,

    /// The IDP's token endpoint
    #[config(env = "TOKEN_ENDPOINT_URL")]
    pub token_endpoint_url: String,

    /// The IDP's userinfo endpoint
    #[config(env = "USERINFO_ENDPOINT_URL")]
    pub userinfo_endpoint_url: String,

    /// The redirect URI this proxy hands to the IDP (must point to this server's /callback)
    #[config(env = "PROXY_REDIRECT_URI")]
    pub proxy_redirect_uri: String,

    /// Where the browser is sent after the IDP called back (the client app's callback)
    #[config(env = "FINAL_APP_REDIRECT_URL")]
    pub final_app_redirect_url: String,

    /// The port the proxy will listen to (default: 3000)
    #[config(env = "PORT", default = 3000)]
    pub port: u16,

    /// Bearer key for the admin API; the admin routes are disabled when unset
    #[config(env = "ADMIN_API_KEY")]
    pub admin_api_key: Option<String>,

    /// Hierarchy configuration file settings
    #[config(nested)]
    pub hierarchy: HierarchySettings,

    /// Upstream IDP client settings
    #[config(nested)]
    pub upstream: UpstreamConfig,
}

impl ProxyConfig {
    /// Loads the configuration from environment variables and validates it
    pub fn new() -> Result<Self, ConfigError> {
        let config = Self::builder().env().load()?;
        config.validate()?;
        Ok(config)
    }

    /// Checks every endpoint URL and the refresh policy
    pub fn validate(&self) -> Result<(), ConfigError> {
        let urls = [
            ("AUTHORIZE_BASE_URL", &self.authorize_base_url),
            ("TOKEN_ENDPOINT_URL", &self.token_endpoint_url),
            ("USERINFO_ENDPOINT_URL", &self.userinfo_endpoint_url),
            ("PROXY_REDIRECT_URI", &self.proxy_redirect_uri),
            ("FINAL_APP_REDIRECT_URL", &self.final_app_redirect_url),
        ];
        for (name, value) in urls {
            Url::parse(value).map_err(|source| ConfigError::InvalidUrl {
                name,
                value: value.clone(),
                source,
            })?;
        }
        self.hierarchy.refresh_policy()?;
        Ok(())
    }

    /// Admin API key, if one is configured and non-empty
    pub fn admin_api_key(&self) -> Option<&str> {
        self.admin_api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
    }

    #[cfg(test)]
    pub fn for_test_with_mocks(
        idp_mock: &wiremock::MockServer,
        hierarchy_path: std::path::PathBuf,
    ) -> Self {
        Self {
            authorize_base_url: format!("{}/authorize", idp_mock.uri()),
            token_endpoint_url: format!("{}/token", idp_mock.uri()),
            userinfo_endpoint_url: format!("{}/userinfo", idp_mock.uri()),
            proxy_redirect_uri: "https://proxy.example/callback".to_string(),
            final_app_redirect_url: "https://app.example/cb".to_string(),
            port: 0, // Let the OS choose a port
            admin_api_key: Some("test_admin_key".to_string()),
            hierarchy: HierarchySettings {
                path: hierarchy_path,
                refresh: "always".to_string(),
                ttl: 30,
            },
            upstream: UpstreamConfig {
                timeout: 5,
                connect_timeout: 1,
            },
        }
    }
}
