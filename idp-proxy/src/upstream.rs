use crate::config::UpstreamConfig;
use crate::errors::ApiError;
use axum::body::Bytes;
use http::header::{ACCEPT, CONTENT_TYPE};
use http::{HeaderValue, StatusCode};
use log::debug;
use reqwest::Client;
use std::error::Error as StdError;
use std::time::Duration;
use thiserror::Error;

/// Errors raised when the IDP could not be reached at all.
///
/// An error *status* returned by the IDP is not an `UpstreamError`; it is
/// relayed to the caller as-is.
#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("request to {url} timed out")]
    Timeout { url: String },
    #[error("connection to {url} failed: {reason}")]
    Connect { url: String, reason: String },
    #[error("request to {url} failed: {reason}")]
    Request { url: String, reason: String },
}

impl UpstreamError {
    fn from_reqwest(url: &str, err: reqwest::Error) -> Self {
        let url = url.to_string();
        if err.is_timeout() {
            return Self::Timeout { url };
        }
        // Surface the innermost cause, reqwest's own message is rather generic
        let mut reason = err.to_string();
        let mut source = err.source();
        while let Some(cause) = source {
            reason = cause.to_string();
            source = cause.source();
        }
        if err.is_connect() {
            Self::Connect { url, reason }
        } else {
            Self::Request { url, reason }
        }
    }

    /// Converts the failure into the proxy's 500 response with the given context
    pub fn into_api_error(self, context: &str) -> ApiError {
        ApiError::proxy_internal(format!("{context}: {self}"))
    }
}

/// Status, content type and raw body of an upstream response
#[derive(Debug, Clone)]
pub struct UpstreamResponse {
    pub status: StatusCode,
    pub content_type: Option<HeaderValue>,
    pub body: Bytes,
}

/// HTTP client for the IDP's token and userinfo endpoints
#[derive(Debug, Clone)]
pub struct UpstreamClient {
    client: Client,
}

impl UpstreamClient {
    pub fn new(config: &UpstreamConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(config.timeout())
            .connect_timeout(config.connect_timeout())
            // The proxy relays redirects instead of following them
            .redirect(reqwest::redirect::Policy::none())
            .pool_max_idle_per_host(10)
            .pool_idle_timeout(Some(Duration::from_secs(90)))
            .build()?;
        Ok(Self { client })
    }

    /// POSTs an already encoded form body
    pub async fn post_form(
        &self,
        url: &str,
        form_body: String,
    ) -> Result<UpstreamResponse, UpstreamError> {
        debug!("Forwarding token request to {}", url);
        let request = self
            .client
            .post(url)
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .header(ACCEPT, "application/json")
            .body(form_body);
        Self::execute(url, request).await
    }

    /// GETs `url` authenticated with `token`
    pub async fn get_with_bearer(
        &self,
        url: &str,
        token: &str,
    ) -> Result<UpstreamResponse, UpstreamError> {
        debug!("Forwarding userinfo request to {}", url);
        let request = self
            .client
            .get(url)
            .bearer_auth(token)
            .header(ACCEPT, "application/json");
        Self::execute(url, request).await
    }

    async fn execute(
        url: &str,
        request: reqwest::RequestBuilder,
    ) -> Result<UpstreamResponse, UpstreamError> {
        let response = request
            .send()
            .await
            .map_err(|e| UpstreamError::from_reqwest(url, e))?;
        let status = response.status();
        let content_type = response.headers().get(CONTENT_TYPE).cloned();
        let body = response
            .bytes()
            .await
            .map_err(|e| UpstreamError::from_reqwest(url, e))?;
        debug!("Upstream {} answered with status {}", url, status);
        Ok(UpstreamResponse {
            status,
            content_type,
            body,
        })
    }
}
