use axum::response::IntoResponse;
use axum::Json;
use http::StatusCode;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// OAuth 2.0 error codes produced by the proxy itself
pub mod codes {
    pub const ACCESS_DENIED: &str = "access_denied";
    pub const INVALID_REQUEST: &str = "invalid_request";
    pub const INVALID_TOKEN: &str = "invalid_token";
    pub const PROXY_INTERNAL_ERROR: &str = "proxy_internal_error";
    pub const SERVER_ERROR: &str = "server_error";
}

/// OAuth 2.0 style error body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    /// Error code
    pub error: String,
    /// Human-readable error description
    pub error_description: String,
}

#[derive(Debug, Clone)]
pub struct ApiError {
    pub error: &'static str,
    pub description: String,
    pub status_code: StatusCode,
}

impl ApiError {
    /// Create a new ApiError with an error code, description and status code
    pub fn new<S: ToString>(error: &'static str, description: S, status_code: StatusCode) -> Self {
        Self {
            error,
            description: description.to_string(),
            status_code,
        }
    }

    /// Create new Bad Request Error (400) with the `invalid_request` code
    pub fn invalid_request<S: ToString>(description: S) -> Self {
        Self::new(codes::INVALID_REQUEST, description, StatusCode::BAD_REQUEST)
    }

    /// Create new Unauthorized Error (401) with the `invalid_token` code
    pub fn invalid_token<S: ToString>(description: S) -> Self {
        Self::new(codes::INVALID_TOKEN, description, StatusCode::UNAUTHORIZED)
    }

    /// Create new Forbidden Error (403) with the `access_denied` code
    pub fn forbidden<S: ToString>(description: S) -> Self {
        Self::new(codes::ACCESS_DENIED, description, StatusCode::FORBIDDEN)
    }

    /// Create new Internal Server Error (500) for failures talking to the IDP
    pub fn proxy_internal<S: ToString>(description: S) -> Self {
        Self::new(
            codes::PROXY_INTERNAL_ERROR,
            description,
            StatusCode::INTERNAL_SERVER_ERROR,
        )
    }

    /// Generic Internal Server Error (500) that reveals nothing about the cause
    pub fn unexpected() -> Self {
        Self::new(
            codes::SERVER_ERROR,
            "Internal Server Error: An unexpected error occurred!",
            StatusCode::INTERNAL_SERVER_ERROR,
        )
    }

    pub fn body(&self) -> ErrorBody {
        ErrorBody {
            error: self.error.to_string(),
            error_description: self.description.clone(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        (self.status_code, Json(self.body())).into_response()
    }
}
