use crate::errors::ApiError;
use crate::state::AppState;
use axum::{
    body::Body,
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use log::warn;

const ACCESS_DENIED: &str =
    "You are not authorized to access this resource, please check your API key.";

/// Guards the admin routes with `Authorization: Bearer <ADMIN_API_KEY>`
pub(super) async fn admin_authentication_middleware(
    State(state): State<AppState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let Some(expected) = state.config.admin_api_key() else {
        // Admin routes are only mounted with a key, refuse if that ever changes
        warn!("Admin request received but no admin API key is configured");
        return ApiError::forbidden(ACCESS_DENIED).into_response();
    };

    // Extract the authorization header
    let Some(auth_header) = request.headers().get(http::header::AUTHORIZATION) else {
        warn!("Missing Authorization header on admin request");
        return ApiError::invalid_token("Missing Authorization header").into_response();
    };

    // Extract the key from the authorization header
    let api_key = match auth_header.to_str() {
        Ok(header_str) => match header_str.split_once(' ') {
            Some((scheme, key)) if scheme.eq_ignore_ascii_case("bearer") => key.trim(),
            _ => {
                warn!("Invalid Authorization header format, missing 'Bearer ' prefix");
                return ApiError::forbidden(ACCESS_DENIED).into_response();
            }
        },
        Err(e) => {
            warn!("Failed to parse Authorization header to string: {}", e);
            return ApiError::forbidden(ACCESS_DENIED).into_response();
        }
    };

    // Verify the API key
    if api_key != expected {
        warn!("Admin authentication failed: Invalid API key");
        return ApiError::forbidden(ACCESS_DENIED).into_response();
    }
    next.run(request).await
}
