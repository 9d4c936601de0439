pub(crate) mod admin;
pub(crate) mod authenticate;
mod authn_middleware;
pub(crate) mod callback;
pub(crate) mod health;
pub(crate) mod token;
pub(crate) mod userinfo;

use crate::api::authn_middleware::admin_authentication_middleware;
use crate::errors::ApiError;
use crate::state::AppState;
use crate::upstream::UpstreamResponse;
use axum::body::Body;
use axum::http::{header, HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{middleware, Router};
use log::error;

/// Combines all API routes into a single router
pub(super) fn router(state: &AppState) -> Router<AppState> {
    let mut root = Router::new()
        .merge(health::router())
        .merge(relay_routes());

    if state.config.admin_api_key().is_some() {
        root = root.merge(admin_routes(state));
    }

    root
}

/// The four OAuth legs relayed to the IDP
fn relay_routes() -> Router<AppState> {
    Router::new()
        .route("/authenticate", get(authenticate::authenticate))
        .route("/callback", get(callback::callback))
        .route("/token", post(token::token))
        .route("/userinfo", get(userinfo::userinfo))
}

/// Creates a router for the admin routes that require the admin API key
fn admin_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/admin/hierarchy-config",
            get(admin::get_hierarchy_config).put(admin::put_hierarchy_config),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            admin_authentication_middleware,
        ))
}

/// Extracts the token of an `Authorization: Bearer <token>` header
pub(crate) fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

/// `302 Found` to `location`
pub(crate) fn found(location: String) -> Response {
    match HeaderValue::try_from(location) {
        Ok(location) => (StatusCode::FOUND, [(header::LOCATION, location)]).into_response(),
        Err(e) => {
            error!("Failed to build redirect location: {}", e);
            ApiError::unexpected().into_response()
        }
    }
}

/// Mirrors an upstream status, content type and body
pub(crate) fn relay_response(upstream: UpstreamResponse) -> Response {
    let mut response = Response::new(Body::from(upstream.body));
    *response.status_mut() = upstream.status;
    if let Some(content_type) = upstream.content_type {
        response
            .headers_mut()
            .insert(header::CONTENT_TYPE, content_type);
    }
    response
}
