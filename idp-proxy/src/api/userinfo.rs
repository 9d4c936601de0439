use crate::api::{bearer_token, relay_response};
use crate::errors::{ApiError, ErrorBody};
use crate::openapi::RELAY_TAG;
use crate::state::AppState;
use crate::translator::{translate_value, TranslateError, TranslatedUserinfo};
use crate::upstream::UpstreamResponse;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Response};
use axum::Json;
use log::{debug, error, warn};
use serde_json::Value;

/// Fetches the caller's userinfo and attaches `groups` and `hierarchy_level`
#[utoipa::path(
    get,
    path = "/userinfo",
    tag = RELAY_TAG,
    params(
        ("Authorization" = String, Header, description = "Bearer access token issued by the IDP"),
    ),
    responses(
        (status = 200, description = "Translated userinfo", body = TranslatedUserinfo),
        (status = 401, description = "Missing access token", body = ErrorBody),
        (status = 500, description = "The IDP userinfo endpoint could not be reached", body = ErrorBody),
    )
)]
pub(crate) async fn userinfo(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let Some(token) = bearer_token(&headers) else {
        warn!("Rejecting userinfo request without bearer token");
        return ApiError::invalid_token("Missing access token in Authorization header.")
            .into_response();
    };

    let url = &state.config.userinfo_endpoint_url;
    let upstream = match state.upstream.get_with_bearer(url, token).await {
        Ok(upstream) => upstream,
        Err(err) => {
            error!("Userinfo request failed: {}", err);
            return err
                .into_api_error("Failed to communicate with upstream userinfo endpoint")
                .into_response();
        }
    };

    if !upstream.status.is_success() {
        warn!("IDP userinfo endpoint answered with status {}", upstream.status);
        return relay_response(upstream);
    }

    translate_response(&state, upstream).await
}

/// Translates a successful upstream payload, anything untranslatable is relayed as-is
async fn translate_response(state: &AppState, upstream: UpstreamResponse) -> Response {
    let payload = match serde_json::from_slice::<Value>(&upstream.body) {
        Ok(payload @ Value::Object(_)) if payload.get("roles").is_some() => payload,
        _ => {
            debug!("Userinfo payload carries no roles claim, relaying unchanged");
            return relay_response(upstream);
        }
    };

    let snapshot = state.hierarchy.snapshot().await;
    match translate_value(payload, snapshot.config()) {
        Ok(translated) => {
            debug!(
                "Resolved hierarchy level {:?} for subject {:?} with groups {:?}",
                translated.hierarchy_level,
                translated.userinfo.subject(),
                translated.groups
            );
            (upstream.status, Json(translated)).into_response()
        }
        Err(TranslateError::MissingRoles) => relay_response(upstream),
        Err(err @ TranslateError::Malformed(_)) => {
            warn!("Relaying userinfo unchanged: {}", err);
            relay_response(upstream)
        }
    }
}
