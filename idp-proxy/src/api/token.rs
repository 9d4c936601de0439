use crate::api::relay_response;
use crate::errors::{ApiError, ErrorBody};
use crate::headers::presets;
use crate::openapi::RELAY_TAG;
use crate::rewrite::{rewrite, ParameterBag, REDIRECT_URI};
use crate::state::AppState;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{header, HeaderMap};
use axum::response::{IntoResponse, Response};
use log::{error, info, warn};
use serde_json::Value;

/// Parameters the IDP needs for an authorization code exchange
const REQUIRED_PARAMS: [&str; 5] = [
    "grant_type",
    "client_id",
    "client_secret",
    "code",
    REDIRECT_URI,
];

const MISSING_PARAMS: &str = "Missing required parameters for token exchange.";

/// Exchanges an authorization code at the IDP token endpoint
#[utoipa::path(
    post,
    path = "/token",
    tag = RELAY_TAG,
    request_body(
        content_type = "application/x-www-form-urlencoded",
        description = "grant_type, client_id, client_secret, code and redirect_uri; redirect_uri is replaced by the proxy callback",
    ),
    responses(
        (status = 200, description = "Token response of the IDP, relayed unchanged"),
        (status = 400, description = "Missing required parameters", body = ErrorBody),
        (status = 500, description = "The IDP token endpoint could not be reached", body = ErrorBody),
    )
)]
pub(crate) async fn token(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let params = match parse_body(&headers, &body) {
        Ok(params) => params,
        Err(err) => return err.into_response(),
    };

    let params = rewrite(params, &state.config.proxy_redirect_uri);
    if let Some(missing) = REQUIRED_PARAMS
        .iter()
        .find(|key| !params.has_non_empty(key))
    {
        warn!("Rejecting token request, missing parameter '{}'", missing);
        return ApiError::invalid_request(MISSING_PARAMS).into_response();
    }

    // client_secret must never reach the logs
    info!(
        "Exchanging code for client '{}' with grant_type '{}'",
        params.get("client_id").unwrap_or_default(),
        params.get("grant_type").unwrap_or_default()
    );

    let url = &state.config.token_endpoint_url;
    match state.upstream.post_form(url, params.to_form_string()).await {
        Ok(upstream) => {
            if !upstream.status.is_success() {
                warn!("IDP token endpoint answered with status {}", upstream.status);
            }
            let mut response = relay_response(upstream);
            presets::no_store().apply(&mut response);
            response
        }
        Err(err) => {
            error!("Token exchange failed: {}", err);
            err.into_api_error("Failed to communicate with upstream token endpoint")
                .into_response()
        }
    }
}

/// Reads a form body, or a JSON object of scalar values
fn parse_body(headers: &HeaderMap, body: &Bytes) -> Result<ParameterBag, ApiError> {
    let is_json = headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.trim_start().starts_with("application/json"));

    if !is_json {
        return Ok(ParameterBag::parse(body));
    }

    let Ok(Value::Object(object)) = serde_json::from_slice::<Value>(body) else {
        return Err(ApiError::invalid_request(
            "Request body must be a form or a JSON object.",
        ));
    };

    let mut params = ParameterBag::new();
    for (key, value) in object {
        match value {
            Value::String(value) => params.push(key, value),
            Value::Number(value) => params.push(key, value.to_string()),
            Value::Bool(value) => params.push(key, value.to_string()),
            Value::Array(values) => {
                for value in values {
                    match value {
                        Value::String(value) => params.push(key.clone(), value),
                        Value::Number(_) | Value::Bool(_) => {
                            params.push(key.clone(), value.to_string())
                        }
                        _ => {}
                    }
                }
            }
            Value::Null | Value::Object(_) => {}
        }
    }
    Ok(params)
}
