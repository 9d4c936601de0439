use crate::api::found;
use crate::openapi::RELAY_TAG;
use crate::rewrite::{append_query, rewrite, ParameterBag, REDIRECT_URI};
use crate::state::AppState;
use axum::extract::{RawQuery, State};
use axum::response::Response;
use log::{debug, info};

/// Forwards the authorization request to the IDP with the proxy's callback
#[utoipa::path(
    get,
    path = "/authenticate",
    tag = RELAY_TAG,
    params(
        ("redirect_uri" = Option<String>, Query, description = "Ignored, replaced by the proxy callback"),
    ),
    responses(
        (status = 302, description = "Redirect to the IDP authorize endpoint with all other parameters preserved"),
    )
)]
pub(crate) async fn authenticate(
    State(state): State<AppState>,
    RawQuery(query): RawQuery,
) -> Response {
    let params = ParameterBag::parse(query.as_deref().unwrap_or_default());
    debug!(
        "Authorize request with {} parameters, original redirect_uri: {:?}",
        params.len(),
        params.get(REDIRECT_URI)
    );

    let rewritten = rewrite(params, &state.config.proxy_redirect_uri);
    info!(
        "Redirecting to IDP authorize endpoint with redirect_uri {}",
        state.config.proxy_redirect_uri
    );
    found(append_query(&state.config.authorize_base_url, &rewritten))
}
