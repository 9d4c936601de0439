use crate::api::found;
use crate::openapi::RELAY_TAG;
use crate::rewrite::{append_query, ParameterBag};
use crate::state::AppState;
use axum::extract::{RawQuery, State};
use axum::response::Response;
use log::info;

/// Sends the IDP's answer (code or error) on to the application unchanged
#[utoipa::path(
    get,
    path = "/callback",
    tag = RELAY_TAG,
    responses(
        (status = 302, description = "Redirect to the application with the same query parameters"),
    )
)]
pub(crate) async fn callback(
    State(state): State<AppState>,
    RawQuery(query): RawQuery,
) -> Response {
    let params = ParameterBag::parse(query.as_deref().unwrap_or_default());
    info!(
        "Relaying IDP callback with {} parameters to the application",
        params.len()
    );
    found(append_query(&state.config.final_app_redirect_url, &params))
}
