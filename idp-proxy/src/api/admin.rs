use crate::errors::{ApiError, ErrorBody};
use crate::hierarchy::HierarchyConfig;
use crate::openapi::ADMIN_TAG;
use crate::state::AppState;
use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::Json;
use log::{error, info};

/// Returns the hierarchy configuration currently in effect
#[utoipa::path(
    get,
    path = "/admin/hierarchy-config",
    tag = ADMIN_TAG,
    params(
        ("Authorization" = String, Header, description = "Bearer admin API key"),
    ),
    responses(
        (status = 200, description = "Current hierarchy configuration", body = HierarchyConfig),
        (status = 401, description = "Missing Authorization header", body = ErrorBody),
        (status = 403, description = "Invalid admin API key", body = ErrorBody),
    )
)]
pub(crate) async fn get_hierarchy_config(State(state): State<AppState>) -> Response {
    let snapshot = state.hierarchy.snapshot().await;
    Json(snapshot.config().as_ref()).into_response()
}

/// Replaces the hierarchy configuration on disk
#[utoipa::path(
    put,
    path = "/admin/hierarchy-config",
    tag = ADMIN_TAG,
    request_body = HierarchyConfig,
    params(
        ("Authorization" = String, Header, description = "Bearer admin API key"),
    ),
    responses(
        (status = 200, description = "The saved hierarchy configuration", body = HierarchyConfig),
        (status = 401, description = "Missing Authorization header", body = ErrorBody),
        (status = 403, description = "Invalid admin API key", body = ErrorBody),
        (status = 422, description = "Invalid configuration payload"),
        (status = 500, description = "The configuration could not be saved", body = ErrorBody),
    )
)]
pub(crate) async fn put_hierarchy_config(
    State(state): State<AppState>,
    Json(config): Json<HierarchyConfig>,
) -> Response {
    match state.hierarchy.save(&config).await {
        Ok(()) => {
            info!(
                "Hierarchy config updated with {} group mappings",
                config.groups.len()
            );
            Json(config).into_response()
        }
        Err(err) => {
            error!("Failed to save hierarchy config: {}", err);
            ApiError::proxy_internal("Failed to save hierarchy configuration.").into_response()
        }
    }
}
