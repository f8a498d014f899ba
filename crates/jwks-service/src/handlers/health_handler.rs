use crate::models::ReadyResponse;
use axum::{extract::State, http::StatusCode, Json};
use chrono::Utc;
use std::sync::Arc;
use tracing::instrument;

use super::auth_handler::AppState;

/// Liveness probe
///
/// GET /health
pub async fn health_check() -> &'static str {
    "OK"
}

/// Readiness probe
///
/// GET /ready
///
/// Ready while at least one unexpired key can sign tokens. Keys are never
/// rotated in, so once the valid key lapses the instance stays not-ready.
#[instrument(name = "jwks.health.ready", skip_all)]
pub async fn readiness_check(
    State(state): State<Arc<AppState>>,
) -> (StatusCode, Json<ReadyResponse>) {
    let signing_keys = state.key_store.list_unexpired(Utc::now()).len();

    if signing_keys > 0 {
        (
            StatusCode::OK,
            Json(ReadyResponse {
                status: "ready".to_string(),
                signing_keys,
            }),
        )
    } else {
        tracing::warn!(target: "jwks.health", "No unexpired signing key, reporting not ready");
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ReadyResponse {
                status: "not_ready".to_string(),
                signing_keys,
            }),
        )
    }
}
