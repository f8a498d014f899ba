use crate::errors::JwksError;
use crate::models::Jwks;
use crate::observability::metrics::{record_jwks_request, set_published_keys};
use crate::services::key_management_service;
use axum::{
    extract::State,
    http::header::{HeaderMap, HeaderValue, CACHE_CONTROL},
    Json,
};
use chrono::Utc;
use std::sync::Arc;
use tracing::instrument;

use super::auth_handler::AppState;

/// Handle JWKS request
///
/// GET /jwks and GET /.well-known/jwks.json
///
/// Returns every unexpired public key in JWKS format (RFC 7517). The
/// `Cache-Control` max-age never reaches past the soonest key expiry, so a
/// cached response cannot keep serving an expired key.
#[instrument(name = "jwks.jwks.get", skip_all, fields(keys, status))]
pub async fn handle_get_jwks(
    State(state): State<Arc<AppState>>,
) -> Result<(HeaderMap, Json<Jwks>), JwksError> {
    let now = Utc::now();
    let result = key_management_service::get_jwks(&state.key_store, now);

    let status = if result.is_ok() { "success" } else { "error" };
    tracing::Span::current().record("status", status);
    record_jwks_request(status);

    let jwks = result?;
    tracing::Span::current().record("keys", jwks.keys.len());
    set_published_keys(jwks.keys.len());

    let max_age = key_management_service::jwks_cache_max_age(
        &state.key_store,
        now,
        state.config.jwks_cache_max_age_seconds,
    );
    let cache_control = HeaderValue::from_str(&format!("public, max-age={}", max_age))
        .unwrap_or_else(|_| HeaderValue::from_static("no-store"));

    let mut headers = HeaderMap::new();
    headers.insert(CACHE_CONTROL, cache_control);

    Ok((headers, Json(jwks)))
}
