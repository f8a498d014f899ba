use crate::config::{parse_bool, Config};
use crate::errors::JwksError;
use crate::models::{KeyClass, TokenResponse};
use crate::observability::metrics::record_token_issuance;
use crate::repositories::KeyStore;
use crate::services::TokenIssuer;
use axum::{
    extract::{rejection::QueryRejection, Query, State},
    Json,
};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Instant;
use tracing::instrument;

/// Application state shared across handlers
///
/// The key store is seeded before this is built and is read-only afterwards.
#[derive(Debug, Clone)]
pub struct AppState {
    pub key_store: Arc<KeyStore>,
    pub token_issuer: TokenIssuer,
    pub config: Config,
}

impl AppState {
    pub fn new(key_store: KeyStore, config: Config) -> Self {
        let key_store = Arc::new(key_store);
        let token_issuer = TokenIssuer::from_config(Arc::clone(&key_store), &config);
        Self {
            key_store,
            token_issuer,
            config,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct AuthQuery {
    pub expired: Option<String>,
}

/// `expired` must be `true` or `false` (any case); absent means `false`.
pub fn parse_expired_flag(raw: Option<&str>) -> Result<bool, JwksError> {
    match raw {
        None => Ok(false),
        Some(value) => parse_bool(value).ok_or_else(|| {
            JwksError::InvalidRequest(format!(
                "Query parameter 'expired' must be 'true' or 'false', got '{}'",
                value
            ))
        }),
    }
}

/// Handle token request
///
/// POST /auth?expired={true|false}
#[instrument(name = "jwks.auth.token", skip_all, fields(class, kid, status))]
pub async fn handle_auth(
    State(state): State<Arc<AppState>>,
    query: Result<Query<AuthQuery>, QueryRejection>,
) -> Result<Json<TokenResponse>, JwksError> {
    // Malformed query strings (e.g. a repeated `expired`) use the JSON error body too
    let Query(params) =
        query.map_err(|rejection| JwksError::InvalidRequest(rejection.body_text()))?;
    let want_expired = parse_expired_flag(params.expired.as_deref())?;
    let class = KeyClass::from_want_expired(want_expired);
    let span = tracing::Span::current();
    span.record("class", class.as_str());

    let start = Instant::now();
    let result = state.token_issuer.issue(want_expired);
    let status = if result.is_ok() { "success" } else { "error" };
    record_token_issuance(class, status, start.elapsed());
    span.record("status", status);

    let issued = result?;
    span.record("kid", issued.kid.as_str());
    tracing::debug!(target: "jwks.auth", kid = %issued.kid, exp = issued.exp, "Issued token");

    Ok(Json(TokenResponse {
        token: issued.token,
    }))
}
