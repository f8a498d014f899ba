//! Metrics definitions for the JWKS service.
//!
//! All metrics follow Prometheus naming conventions:
//! - `jwks_` prefix
//! - `_total` suffix for counters
//! - `_seconds` suffix for duration histograms
//!
//! # Cardinality
//!
//! Labels are bounded:
//! - `class`: 2 values (valid, expired)
//! - `status`: 2 values (success, error)
//! - `error_category`: 3 values (client, key_material, internal)
//! - `path`: the served routes plus `other`

use crate::models::KeyClass;
use crate::observability::ErrorCategory;
use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};
use std::time::Duration;

/// Install the Prometheus recorder and return the handle that renders `/metrics`.
///
/// # Errors
///
/// Returns error if the recorder fails to install (e.g., already installed).
pub fn init_metrics_recorder() -> Result<PrometheusHandle, String> {
    PrometheusBuilder::new()
        // RS256 signing is sub-millisecond to a few milliseconds
        .set_buckets_for_metric(
            Matcher::Prefix("jwks_token_issuance".to_string()),
            &[
                0.0005, 0.001, 0.002, 0.005, 0.010, 0.025, 0.050, 0.100,
            ],
        )
        .map_err(|e| format!("Failed to set token issuance buckets: {e}"))?
        .set_buckets_for_metric(
            Matcher::Prefix("jwks_http_request".to_string()),
            &[0.001, 0.005, 0.010, 0.025, 0.050, 0.100, 0.250, 0.500, 1.000],
        )
        .map_err(|e| format!("Failed to set HTTP request buckets: {e}"))?
        .install_recorder()
        .map_err(|e| format!("Failed to install Prometheus recorder: {e}"))
}

// ============================================================================
// Token Metrics
// ============================================================================

/// Record token issuance duration and outcome
///
/// Metric: `jwks_token_issuance_duration_seconds`, `jwks_token_issuance_total`
/// Labels: `class`, `status`
pub fn record_token_issuance(class: KeyClass, status: &str, duration: Duration) {
    histogram!("jwks_token_issuance_duration_seconds",
        "class" => class.as_str(),
        "status" => status.to_string()
    )
    .record(duration.as_secs_f64());

    counter!("jwks_token_issuance_total", "class" => class.as_str(), "status" => status.to_string())
        .increment(1);
}

// ============================================================================
// Key Metrics
// ============================================================================

/// Record a signing key added at seed time
///
/// Metric: `jwks_signing_keys_generated_total`
/// Labels: `class`
pub fn record_signing_key_generated(class: KeyClass) {
    counter!("jwks_signing_keys_generated_total", "class" => class.as_str()).increment(1);
}

/// Record a JWKS fetch
///
/// Metric: `jwks_requests_total`
/// Labels: `status`
pub fn record_jwks_request(status: &str) {
    counter!("jwks_requests_total", "status" => status.to_string()).increment(1);
}

/// Number of keys in the most recently served JWKS
///
/// Metric: `jwks_published_keys`
pub fn set_published_keys(count: usize) {
    gauge!("jwks_published_keys").set(count as f64);
}

// ============================================================================
// Error Metrics
// ============================================================================

/// Record an error response by category
///
/// Metric: `jwks_errors_total`
/// Labels: `error_category`
pub fn record_error(category: ErrorCategory) {
    counter!("jwks_errors_total", "error_category" => category.as_str()).increment(1);
}

// ============================================================================
// HTTP Request Metrics
// ============================================================================

/// Record HTTP request completion, including framework-level 404/405s
///
/// Metric: `jwks_http_requests_total`, `jwks_http_request_duration_seconds`
/// Labels: `method`, `path`, `status_code`
pub fn record_http_request(method: &str, path: &str, status_code: u16, duration: Duration) {
    let path = normalize_path(path);

    histogram!("jwks_http_request_duration_seconds",
        "method" => method.to_string(),
        "path" => path,
        "status_code" => status_code.to_string()
    )
    .record(duration.as_secs_f64());

    counter!("jwks_http_requests_total",
        "method" => method.to_string(),
        "path" => path,
        "status_code" => status_code.to_string()
    )
    .increment(1);
}

/// Collapse unknown paths so scanners cannot blow up label cardinality.
fn normalize_path(path: &str) -> &'static str {
    match path {
        "/jwks" => "/jwks",
        "/.well-known/jwks.json" => "/.well-known/jwks.json",
        "/auth" => "/auth",
        "/health" => "/health",
        "/ready" => "/ready",
        "/metrics" => "/metrics",
        _ => "other",
    }
}
