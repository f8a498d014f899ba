use crate::handlers::auth_handler::{self, AppState};
use crate::handlers::{health_handler, jwks_handler, metrics_handler};
use crate::middleware::http_metrics::http_metrics_middleware;
use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

pub use crate::observability::metrics::init_metrics_recorder;

/// Build the application routes.
///
/// - `GET /jwks`, `GET /.well-known/jwks.json` - published public keys
/// - `POST /auth` - token issuance
/// - `GET /health`, `GET /ready` - probes
/// - `GET /metrics` - Prometheus scrape
///
/// Other methods on these paths get 405 from the method router.
pub fn build_routes(state: Arc<AppState>, metrics_handle: PrometheusHandle) -> Router {
    let app_routes = Router::new()
        .route("/jwks", get(jwks_handler::handle_get_jwks))
        .route("/.well-known/jwks.json", get(jwks_handler::handle_get_jwks))
        .route("/auth", post(auth_handler::handle_auth))
        .route("/health", get(health_handler::health_check))
        .route("/ready", get(health_handler::readiness_check))
        .with_state(state);

    let metrics_routes = Router::new()
        .route("/metrics", get(metrics_handler::metrics_handler))
        .with_state(metrics_handle);

    // Layer order (bottom-to-top execution):
    // 1. TimeoutLayer - Timeout the request (innermost)
    // 2. TraceLayer - Log request details
    // 3. http_metrics_middleware - Record ALL responses (outermost)
    app_routes
        .merge(metrics_routes)
        .layer(TimeoutLayer::new(Duration::from_secs(10)))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(http_metrics_middleware))
}
