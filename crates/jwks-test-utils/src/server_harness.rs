//! Test server harness for E2E testing
//!
//! Provides TestJwksServer for spawning real JWKS server instances in tests.

use crate::crypto_fixtures::test_config;
use jwks_service::config::Config;
use jwks_service::handlers::auth_handler::AppState;
use jwks_service::models::{Jwks, TokenResponse};
use jwks_service::repositories::KeyStore;
use jwks_service::routes;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::net::SocketAddr;
use std::sync::{Arc, OnceLock};
use tokio::task::JoinHandle;

/// Test harness for spawning the JWKS server in E2E tests
///
/// # Example
/// ```rust,ignore
/// #[tokio::test]
/// async fn test_jwks_e2e() -> Result<()> {
///     let store = seeded_store(Duration::days(1), Duration::days(1))?;
///     let server = TestJwksServer::spawn(store).await?;
///
///     let response = reqwest::get(format!("{}/.well-known/jwks.json", server.url())).await?;
///
///     assert_eq!(response.status(), 200);
///     Ok(())
/// }
/// ```
pub struct TestJwksServer {
    addr: SocketAddr,
    state: Arc<AppState>,
    client: reqwest::Client,
    _handle: JoinHandle<()>,
}

/// The global recorder can be installed once per process; later servers
/// share the handle.
fn metrics_handle() -> PrometheusHandle {
    static HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();
    HANDLE
        .get_or_init(|| match routes::init_metrics_recorder() {
            Ok(handle) => handle,
            Err(_) => PrometheusBuilder::new().build_recorder().handle(),
        })
        .clone()
}

impl TestJwksServer {
    /// Spawn a server over an already seeded key store with default config
    ///
    /// The server will:
    /// - Bind to a random available port (127.0.0.1:0)
    /// - Serve `store` exactly as given, without generating keys
    /// - Start the HTTP server in the background
    pub async fn spawn(store: KeyStore) -> Result<Self, anyhow::Error> {
        Self::spawn_with_config(store, test_config()).await
    }

    pub async fn spawn_with_config(store: KeyStore, config: Config) -> Result<Self, anyhow::Error> {
        let state = Arc::new(AppState::new(store, config));

        // Build routes using jwks-service's real route builder
        let app = routes::build_routes(Arc::clone(&state), metrics_handle());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .map_err(|e| anyhow::anyhow!("Failed to bind test server: {}", e))?;

        let addr = listener
            .local_addr()
            .map_err(|e| anyhow::anyhow!("Failed to get local address: {}", e))?;

        let handle = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                eprintln!("Test server error: {}", e);
            }
        });

        Ok(Self {
            addr,
            state,
            client: reqwest::Client::new(),
            _handle: handle,
        })
    }

    /// Get the base URL of the test server
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// The store the server is serving from
    pub fn key_store(&self) -> &KeyStore {
        &self.state.key_store
    }

    /// Get reference to the server configuration
    pub fn config(&self) -> &Config {
        &self.state.config
    }

    pub fn client(&self) -> &reqwest::Client {
        &self.client
    }

    /// GET /.well-known/jwks.json, failing on any non-200 response
    pub async fn fetch_jwks(&self) -> Result<Jwks, anyhow::Error> {
        let response = self
            .client
            .get(format!("{}/.well-known/jwks.json", self.url()))
            .send()
            .await?
            .error_for_status()?;

        Ok(response.json().await?)
    }

    /// POST /auth, optionally with `?expired=true`, failing on any non-200 response
    pub async fn fetch_token(&self, expired: bool) -> Result<String, anyhow::Error> {
        let url = if expired {
            format!("{}/auth?expired=true", self.url())
        } else {
            format!("{}/auth", self.url())
        };

        let response = self.client.post(url).send().await?.error_for_status()?;
        let body: TokenResponse = response.json().await?;

        Ok(body.token)
    }
}

impl Drop for TestJwksServer {
    fn drop(&mut self) {
        // Abort the background server task when test completes
        self._handle.abort();
    }
}
