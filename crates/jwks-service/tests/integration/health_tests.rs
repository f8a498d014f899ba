//! Integration tests for health probes and metrics
//!
//! Readiness tracks whether an unexpired signing key exists.

use chrono::{Duration, Utc};
use jwks_service::repositories::KeyStore;
use jwks_test_utils::{seeded_store, test_private_key, TestJwksServer};
use reqwest::StatusCode;

/// Test /health returns 200 OK
#[tokio::test]
async fn test_health_endpoint_returns_ok() -> Result<(), anyhow::Error> {
    // Arrange
    let server = TestJwksServer::spawn(seeded_store(Duration::days(1), Duration::days(1))?).await?;

    // Act
    let response = server
        .client()
        .get(format!("{}/health", server.url()))
        .send()
        .await?;

    // Assert
    assert_eq!(
        response.status(),
        StatusCode::OK,
        "Health check should return 200 OK"
    );

    let body = response.text().await?;
    assert_eq!(body, "OK", "Health check body should be 'OK'");

    Ok(())
}

/// Test /ready returns 200 while a valid signing key exists
#[tokio::test]
async fn test_ready_endpoint_returns_ok_when_healthy() -> Result<(), anyhow::Error> {
    let server = TestJwksServer::spawn(seeded_store(Duration::days(1), Duration::days(1))?).await?;

    let response = server
        .client()
        .get(format!("{}/ready", server.url()))
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::OK);

    let body: serde_json::Value = response.json().await?;
    assert_eq!(body["status"].as_str(), Some("ready"));
    assert_eq!(
        body["signing_keys"].as_u64(),
        Some(1),
        "Only the unexpired key counts"
    );

    Ok(())
}

/// Test /ready returns 503 once no key can sign valid tokens
#[tokio::test]
async fn test_ready_endpoint_returns_503_without_valid_key() -> Result<(), anyhow::Error> {
    let mut store = KeyStore::new("key");
    store.insert_key(&test_private_key(2)?, Utc::now() - Duration::hours(1))?;
    let server = TestJwksServer::spawn(store).await?;

    let response = server
        .client()
        .get(format!("{}/ready", server.url()))
        .send()
        .await?;

    assert_eq!(
        response.status(),
        StatusCode::SERVICE_UNAVAILABLE,
        "Readiness should fail with no valid key"
    );

    let body: serde_json::Value = response.json().await?;
    assert_eq!(body["status"].as_str(), Some("not_ready"));
    assert_eq!(body["signing_keys"].as_u64(), Some(0));

    Ok(())
}

/// Test /metrics is reachable
#[tokio::test]
async fn test_metrics_endpoint_returns_ok() -> Result<(), anyhow::Error> {
    let server = TestJwksServer::spawn(seeded_store(Duration::days(1), Duration::days(1))?).await?;

    server.fetch_token(false).await?;
    let response = server
        .client()
        .get(format!("{}/metrics", server.url()))
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::OK);

    Ok(())
}
