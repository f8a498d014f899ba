//! Integration tests for JWKS publication
//!
//! Only unexpired keys are published, on both JWKS paths, and only GET is
//! accepted.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::indexing_slicing)]

use chrono::{Duration, Utc};
use jwks_service::models::Jwks;
use jwks_test_utils::{seeded_store, store_without_expired_key, TestJwksServer};
use reqwest::{header::CACHE_CONTROL, Method, StatusCode};

#[tokio::test]
async fn test_jwks_publishes_only_unexpired_key() -> Result<(), anyhow::Error> {
    // Arrange: key-1 valid for a day, key-2 expired a day ago
    let server = TestJwksServer::spawn(seeded_store(Duration::days(1), Duration::days(1))?).await?;

    // Act
    let jwks = server.fetch_jwks().await?;

    // Assert
    assert_eq!(jwks.keys.len(), 1, "Exactly one key should be published");
    let key = &jwks.keys[0];
    assert_eq!(key.kid, "key-1");
    assert_eq!(key.kty, "RSA");
    assert_eq!(key.use_, "sig");
    assert_eq!(key.alg, "RS256");
    assert_eq!(key.e, "AQAB");
    assert!(!key.n.is_empty());
    assert!(
        jwks.find("key-2").is_none(),
        "Expired key must not be published"
    );

    Ok(())
}

#[tokio::test]
async fn test_both_jwks_paths_serve_identical_sets() -> Result<(), anyhow::Error> {
    let server = TestJwksServer::spawn(seeded_store(Duration::days(1), Duration::days(1))?).await?;

    let short: Jwks = server
        .client()
        .get(format!("{}/jwks", server.url()))
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;
    let well_known = server.fetch_jwks().await?;

    assert_eq!(short, well_known);

    Ok(())
}

#[tokio::test]
async fn test_jwks_wire_format() -> Result<(), anyhow::Error> {
    let server = TestJwksServer::spawn(store_without_expired_key(Duration::days(1))?).await?;

    let response = server
        .client()
        .get(format!("{}/.well-known/jwks.json", server.url()))
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::OK);
    let body: serde_json::Value = response.json().await?;
    let key = &body["keys"][0];
    assert_eq!(key["use"], "sig", "JWK field must be serialized as 'use'");
    assert!(key.get("use_").is_none());
    for field in ["kid", "kty", "alg", "n", "e"] {
        assert!(key[field].is_string(), "JWK must carry '{}'", field);
    }

    Ok(())
}

#[tokio::test]
async fn test_jwks_cache_control() -> Result<(), anyhow::Error> {
    let server = TestJwksServer::spawn(seeded_store(Duration::days(1), Duration::days(1))?).await?;

    let response = server
        .client()
        .get(format!("{}/jwks", server.url()))
        .send()
        .await?;

    assert_eq!(
        response.headers()[CACHE_CONTROL],
        "public, max-age=60",
        "max-age should be capped by configuration"
    );

    Ok(())
}

#[tokio::test]
async fn test_jwks_cache_control_bounded_by_key_expiry() -> Result<(), anyhow::Error> {
    let server = TestJwksServer::spawn(store_without_expired_key(Duration::seconds(20))?).await?;

    let response = server
        .client()
        .get(format!("{}/jwks", server.url()))
        .send()
        .await?;

    let header = response.headers()[CACHE_CONTROL].to_str()?.to_string();
    let max_age: u64 = header
        .strip_prefix("public, max-age=")
        .expect("Cache-Control should carry max-age")
        .parse()?;
    assert!(
        max_age <= 20,
        "max-age {} must not outlive the key",
        max_age
    );

    Ok(())
}

#[tokio::test]
async fn test_jwks_empty_when_every_key_expired() -> Result<(), anyhow::Error> {
    let store = {
        let mut store = jwks_service::repositories::KeyStore::new("key");
        store
            .insert_key(
                &jwks_test_utils::test_private_key(1)?,
                Utc::now() - Duration::minutes(1),
            )
            .unwrap();
        store
    };
    let server = TestJwksServer::spawn(store).await?;

    let jwks = server.fetch_jwks().await?;

    assert!(jwks.keys.is_empty());

    Ok(())
}

#[tokio::test]
async fn test_jwks_rejects_non_get_methods() -> Result<(), anyhow::Error> {
    let server = TestJwksServer::spawn(seeded_store(Duration::days(1), Duration::days(1))?).await?;

    for path in ["/jwks", "/.well-known/jwks.json"] {
        for method in [Method::POST, Method::PUT, Method::DELETE, Method::PATCH] {
            let response = server
                .client()
                .request(method.clone(), format!("{}{}", server.url(), path))
                .send()
                .await?;

            assert_eq!(
                response.status(),
                StatusCode::METHOD_NOT_ALLOWED,
                "{} {} should be rejected",
                method,
                path
            );
        }
    }

    Ok(())
}

#[tokio::test]
async fn test_unknown_path_returns_404() -> Result<(), anyhow::Error> {
    let server = TestJwksServer::spawn(seeded_store(Duration::days(1), Duration::days(1))?).await?;

    let response = server
        .client()
        .get(format!("{}/invalid", server.url()))
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    Ok(())
}
