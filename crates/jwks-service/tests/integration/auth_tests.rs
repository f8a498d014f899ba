//! Integration tests for token issuance on POST /auth

#![allow(clippy::unwrap_used, clippy::expect_used)]

use chrono::Duration;
use jwks_service::services::token_service::TOKEN_EXPIRY_SECONDS;
use jwks_test_utils::{seeded_store, store_without_expired_key, TestJwksServer, TokenAssertions};
use reqwest::{Method, StatusCode};

#[tokio::test]
async fn test_auth_issues_valid_token() -> Result<(), anyhow::Error> {
    let server = TestJwksServer::spawn(seeded_store(Duration::days(1), Duration::days(1))?).await?;

    let token = server.fetch_token(false).await?;

    token
        .assert_valid_jwt()
        .assert_signed_by("key-1")
        .assert_for_subject("test-user")
        .assert_expires_in(TOKEN_EXPIRY_SECONDS);

    Ok(())
}

#[tokio::test]
async fn test_auth_issues_expired_token() -> Result<(), anyhow::Error> {
    let server = TestJwksServer::spawn(seeded_store(Duration::days(1), Duration::days(1))?).await?;

    let token = server.fetch_token(true).await?;

    token
        .assert_valid_jwt()
        .assert_signed_by("key-2")
        .assert_expired()
        .assert_expires_in(-TOKEN_EXPIRY_SECONDS);

    Ok(())
}

#[tokio::test]
async fn test_auth_expired_flag_is_case_insensitive() -> Result<(), anyhow::Error> {
    let server = TestJwksServer::spawn(seeded_store(Duration::days(1), Duration::days(1))?).await?;

    let cases = [
        ("TRUE", "key-2"),
        ("True", "key-2"),
        ("false", "key-1"),
        ("FALSE", "key-1"),
    ];
    for (value, kid) in cases {
        let response = server
            .client()
            .post(format!("{}/auth?expired={}", server.url(), value))
            .send()
            .await?;

        assert_eq!(response.status(), StatusCode::OK, "expired={}", value);
        let body: serde_json::Value = response.json().await?;
        body["token"]
            .as_str()
            .expect("token field")
            .to_string()
            .assert_signed_by(kid);
    }

    Ok(())
}

#[tokio::test]
async fn test_auth_rejects_invalid_expired_flag() -> Result<(), anyhow::Error> {
    let server = TestJwksServer::spawn(seeded_store(Duration::days(1), Duration::days(1))?).await?;

    for value in ["yes", "1", ""] {
        let response = server
            .client()
            .post(format!("{}/auth?expired={}", server.url(), value))
            .send()
            .await?;

        assert_eq!(
            response.status(),
            StatusCode::BAD_REQUEST,
            "expired='{}' should be rejected",
            value
        );
        let body: serde_json::Value = response.json().await?;
        assert!(body["error"].is_string());
    }

    Ok(())
}

#[tokio::test]
async fn test_auth_repeated_expired_flag_returns_json_error() -> Result<(), anyhow::Error> {
    let server = TestJwksServer::spawn(seeded_store(Duration::days(1), Duration::days(1))?).await?;

    let response = server
        .client()
        .post(format!("{}/auth?expired=true&expired=false", server.url()))
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = response.json().await?;
    assert!(
        body["error"].is_string(),
        "expected JSON error body, got {}",
        body
    );

    Ok(())
}

#[tokio::test]
async fn test_auth_without_expired_key_returns_400() -> Result<(), anyhow::Error> {
    let server = TestJwksServer::spawn(store_without_expired_key(Duration::days(1))?).await?;

    let response = server
        .client()
        .post(format!("{}/auth?expired=true", server.url()))
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = response.json().await?;
    assert_eq!(
        body,
        serde_json::json!({"error": "No expired signing key available"})
    );

    // The valid path is unaffected
    server.fetch_token(false).await?.assert_signed_by("key-1");

    Ok(())
}

#[tokio::test]
async fn test_auth_rejects_non_post_methods() -> Result<(), anyhow::Error> {
    let server = TestJwksServer::spawn(seeded_store(Duration::days(1), Duration::days(1))?).await?;

    for method in [Method::GET, Method::PUT, Method::DELETE, Method::PATCH] {
        let response = server
            .client()
            .request(method.clone(), format!("{}/auth", server.url()))
            .send()
            .await?;

        assert_eq!(
            response.status(),
            StatusCode::METHOD_NOT_ALLOWED,
            "{} /auth should be rejected",
            method
        );
    }

    Ok(())
}

#[tokio::test]
async fn test_auth_does_not_add_keys() -> Result<(), anyhow::Error> {
    let server = TestJwksServer::spawn(seeded_store(Duration::days(1), Duration::days(1))?).await?;

    for expired in [false, true, false] {
        server.fetch_token(expired).await?;
    }

    assert_eq!(server.key_store().len(), 2);
    assert_eq!(server.fetch_jwks().await?.keys.len(), 1);

    Ok(())
}
