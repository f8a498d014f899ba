//! Custom test assertions for expressive tests
//!
//! Provides trait-based assertions for token validation.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use jwks_service::crypto;
use jwks_service::models::Jwks;
use serde::Deserialize;

/// JWT header structure
#[derive(Debug, Deserialize)]
struct JwtHeader {
    pub alg: String,
    pub typ: String,
    #[serde(default)]
    pub kid: Option<String>,
}

/// JWT claims structure
#[derive(Debug, Deserialize)]
struct JwtClaims {
    pub sub: String,
    pub exp: i64,
    pub iat: i64,
    pub kid: String,
}

fn decode_segment<T: serde::de::DeserializeOwned>(token: &str, index: usize, what: &str) -> T {
    let segment = token
        .split('.')
        .nth(index)
        .unwrap_or_else(|| panic!("JWT has no {} segment", what));
    let bytes = URL_SAFE_NO_PAD
        .decode(segment)
        .unwrap_or_else(|e| panic!("Failed to base64 decode JWT {}: {}", what, e));
    serde_json::from_slice(&bytes)
        .unwrap_or_else(|e| panic!("Failed to parse JWT {} JSON: {}", what, e))
}

fn header(token: &str) -> JwtHeader {
    decode_segment(token, 0, "header")
}

fn claims(token: &str) -> JwtClaims {
    decode_segment(token, 1, "payload")
}

/// Custom assertions for issued tokens
///
/// # Example
/// ```rust,ignore
/// token
///     .assert_valid_jwt()
///     .assert_signed_by("key-1")
///     .assert_expires_in(300)
///     .assert_verifies_with(&jwks);
/// ```
pub trait TokenAssertions {
    /// Assert that the token is a well-formed RS256 JWT carrying a kid
    fn assert_valid_jwt(&self) -> &Self;

    /// Assert that the header and claims both name the specified key
    fn assert_signed_by(&self, key_id: &str) -> &Self;

    /// Assert that the token expires within 5 seconds of `seconds` from now
    fn assert_expires_in(&self, seconds: i64) -> &Self;

    /// Assert that the token's `exp` is already in the past
    fn assert_expired(&self) -> &Self;

    /// Assert that the token is for the specified subject
    fn assert_for_subject(&self, subject: &str) -> &Self;

    /// Assert that the signature verifies against a published key and `exp` holds
    fn assert_verifies_with(&self, jwks: &Jwks) -> &Self;

    /// Assert that no published key accepts the token
    fn assert_rejected_by(&self, jwks: &Jwks) -> &Self;
}

impl TokenAssertions for String {
    fn assert_valid_jwt(&self) -> &Self {
        let parts = self.split('.').count();
        assert_eq!(
            parts, 3,
            "JWT must have 3 parts (header.payload.signature), got {}",
            parts
        );

        let header = header(self);
        assert_eq!(header.alg, "RS256", "Expected RS256 algorithm");
        assert_eq!(header.typ, "JWT", "Expected JWT type");
        assert!(header.kid.is_some(), "JWT header must carry a kid");

        let claims = claims(self);
        assert!(claims.iat > 0, "iat must be set");

        self
    }

    fn assert_signed_by(&self, key_id: &str) -> &Self {
        let header = header(self);
        assert_eq!(
            header.kid.as_deref(),
            Some(key_id),
            "Expected key_id '{}', got {:?}",
            key_id,
            header.kid
        );

        let claims = claims(self);
        assert_eq!(
            claims.kid, key_id,
            "Expected kid claim '{}', got '{}'",
            key_id, claims.kid
        );

        self
    }

    fn assert_expires_in(&self, seconds: i64) -> &Self {
        let claims = claims(self);
        let now = chrono::Utc::now().timestamp();
        let expires_in = claims.exp - now;

        // Allow 5-second tolerance for slow test runs
        assert!(
            (expires_in - seconds).abs() <= 5,
            "Expected token to expire in {} seconds, but expires in {} seconds",
            seconds,
            expires_in
        );

        self
    }

    fn assert_expired(&self) -> &Self {
        let claims = claims(self);
        let now = chrono::Utc::now().timestamp();
        assert!(
            claims.exp < now,
            "Expected exp in the past, got {} (now {})",
            claims.exp,
            now
        );

        self
    }

    fn assert_for_subject(&self, subject: &str) -> &Self {
        let claims = claims(self);
        assert_eq!(
            claims.sub, subject,
            "Expected subject '{}', got '{}'",
            subject, claims.sub
        );

        self
    }

    fn assert_verifies_with(&self, jwks: &Jwks) -> &Self {
        if let Err(e) = crypto::verify::verify_with_jwks(self, jwks, true) {
            panic!("Token did not verify against JWKS: {}", e);
        }

        self
    }

    fn assert_rejected_by(&self, jwks: &Jwks) -> &Self {
        assert!(
            crypto::verify::verify_with_jwks(self, jwks, false).is_err(),
            "Token unexpectedly verified against JWKS"
        );

        self
    }
}
