//! Relying-party helpers: what a client holding only the JWKS does.
//!
//! The server itself never verifies tokens; these back the test tooling and
//! anyone embedding the library as a verifier.

use crate::errors::JwksError;
use crate::models::{JsonWebKey, Jwks};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use tracing::instrument;

use super::Claims;

/// Maximum JWT size accepted by [`extract_jwt_kid`] and [`verify_jwt`] (4KB).
///
/// An RS256 token with our claims is well under 1KB even with a 4096-bit key.
pub const MAX_JWT_SIZE_BYTES: usize = 4096;

/// Extract the `kid` from a JWT header without verifying the signature.
///
/// The token MUST still be verified against the key this kid names.
#[instrument(skip_all)]
pub fn extract_jwt_kid(token: &str) -> Option<String> {
    if token.len() > MAX_JWT_SIZE_BYTES {
        return None;
    }

    let mut parts = token.split('.');
    let header_b64 = parts.next()?;
    // header.payload.signature, nothing more
    if parts.count() != 2 {
        return None;
    }

    let header_bytes = URL_SAFE_NO_PAD.decode(header_b64).ok()?;
    let header: serde_json::Value = serde_json::from_slice(&header_bytes).ok()?;

    header.get("kid")?.as_str().map(|s| s.to_string())
}

/// Verify an RS256 token against a published JWK.
///
/// With `validate_exp` false the signature and structure are still checked,
/// which is how the expired-claim path is inspected.
#[instrument(skip_all)]
pub fn verify_jwt(token: &str, jwk: &JsonWebKey, validate_exp: bool) -> Result<Claims, JwksError> {
    if token.len() > MAX_JWT_SIZE_BYTES {
        return Err(JwksError::InvalidRequest(
            "Token exceeds maximum size".to_string(),
        ));
    }

    if jwk.kty != "RSA" || jwk.alg != "RS256" {
        return Err(JwksError::InvalidRequest(format!(
            "Unsupported key type {}/{}",
            jwk.kty, jwk.alg
        )));
    }

    let decoding_key = DecodingKey::from_rsa_components(&jwk.n, &jwk.e)
        .map_err(|e| JwksError::MalformedKey(format!("Invalid JWK components: {}", e)))?;

    let mut validation = Validation::new(Algorithm::RS256);
    validation.validate_exp = validate_exp;
    validation.leeway = 0;

    decode::<Claims>(token, &decoding_key, &validation)
        .map(|data| data.claims)
        .map_err(|e| {
            tracing::debug!(target: "crypto", error = %e, "Token verification failed");
            JwksError::InvalidRequest("The token is invalid or expired".to_string())
        })
}

/// Verify a token the way a relying party does: look its kid up in a JWKS.
pub fn verify_with_jwks(token: &str, jwks: &Jwks, validate_exp: bool) -> Result<Claims, JwksError> {
    let kid = extract_jwt_kid(token)
        .ok_or_else(|| JwksError::InvalidRequest("Token header has no kid".to_string()))?;

    let jwk = jwks
        .find(&kid)
        .ok_or_else(|| JwksError::InvalidRequest(format!("Key {} is not published", kid)))?;

    verify_jwt(token, jwk, validate_exp)
}
