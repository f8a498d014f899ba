use serde::{Deserialize, Serialize};
use std::fmt;

/// Expiry class of a signing key: what a caller asks for when issuing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyClass {
    /// `expiry > now`
    Valid,
    /// `expiry <= now`
    Expired,
}

impl KeyClass {
    pub fn from_want_expired(want_expired: bool) -> Self {
        if want_expired {
            KeyClass::Expired
        } else {
            KeyClass::Valid
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            KeyClass::Valid => "valid",
            KeyClass::Expired => "expired",
        }
    }
}

impl fmt::Display for KeyClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// JWKS response (RFC 7517)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Jwks {
    pub keys: Vec<JsonWebKey>,
}

impl Jwks {
    pub fn find(&self, kid: &str) -> Option<&JsonWebKey> {
        self.keys.iter().find(|key| key.kid == kid)
    }
}

/// RSA JSON Web Key (RFC 7517 / RFC 7518 section 6.3)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JsonWebKey {
    pub kid: String, // Key ID
    pub kty: String, // Key Type ("RSA")
    #[serde(rename = "use")]
    pub use_: String, // Public key use ("sig")
    pub alg: String, // Algorithm ("RS256")
    pub n: String,   // Modulus (base64url, unpadded, big-endian)
    pub e: String,   // Exponent (base64url, unpadded, big-endian)
}

/// POST /auth response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    pub token: String,
}

/// Error body for every non-2xx JSON response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// GET /ready response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadyResponse {
    pub status: String,
    pub signing_keys: usize,
}
