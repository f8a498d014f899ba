//! Observability for the JWKS service.
//!
//! Handlers use `#[instrument(skip_all)]` and record only kids, counts and
//! expiry instants. Tokens and key material never appear in logs or labels.

pub mod metrics;

use crate::errors::JwksError;

/// Error categories for metrics labels (bounded cardinality)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Caller-correctable: bad query, no key of the requested class
    Client,
    /// Stored key material could not be projected
    KeyMaterial,
    /// Key generation or signing primitive failure
    Internal,
}

impl ErrorCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCategory::Client => "client",
            ErrorCategory::KeyMaterial => "key_material",
            ErrorCategory::Internal => "internal",
        }
    }
}

impl From<&JwksError> for ErrorCategory {
    fn from(err: &JwksError) -> Self {
        match err {
            JwksError::NoKeyAvailable { .. } | JwksError::InvalidRequest(_) => {
                ErrorCategory::Client
            }
            JwksError::MalformedKey(_) => ErrorCategory::KeyMaterial,
            JwksError::KeyGeneration(_) | JwksError::Signing(_) => ErrorCategory::Internal,
        }
    }
}
