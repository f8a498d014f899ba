use crate::models::{ErrorResponse, KeyClass};
use crate::observability::{metrics::record_error, ErrorCategory};
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum JwksError {
    /// Entropy or RSA primitive failure while creating key material.
    #[error("Key generation failed: {0}")]
    KeyGeneration(String),

    /// No record matches the requested expiry class.
    #[error("No {class} signing key available")]
    NoKeyAvailable { class: KeyClass },

    /// A stored public key could not be decomposed into JWK components.
    #[error("Malformed key material: {0}")]
    MalformedKey(String),

    #[error("Token signing failed: {0}")]
    Signing(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl JwksError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            JwksError::NoKeyAvailable { .. } | JwksError::InvalidRequest(_) => {
                StatusCode::BAD_REQUEST
            }
            JwksError::KeyGeneration(_) | JwksError::MalformedKey(_) | JwksError::Signing(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for JwksError {
    fn into_response(self) -> Response {
        let category = ErrorCategory::from(&self);
        record_error(category);

        let message = match &self {
            JwksError::NoKeyAvailable { .. } => self.to_string(),
            JwksError::InvalidRequest(reason) => reason.clone(),
            JwksError::MalformedKey(detail) => {
                // Derived public keys always decompose, so this means the store is corrupt
                tracing::error!(
                    target: "jwks.errors",
                    detail = %detail,
                    "Key store corruption detected"
                );
                "An internal cryptographic error occurred".to_string()
            }
            JwksError::KeyGeneration(detail) | JwksError::Signing(detail) => {
                tracing::error!(
                    target: "jwks.errors",
                    detail = %detail,
                    "Cryptographic operation failed"
                );
                "An internal cryptographic error occurred".to_string()
            }
        };

        (self.status_code(), Json(ErrorResponse { error: message })).into_response()
    }
}
