use crate::config::Config;
use crate::crypto::{self, Claims};
use crate::errors::JwksError;
use crate::models::KeyClass;
use crate::repositories::KeyStore;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::instrument;

/// Claim lifetime, applied forwards for valid tokens and backwards for expired ones.
pub const TOKEN_EXPIRY_SECONDS: i64 = 300; // 5 minutes

/// A signed token and the key it is bound to.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub kid: String,
    pub exp: i64,
}

/// Signs tokens with keys selected from a seeded [`KeyStore`].
///
/// Stateless per call; issuing never touches the store.
#[derive(Debug, Clone)]
pub struct TokenIssuer {
    key_store: Arc<KeyStore>,
    issuer: String,
    subject: String,
}

impl TokenIssuer {
    pub fn new(
        key_store: Arc<KeyStore>,
        issuer: impl Into<String>,
        subject: impl Into<String>,
    ) -> Self {
        Self {
            key_store,
            issuer: issuer.into(),
            subject: subject.into(),
        }
    }

    pub fn from_config(key_store: Arc<KeyStore>, config: &Config) -> Self {
        Self::new(
            key_store,
            config.token_issuer.clone(),
            config.token_subject.clone(),
        )
    }

    pub fn key_store(&self) -> &KeyStore {
        &self.key_store
    }

    /// Issue a token now. `want_expired` selects both an expired key and an
    /// `exp` in the past.
    pub fn issue(&self, want_expired: bool) -> Result<IssuedToken, JwksError> {
        self.issue_at(want_expired, Utc::now())
    }

    /// Issue a token as of `now`.
    ///
    /// Key expiry and claim expiry are chosen independently: the key comes
    /// from the store's expiry class, the claim is always `now ± 5 minutes`.
    #[instrument(skip_all, fields(class = %KeyClass::from_want_expired(want_expired), kid))]
    pub fn issue_at(
        &self,
        want_expired: bool,
        now: DateTime<Utc>,
    ) -> Result<IssuedToken, JwksError> {
        let record = self.key_store.find_for_signing(want_expired, now)?;
        tracing::Span::current().record("kid", record.kid());

        let now_ts = now.timestamp();
        let exp = if want_expired {
            now_ts - TOKEN_EXPIRY_SECONDS
        } else {
            now_ts + TOKEN_EXPIRY_SECONDS
        };

        let claims = Claims {
            sub: self.subject.clone(),
            iss: self.issuer.clone(),
            iat: now_ts,
            exp,
            kid: record.kid().to_string(),
        };

        let token = crypto::sign_jwt(&claims, record.encoding_key(), record.kid())?;

        Ok(IssuedToken {
            token,
            kid: record.kid().to_string(),
            exp,
        })
    }
}
