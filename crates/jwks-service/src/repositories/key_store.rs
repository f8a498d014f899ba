//! In-memory signing key store.
//!
//! Records are appended during seeding and never mutated or removed. The
//! store is built with `&mut` access and then shared behind an `Arc`, so
//! request handlers only ever see a fully seeded, read-only snapshot.

use crate::crypto;
use crate::errors::JwksError;
use crate::models::{JsonWebKey, KeyClass};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::EncodingKey;
use rsa::{RsaPrivateKey, RsaPublicKey};
use std::fmt;
use tracing::instrument;

/// One RSA key pair plus its kid and expiry.
///
/// The private half is kept only as the signing key derived from it, and
/// never leaves this module except to sign.
pub struct KeyRecord {
    kid: String,
    encoding_key: EncodingKey,
    public_key: RsaPublicKey,
    created_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
}

impl KeyRecord {
    fn new(
        kid: String,
        private_key: &RsaPrivateKey,
        created_at: DateTime<Utc>,
        expires_at: DateTime<Utc>,
    ) -> Result<Self, JwksError> {
        crypto::validate_private_key(private_key)?;

        Ok(Self {
            kid,
            encoding_key: crypto::encoding_key_from(private_key)?,
            public_key: private_key.to_public_key(),
            created_at,
            expires_at,
        })
    }

    pub fn kid(&self) -> &str {
        &self.kid
    }

    pub fn public_key(&self) -> &RsaPublicKey {
        &self.public_key
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    /// A key is expired once `expiry <= now`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }

    pub fn class_at(&self, now: DateTime<Utc>) -> KeyClass {
        if self.is_expired_at(now) {
            KeyClass::Expired
        } else {
            KeyClass::Valid
        }
    }

    pub(crate) fn encoding_key(&self) -> &EncodingKey {
        &self.encoding_key
    }

    pub fn to_jwk(&self) -> Result<JsonWebKey, JwksError> {
        crypto::public_jwk(&self.kid, &self.public_key)
    }
}

impl fmt::Debug for KeyRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyRecord")
            .field("kid", &self.kid)
            .field("private_key", &"[REDACTED]")
            .field("created_at", &self.created_at)
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Insertion-ordered collection of [`KeyRecord`]s keyed by kid.
///
/// Kids are `<prefix>-<n>` with `n` counting up from 1 for the lifetime
/// of the store.
#[derive(Debug)]
pub struct KeyStore {
    key_id_prefix: String,
    next_sequence: u64,
    records: Vec<KeyRecord>,
}

impl KeyStore {
    pub fn new(key_id_prefix: impl Into<String>) -> Self {
        Self {
            key_id_prefix: key_id_prefix.into(),
            next_sequence: 1,
            records: Vec::new(),
        }
    }

    /// Generate a fresh key valid for `validity` from now.
    pub fn generate_key(
        &mut self,
        bits: usize,
        validity: Duration,
    ) -> Result<&KeyRecord, JwksError> {
        let expires_at = Utc::now() + validity;
        self.generate_key_expiring_at(bits, expires_at)
    }

    /// Generate a fresh key with an explicit expiry, which may be in the past.
    #[instrument(skip_all, fields(bits = bits, kid))]
    pub fn generate_key_expiring_at(
        &mut self,
        bits: usize,
        expires_at: DateTime<Utc>,
    ) -> Result<&KeyRecord, JwksError> {
        let private_key = crypto::generate_rsa_key(bits)?;
        self.insert_key(&private_key, expires_at)
    }

    /// Add an existing private key under a newly assigned kid.
    pub fn insert_key(
        &mut self,
        private_key: &RsaPrivateKey,
        expires_at: DateTime<Utc>,
    ) -> Result<&KeyRecord, JwksError> {
        let kid = format!("{}-{}", self.key_id_prefix, self.next_sequence);
        let record = KeyRecord::new(kid, private_key, Utc::now(), expires_at)?;

        // Consumed only once the record is valid; a failed insert leaves no gap
        self.next_sequence += 1;
        tracing::Span::current().record("kid", record.kid.as_str());
        tracing::debug!(
            target: "jwks.key_store",
            kid = %record.kid,
            expires_at = %record.expires_at.to_rfc3339(),
            "Signing key added"
        );

        self.records.push(record);
        self.records
            .last()
            .ok_or_else(|| JwksError::MalformedKey("Record vanished after insert".to_string()))
    }

    /// Every record with `expiry > now`, in insertion order.
    pub fn list_unexpired(&self, now: DateTime<Utc>) -> Vec<&KeyRecord> {
        self.records
            .iter()
            .filter(|record| !record.is_expired_at(now))
            .collect()
    }

    /// First record of the requested expiry class.
    pub fn find_for_signing(
        &self,
        want_expired: bool,
        now: DateTime<Utc>,
    ) -> Result<&KeyRecord, JwksError> {
        self.records
            .iter()
            .find(|record| record.is_expired_at(now) == want_expired)
            .ok_or(JwksError::NoKeyAvailable {
                class: KeyClass::from_want_expired(want_expired),
            })
    }

    pub fn find_by_kid(&self, kid: &str) -> Option<&KeyRecord> {
        self.records.iter().find(|record| record.kid == kid)
    }

    pub fn iter(&self) -> impl Iterator<Item = &KeyRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
