use crate::config::Config;
use crate::errors::JwksError;
use crate::models::{JsonWebKey, Jwks, KeyClass};
use crate::observability::metrics::record_signing_key_generated;
use crate::repositories::KeyStore;
use chrono::{DateTime, Duration, Utc};
use tracing::instrument;

/// Seed the store with one valid key and, if configured, one expired key.
///
/// The valid key is inserted first so it is the primary key for signing.
/// A store that already holds records is left untouched.
#[instrument(skip_all, fields(bits = config.rsa_key_bits))]
pub fn seed_key_store(store: &mut KeyStore, config: &Config) -> Result<(), JwksError> {
    if !store.is_empty() {
        tracing::debug!(target: "jwks.keys", keys = store.len(), "Key store already seeded");
        return Ok(());
    }

    let now = Utc::now();

    let valid_until = now + Duration::seconds(config.key_validity_seconds);
    let record = store.generate_key_expiring_at(config.rsa_key_bits, valid_until)?;
    record_signing_key_generated(KeyClass::Valid);
    tracing::info!(
        target: "jwks.keys",
        kid = %record.kid(),
        expires_at = %record.expires_at().to_rfc3339(),
        "Generated valid signing key"
    );

    if config.seed_expired_key {
        let expired_at = now - Duration::seconds(config.expired_key_age_seconds);
        let record = store.generate_key_expiring_at(config.rsa_key_bits, expired_at)?;
        record_signing_key_generated(KeyClass::Expired);
        tracing::info!(
            target: "jwks.keys",
            kid = %record.kid(),
            expires_at = %record.expires_at().to_rfc3339(),
            "Generated pre-expired signing key"
        );
    }

    Ok(())
}

/// Get JWKS (JSON Web Key Set) for public key distribution
///
/// Contains exactly the keys with `expiry > now`, in insertion order.
pub fn get_jwks(store: &KeyStore, now: DateTime<Utc>) -> Result<Jwks, JwksError> {
    let keys = store
        .list_unexpired(now)
        .into_iter()
        .map(|record| record.to_jwk())
        .collect::<Result<Vec<JsonWebKey>, JwksError>>()?;

    Ok(Jwks { keys })
}

/// `max-age` for a JWKS response: never past the soonest published expiry.
pub fn jwks_cache_max_age(store: &KeyStore, now: DateTime<Utc>, cap_seconds: u64) -> u64 {
    store
        .list_unexpired(now)
        .iter()
        .map(|record| (record.expires_at() - now).num_seconds().max(0) as u64)
        .min()
        .map_or(0, |remaining| remaining.min(cap_seconds))
}
