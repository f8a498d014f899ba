//! Deterministic cryptographic fixtures for testing
//!
//! Provides reproducible RSA keys and pre-seeded key stores. RSA generation
//! is slow, so each seed's key is generated once per test process and cached.

use chrono::{Duration, Utc};
use jwks_service::config::Config;
use jwks_service::repositories::KeyStore;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rsa::RsaPrivateKey;
use std::collections::HashMap;
use std::sync::{Mutex, OnceLock};
use thiserror::Error;

/// Modulus size for fixture keys.
pub const TEST_KEY_BITS: usize = 2048;

/// Test fixture error type
#[derive(Error, Debug)]
pub enum FixtureError {
    #[error("Cryptographic operation failed: {0}")]
    Crypto(String),

    #[error("Key store rejected fixture key: {0}")]
    KeyStore(String),
}

fn key_cache() -> &'static Mutex<HashMap<u64, RsaPrivateKey>> {
    static CACHE: OnceLock<Mutex<HashMap<u64, RsaPrivateKey>>> = OnceLock::new();
    CACHE.get_or_init(|| Mutex::new(HashMap::new()))
}

/// Generate a deterministic RSA private key for testing.
///
/// The same seed always produces the same key, ensuring test reproducibility.
///
/// # Example
/// ```rust,ignore
/// let key = test_private_key(1)?;
/// assert_eq!(key, test_private_key(1)?);
/// ```
pub fn test_private_key(seed: u64) -> Result<RsaPrivateKey, FixtureError> {
    let mut cache = key_cache()
        .lock()
        .map_err(|e| FixtureError::Crypto(format!("Fixture cache poisoned: {}", e)))?;

    if let Some(key) = cache.get(&seed) {
        return Ok(key.clone());
    }

    // Seeded StdRng is deterministic and suitable for testing only
    let mut rng = StdRng::seed_from_u64(seed);
    let key = RsaPrivateKey::new(&mut rng, TEST_KEY_BITS)
        .map_err(|e| FixtureError::Crypto(format!("Failed to generate test key: {}", e)))?;

    cache.insert(seed, key.clone());
    Ok(key)
}

/// Key store holding `key-1` valid for `valid_for` and `key-2` expired
/// `expired_ago` in the past.
pub fn seeded_store(valid_for: Duration, expired_ago: Duration) -> Result<KeyStore, FixtureError> {
    let now = Utc::now();
    let mut store = KeyStore::new("key");

    store
        .insert_key(&test_private_key(1)?, now + valid_for)
        .map_err(|e| FixtureError::KeyStore(e.to_string()))?;
    store
        .insert_key(&test_private_key(2)?, now - expired_ago)
        .map_err(|e| FixtureError::KeyStore(e.to_string()))?;

    Ok(store)
}

/// Key store holding only `key-1`, valid for `valid_for`.
pub fn store_without_expired_key(valid_for: Duration) -> Result<KeyStore, FixtureError> {
    let mut store = KeyStore::new("key");
    store
        .insert_key(&test_private_key(1)?, Utc::now() + valid_for)
        .map_err(|e| FixtureError::KeyStore(e.to_string()))?;
    Ok(store)
}

/// Default configuration bound to an ephemeral local port.
pub fn test_config() -> Config {
    let vars = HashMap::from([("BIND_ADDRESS".to_string(), "127.0.0.1:0".to_string())]);
    Config::from_vars(&vars).unwrap_or_else(|e| panic!("Default test config must load: {}", e))
}
