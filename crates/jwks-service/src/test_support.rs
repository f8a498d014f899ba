//! Key material shared by unit tests.
//!
//! RSA generation dominates test time, so a handful of keys is generated
//! once per test binary and reused.

use crate::crypto;
use rsa::RsaPrivateKey;
use std::sync::OnceLock;

const SHARED_KEY_COUNT: usize = 3;

static SHARED_KEYS: OnceLock<Vec<RsaPrivateKey>> = OnceLock::new();

/// One of three fixed 2048-bit keys; `index` wraps.
#[allow(clippy::expect_used, clippy::indexing_slicing)]
pub(crate) fn shared_private_key(index: usize) -> &'static RsaPrivateKey {
    let keys = SHARED_KEYS.get_or_init(|| {
        (0..SHARED_KEY_COUNT)
            .map(|_| crypto::generate_rsa_key(2048).expect("test key generation failed"))
            .collect()
    });
    &keys[index % SHARED_KEY_COUNT]
}
