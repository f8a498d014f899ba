use crate::config::MIN_RSA_KEY_BITS;
use crate::errors::JwksError;
use crate::models::JsonWebKey;
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use rand::rngs::OsRng;
use rsa::pkcs1::EncodeRsaPrivateKey;
use rsa::traits::PublicKeyParts;
use rsa::{BigUint, RsaPrivateKey, RsaPublicKey};
use serde::{Deserialize, Serialize};
use tracing::instrument;

pub mod verify;

/// Public exponent used for every generated key (65537).
pub const RSA_PUBLIC_EXPONENT: u64 = 65_537;

/// JWT claims carried by every issued token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // Subject
    pub iss: String, // Issuer
    pub iat: i64,    // Issued at (epoch seconds)
    pub exp: i64,    // Expiration (epoch seconds)
    pub kid: String, // Signing key id, mirrored from the header
}

/// Generate an RSA private key with the given modulus size and e = 65537.
#[instrument(skip_all, fields(bits = bits))]
pub fn generate_rsa_key(bits: usize) -> Result<RsaPrivateKey, JwksError> {
    if bits < MIN_RSA_KEY_BITS {
        return Err(JwksError::KeyGeneration(format!(
            "Modulus of {} bits is below the {} bit minimum",
            bits, MIN_RSA_KEY_BITS
        )));
    }

    let exponent = BigUint::from(RSA_PUBLIC_EXPONENT);
    RsaPrivateKey::new_with_exp(&mut OsRng, bits, &exponent)
        .map_err(|e| JwksError::KeyGeneration(format!("Keypair generation failed: {}", e)))
}

/// Check that a private key meets the modulus and exponent policy.
pub fn validate_private_key(private_key: &RsaPrivateKey) -> Result<(), JwksError> {
    let bits = private_key.size() * 8;
    if bits < MIN_RSA_KEY_BITS {
        return Err(JwksError::KeyGeneration(format!(
            "Modulus of {} bits is below the {} bit minimum",
            bits, MIN_RSA_KEY_BITS
        )));
    }

    if *private_key.e() != BigUint::from(RSA_PUBLIC_EXPONENT) {
        return Err(JwksError::KeyGeneration(
            "Public exponent must be 65537".to_string(),
        ));
    }

    private_key
        .validate()
        .map_err(|e| JwksError::KeyGeneration(format!("Key validation failed: {}", e)))
}

/// Build the RS256 signing key from an RSA private key (PKCS#1 DER).
pub fn encoding_key_from(private_key: &RsaPrivateKey) -> Result<EncodingKey, JwksError> {
    let der = private_key
        .to_pkcs1_der()
        .map_err(|e| JwksError::KeyGeneration(format!("PKCS#1 encoding failed: {}", e)))?;

    Ok(EncodingKey::from_rsa_der(der.as_bytes()))
}

/// Minimal big-endian bytes, base64url without padding (RFC 7518 section 6.3.1).
///
/// `BigUint::to_bytes_be` never emits leading zero bytes, so 65537 encodes
/// as `AQAB`.
pub fn encode_rsa_component(value: &BigUint) -> String {
    URL_SAFE_NO_PAD.encode(value.to_bytes_be())
}

/// Project an RSA public key into its RS256 signature JWK.
pub fn public_jwk(kid: &str, public_key: &RsaPublicKey) -> Result<JsonWebKey, JwksError> {
    let zero = BigUint::from(0u8);
    if *public_key.n() == zero {
        return Err(JwksError::MalformedKey(format!(
            "Key {} has an empty modulus",
            kid
        )));
    }
    if *public_key.e() == zero {
        return Err(JwksError::MalformedKey(format!(
            "Key {} has an empty exponent",
            kid
        )));
    }

    Ok(JsonWebKey {
        kid: kid.to_string(),
        kty: "RSA".to_string(),
        use_: "sig".to_string(),
        alg: "RS256".to_string(),
        n: encode_rsa_component(public_key.n()),
        e: encode_rsa_component(public_key.e()),
    })
}

/// Sign claims with RS256, binding the token header to `key_id`.
#[instrument(skip_all)]
pub fn sign_jwt(
    claims: &Claims,
    encoding_key: &EncodingKey,
    key_id: &str,
) -> Result<String, JwksError> {
    let mut header = Header::new(Algorithm::RS256);
    header.typ = Some("JWT".to_string());
    header.kid = Some(key_id.to_string());

    encode(&header, claims, encoding_key)
        .map_err(|e| JwksError::Signing(format!("JWT signing operation failed: {}", e)))
}
