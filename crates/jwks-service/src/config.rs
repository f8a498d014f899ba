use std::collections::HashMap;
use std::env;
use thiserror::Error;

/// Smallest RSA modulus the service will generate or accept.
pub const MIN_RSA_KEY_BITS: usize = 2048;

/// Largest RSA modulus accepted from configuration.
pub const MAX_RSA_KEY_BITS: usize = 4096;

pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:8080";

/// Default lifetime of the valid signing key (10 minutes).
pub const DEFAULT_KEY_VALIDITY_SECONDS: i64 = 600;

/// Key validity bounds: at least a minute, at most a day.
pub const MIN_KEY_VALIDITY_SECONDS: i64 = 60;
pub const MAX_KEY_VALIDITY_SECONDS: i64 = 86_400;

/// How far in the past the seeded expired key's expiry is placed.
pub const DEFAULT_EXPIRED_KEY_AGE_SECONDS: i64 = 3600;
pub const MAX_EXPIRED_KEY_AGE_SECONDS: i64 = 31_536_000;

pub const DEFAULT_KEY_ID_PREFIX: &str = "key";
pub const DEFAULT_TOKEN_ISSUER: &str = "jwks-server";
pub const DEFAULT_TOKEN_SUBJECT: &str = "test-user";

/// Upper bound for the JWKS `Cache-Control: max-age` directive.
pub const DEFAULT_JWKS_CACHE_MAX_AGE_SECONDS: u64 = 60;
pub const MAX_JWKS_CACHE_MAX_AGE_SECONDS: u64 = 3600;

#[derive(Debug, Clone)]
pub struct Config {
    pub bind_address: String,
    pub key_validity_seconds: i64,
    pub expired_key_age_seconds: i64,
    pub seed_expired_key: bool,
    pub rsa_key_bits: usize,
    pub key_id_prefix: String,
    pub token_issuer: String,
    pub token_subject: String,
    pub jwks_cache_max_age_seconds: u64,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for {name}: {value}")]
    InvalidValue { name: String, value: String },

    #[error("{name} must be between {min} and {max}, got {value}")]
    OutOfRange {
        name: String,
        value: i64,
        min: i64,
        max: i64,
    },
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(&env::vars().collect())
    }

    /// Load configuration from a HashMap (for testing)
    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let bind_address = vars
            .get("BIND_ADDRESS")
            .cloned()
            .unwrap_or_else(|| DEFAULT_BIND_ADDRESS.to_string());

        let key_validity_seconds = parse_ranged(
            vars,
            "KEY_VALIDITY_SECONDS",
            DEFAULT_KEY_VALIDITY_SECONDS,
            MIN_KEY_VALIDITY_SECONDS,
            MAX_KEY_VALIDITY_SECONDS,
        )?;

        let expired_key_age_seconds = parse_ranged(
            vars,
            "EXPIRED_KEY_AGE_SECONDS",
            DEFAULT_EXPIRED_KEY_AGE_SECONDS,
            1,
            MAX_EXPIRED_KEY_AGE_SECONDS,
        )?;

        let seed_expired_key = match vars.get("SEED_EXPIRED_KEY") {
            None => true,
            Some(raw) => parse_bool(raw).ok_or_else(|| ConfigError::InvalidValue {
                name: "SEED_EXPIRED_KEY".to_string(),
                value: raw.clone(),
            })?,
        };

        let rsa_key_bits = parse_ranged(
            vars,
            "RSA_KEY_BITS",
            MIN_RSA_KEY_BITS as i64,
            MIN_RSA_KEY_BITS as i64,
            MAX_RSA_KEY_BITS as i64,
        )?;
        if rsa_key_bits % 8 != 0 {
            return Err(ConfigError::InvalidValue {
                name: "RSA_KEY_BITS".to_string(),
                value: rsa_key_bits.to_string(),
            });
        }

        let key_id_prefix = non_empty(vars, "KEY_ID_PREFIX", DEFAULT_KEY_ID_PREFIX)?;
        if !key_id_prefix
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return Err(ConfigError::InvalidValue {
                name: "KEY_ID_PREFIX".to_string(),
                value: key_id_prefix,
            });
        }

        let token_issuer = non_empty(vars, "TOKEN_ISSUER", DEFAULT_TOKEN_ISSUER)?;
        let token_subject = non_empty(vars, "TOKEN_SUBJECT", DEFAULT_TOKEN_SUBJECT)?;

        let jwks_cache_max_age_seconds = parse_ranged(
            vars,
            "JWKS_CACHE_MAX_AGE_SECONDS",
            DEFAULT_JWKS_CACHE_MAX_AGE_SECONDS as i64,
            0,
            MAX_JWKS_CACHE_MAX_AGE_SECONDS as i64,
        )?;

        Ok(Config {
            bind_address,
            key_validity_seconds,
            expired_key_age_seconds,
            seed_expired_key,
            // Range checked above, both casts are lossless
            rsa_key_bits: rsa_key_bits as usize,
            key_id_prefix,
            token_issuer,
            token_subject,
            jwks_cache_max_age_seconds: jwks_cache_max_age_seconds as u64,
        })
    }
}

/// Strict `true`/`false` parsing, case-insensitive.
pub fn parse_bool(raw: &str) -> Option<bool> {
    if raw.eq_ignore_ascii_case("true") {
        Some(true)
    } else if raw.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}

fn parse_ranged(
    vars: &HashMap<String, String>,
    name: &str,
    default: i64,
    min: i64,
    max: i64,
) -> Result<i64, ConfigError> {
    let value = match vars.get(name) {
        None => return Ok(default),
        Some(raw) => raw
            .trim()
            .parse::<i64>()
            .map_err(|_| ConfigError::InvalidValue {
                name: name.to_string(),
                value: raw.clone(),
            })?,
    };

    if !(min..=max).contains(&value) {
        return Err(ConfigError::OutOfRange {
            name: name.to_string(),
            value,
            min,
            max,
        });
    }

    Ok(value)
}

fn non_empty(
    vars: &HashMap<String, String>,
    name: &str,
    default: &str,
) -> Result<String, ConfigError> {
    match vars.get(name) {
        None => Ok(default.to_string()),
        Some(raw) if raw.trim().is_empty() => Err(ConfigError::InvalidValue {
            name: name.to_string(),
            value: raw.clone(),
        }),
        Some(raw) => Ok(raw.trim().to_string()),
    }
}
