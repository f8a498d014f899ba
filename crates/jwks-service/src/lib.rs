//! JWKS Server Library
//!
//! Issues RS256-signed JWTs and publishes the matching public keys as a
//! JSON Web Key Set. Keys live in memory for the life of the process; an
//! optional pre-expired key lets clients exercise their expiry handling.
//!
//! # Modules
//!
//! - `config` - Environment configuration
//! - `crypto` - RSA key generation, JWK encoding, JWT signing
//! - `errors` - Error types and HTTP mapping
//! - `handlers` - HTTP request handlers
//! - `middleware` - HTTP metrics middleware
//! - `models` - Wire types
//! - `observability` - Prometheus metrics
//! - `repositories` - In-memory key store
//! - `routes` - Router assembly
//! - `services` - Key seeding and token issuance

pub mod config;
pub mod crypto;
pub mod errors;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod observability;
pub mod repositories;
pub mod routes;
pub mod services;

#[cfg(test)]
pub(crate) mod test_support;
