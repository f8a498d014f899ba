//! # JWKS Test Utilities
//!
//! Shared test utilities for the JWKS server.
//!
//! This crate provides:
//! - Deterministic crypto fixtures (seeded RSA keys, pre-seeded key stores)
//! - Server test harness (TestJwksServer for E2E tests)
//! - Custom assertions (TokenAssertions trait)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use jwks_test_utils::*;
//!
//! #[tokio::test]
//! async fn test_example() -> anyhow::Result<()> {
//!     let store = seeded_store(Duration::days(1), Duration::days(1))?;
//!     let server = TestJwksServer::spawn(store).await?;
//!
//!     let jwks = server.fetch_jwks().await?;
//!     let token = server.fetch_token(false).await?;
//!
//!     token
//!         .assert_valid_jwt()
//!         .assert_signed_by("key-1")
//!         .assert_verifies_with(&jwks);
//!     Ok(())
//! }
//! ```

pub mod assertions;
pub mod crypto_fixtures;
pub mod server_harness;

// Re-export commonly used items
pub use assertions::*;
pub use crypto_fixtures::*;
pub use server_harness::*;
