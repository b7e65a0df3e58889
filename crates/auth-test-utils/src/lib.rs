//! # Auth Test Utilities
//!
//! Shared test utilities for the token issuer and the API client.
//!
//! This crate provides:
//! - Deterministic credential fixtures (fixed client pair, signing key, config)
//! - `TestTokenBuilder` for hand-crafted tokens (expired, wrong key, wrong audience)
//! - `TestAuthServer` running the real issuer router on `127.0.0.1:0`
//! - `ManualClock` for expiry tests
//!
//! ## Usage
//!
//! ```rust,ignore
//! use auth_test_utils::*;
//!
//! #[tokio::test]
//! async fn test_example() -> anyhow::Result<()> {
//!     let server = TestAuthServer::spawn().await?;
//!     let response = reqwest::Client::new()
//!         .post(format!("{}/api/auth/token", server.url()))
//!         .header("authorization", basic_header(TEST_CLIENT_ID, TEST_CLIENT_SECRET))
//!         .send()
//!         .await?;
//!     assert_eq!(response.status(), 200);
//!     Ok(())
//! }
//! ```

pub mod credential_fixtures;
pub mod server_harness;
pub mod token_builders;

pub use common::clock::ManualClock;
pub use credential_fixtures::*;
pub use server_harness::*;
pub use token_builders::*;
