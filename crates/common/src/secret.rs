//! Secret types for protecting sensitive values from accidental logging.
//!
//! Re-exports the [`secrecy`] types used for every credential in this
//! workspace: the configured client secret, the HMAC signing key, and the
//! bearer tokens held by the client-side cache.
//!
//! `SecretString` implements `Debug` with redaction, so any struct that
//! derives `Debug` over a secret is safe to log with `{:?}` or through
//! `tracing`. The value is zeroized on drop.
//!
//! # Example
//!
//! ```rust
//! use common::secret::{ExposeSecret, SecretString};
//!
//! #[derive(Debug)]
//! struct ClientCredential {
//!     client_id: String,
//!     client_secret: SecretString,
//! }
//!
//! let credential = ClientCredential {
//!     client_id: "client-1".to_string(),
//!     client_secret: SecretString::from("p4ssw0rd"),
//! };
//!
//! assert!(!format!("{credential:?}").contains("p4ssw0rd"));
//! assert_eq!(credential.client_secret.expose_secret(), "p4ssw0rd");
//! ```
//!
//! With the `serde` feature enabled (on by default in the workspace), secrets
//! deserialize directly from configuration documents.

pub use secrecy::{ExposeSecret, SecretString};
