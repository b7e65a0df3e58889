//! Client credential validation.
//!
//! A single client identity is configured at startup. Presented credentials
//! arrive as an HTTP Basic header value and are checked against it.

use crate::config::Config;
use crate::errors::AuthError;
use base64::{engine::general_purpose, Engine as _};
use common::secret::ExposeSecret;
use ring::{hmac, rand::SystemRandom};
use tracing::instrument;

/// Identity returned after a successful credential check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedIdentity {
    pub client_id: String,
}

/// Validates `Basic` credentials against the configured client pair.
///
/// Comparisons run through `hmac::verify` under a per-process random key,
/// so the time taken does not depend on how many leading bytes match.
pub struct CredentialValidator {
    client_id: String,
    compare_key: hmac::Key,
    client_id_tag: hmac::Tag,
    client_secret_tag: hmac::Tag,
}

impl CredentialValidator {
    /// Build a validator for the configured client.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Internal` if the system RNG is unavailable.
    pub fn new(config: &Config) -> Result<Self, AuthError> {
        let rng = SystemRandom::new();
        let compare_key = hmac::Key::generate(hmac::HMAC_SHA256, &rng).map_err(|_| {
            tracing::error!(target: "auth.credentials", "Failed to generate comparison key");
            AuthError::Internal
        })?;

        let client_id_tag = hmac::sign(&compare_key, config.client_id.as_bytes());
        let client_secret_tag = hmac::sign(
            &compare_key,
            config.client_secret.expose_secret().as_bytes(),
        );

        Ok(Self {
            client_id: config.client_id.clone(),
            compare_key,
            client_id_tag,
            client_secret_tag,
        })
    }

    /// Parse and validate an `Authorization` header value.
    ///
    /// # Errors
    ///
    /// - `MalformedCredential` - no `Basic ` prefix, bad base64, not UTF-8, or
    ///   not exactly two non-empty parts around the first colon
    /// - `InvalidClient` - id does not match
    /// - `InvalidSecret` - id matches, secret does not
    #[instrument(skip_all)]
    pub fn validate(&self, basic_header_value: &str) -> Result<ValidatedIdentity, AuthError> {
        let (client_id, client_secret) = parse_basic_credentials(basic_header_value)?;

        if !self.matches(client_id.as_bytes(), &self.client_id_tag) {
            tracing::debug!(target: "auth.credentials", "Rejected credential: unknown client id");
            return Err(AuthError::InvalidClient);
        }

        if !self.matches(client_secret.as_bytes(), &self.client_secret_tag) {
            tracing::debug!(target: "auth.credentials", "Rejected credential: secret mismatch");
            return Err(AuthError::InvalidSecret);
        }

        Ok(ValidatedIdentity {
            client_id: self.client_id.clone(),
        })
    }

    fn matches(&self, presented: &[u8], expected: &hmac::Tag) -> bool {
        hmac::verify(&self.compare_key, presented, expected.as_ref()).is_ok()
    }
}

/// Split a `Basic base64(id:secret)` value into its two parts.
///
/// The secret may itself contain colons; only the first colon separates.
fn parse_basic_credentials(header_value: &str) -> Result<(String, String), AuthError> {
    let encoded = header_value
        .strip_prefix("Basic ")
        .ok_or(AuthError::MalformedCredential)?;

    let decoded = general_purpose::STANDARD
        .decode(encoded.trim())
        .map_err(|e| {
            tracing::debug!(
                target: "auth.credentials",
                error = %e,
                "Credential is not valid base64"
            );
            AuthError::MalformedCredential
        })?;

    let credentials = String::from_utf8(decoded).map_err(|_| AuthError::MalformedCredential)?;

    match credentials.split_once(':') {
        Some((id, secret)) if !id.is_empty() && !secret.is_empty() => {
            Ok((id.to_string(), secret.to_string()))
        }
        _ => Err(AuthError::MalformedCredential),
    }
}
