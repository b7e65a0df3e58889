//! Observability for the token issuer.
//!
//! All instrumentation uses `#[instrument(skip_all)]` with explicit fields.
//! Fields fall into three groups:
//! - **SAFE**: logged in plaintext (outcomes, error categories, durations)
//! - **HASHED**: SHA-256 prefix for correlation (`client_id`)
//! - **NEVER**: client secrets, signing keys, tokens

pub mod metrics;

use crate::errors::AuthError;
use sha2::{Digest, Sha256};

/// Hash a field value for correlation in logs (SHA-256, first 8 hex chars).
///
/// Not a secret-protection mechanism; only keeps identifiers out of logs in
/// plaintext while still letting entries be grouped.
pub fn hash_for_correlation(value: &str) -> String {
    let digest = Sha256::digest(value.as_bytes());
    hex::encode(digest.get(..4).unwrap_or_default())
}

/// Bounded label values for error metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Missing or malformed Authorization header
    Malformed,
    /// Wrong client id or secret
    Authentication,
    /// Signature, expiry, issuer or audience failure
    Cryptographic,
    /// Signing key or system failure
    Internal,
}

impl ErrorCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCategory::Malformed => "malformed",
            ErrorCategory::Authentication => "authentication",
            ErrorCategory::Cryptographic => "cryptographic",
            ErrorCategory::Internal => "internal",
        }
    }
}

impl From<&AuthError> for ErrorCategory {
    fn from(err: &AuthError) -> Self {
        match err {
            AuthError::MissingAuthorization | AuthError::MalformedCredential => {
                ErrorCategory::Malformed
            }
            AuthError::InvalidClient | AuthError::InvalidSecret => ErrorCategory::Authentication,
            AuthError::InvalidToken(_) => ErrorCategory::Cryptographic,
            AuthError::SigningError(_) | AuthError::Internal => ErrorCategory::Internal,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_for_correlation_consistency() {
        assert_eq!(
            hash_for_correlation("client-1"),
            hash_for_correlation("client-1")
        );
    }

    #[test]
    fn test_hash_for_correlation_uniqueness() {
        assert_ne!(
            hash_for_correlation("client-1"),
            hash_for_correlation("client-x")
        );
    }

    #[test]
    fn test_hash_for_correlation_length() {
        let hash = hash_for_correlation("client-1");
        assert_eq!(hash.len(), 8, "Hash should be 8 hex characters");
        assert!(!hash.contains("client"));
    }

    #[test]
    fn test_error_category_mapping() {
        assert_eq!(
            ErrorCategory::from(&AuthError::MalformedCredential),
            ErrorCategory::Malformed
        );
        assert_eq!(
            ErrorCategory::from(&AuthError::MissingAuthorization),
            ErrorCategory::Malformed
        );
        assert_eq!(
            ErrorCategory::from(&AuthError::InvalidClient),
            ErrorCategory::Authentication
        );
        assert_eq!(
            ErrorCategory::from(&AuthError::InvalidSecret),
            ErrorCategory::Authentication
        );
        assert_eq!(
            ErrorCategory::from(&AuthError::InvalidToken("x".to_string())),
            ErrorCategory::Cryptographic
        );
        assert_eq!(
            ErrorCategory::from(&AuthError::SigningError("x".to_string())),
            ErrorCategory::Internal
        );
        assert_eq!(ErrorCategory::Internal.as_str(), "internal");
    }
}
