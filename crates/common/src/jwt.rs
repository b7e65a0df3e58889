//! Service token claim set and compact-token inspection helpers.
//!
//! Both sides of the token exchange use this module:
//! - the issuer serializes [`ServiceClaims`] and signs them (HS256),
//! - the verifier deserializes them after signature checks,
//! - the client reads `exp` from a freshly acquired token with [`extract_exp`]
//!   so the cache expiry is always derived from the token itself.
//!
//! # Security
//!
//! - Tokens are size-checked BEFORE parsing
//! - [`extract_exp`] does NOT verify the signature; it is only used by the
//!   holder of a token to learn when to stop presenting it
//! - Error messages are generic
//! - The `sub` field is redacted in Debug output

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use thiserror::Error;

// =============================================================================
// Constants
// =============================================================================

/// Maximum allowed token size in bytes (8KB).
///
/// Tokens issued here are around 300 bytes. Anything larger than this limit is
/// rejected before base64 decoding or signature verification.
pub const MAX_JWT_SIZE_BYTES: usize = 8192;

/// Default clock skew tolerance applied to `exp` and `iat` checks.
pub const DEFAULT_CLOCK_SKEW: Duration = Duration::from_secs(30);

/// Maximum configurable clock skew tolerance (5 minutes).
pub const MAX_CLOCK_SKEW: Duration = Duration::from_secs(300);

// =============================================================================
// Error Types
// =============================================================================

/// Errors from inspecting a compact token.
///
/// Messages are intentionally identical; details go to debug logs.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum JwtValidationError {
    /// Token size exceeds [`MAX_JWT_SIZE_BYTES`].
    #[error("The access token is invalid or expired")]
    TokenTooLarge,

    /// Token is not three base64url segments with a JSON payload.
    #[error("The access token is invalid or expired")]
    MalformedToken,

    /// Payload has no integer `exp` claim.
    #[error("The access token is invalid or expired")]
    MissingExp,

    /// Token `iat` claim is too far in the future.
    #[error("The access token is invalid or expired")]
    IatTooFarInFuture,
}

// =============================================================================
// Claims Types
// =============================================================================

/// Claim set carried by every service token.
///
/// `exp` and `iat` are Unix epoch seconds. `jti` is a fresh random identifier
/// per issuance.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceClaims {
    /// Subject (service name) - redacted in Debug output.
    pub sub: String,

    /// Unique token identifier.
    pub jti: String,

    /// Issuer.
    pub iss: String,

    /// Audience.
    pub aud: String,

    /// Issued-at timestamp.
    pub iat: i64,

    /// Expiration timestamp.
    pub exp: i64,
}

impl fmt::Debug for ServiceClaims {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceClaims")
            .field("sub", &"[REDACTED]")
            .field("jti", &self.jti)
            .field("iss", &self.iss)
            .field("aud", &self.aud)
            .field("iat", &self.iat)
            .field("exp", &self.exp)
            .finish()
    }
}

impl ServiceClaims {
    /// Lifetime of the token in seconds (`exp - iat`).
    #[must_use]
    pub fn lifetime_secs(&self) -> i64 {
        self.exp.saturating_sub(self.iat)
    }
}

// =============================================================================
// Functions
// =============================================================================

/// Read the `exp` claim from a compact token without verifying the signature.
///
/// The client calls this on the token body returned by the issuer. The value
/// becomes the absolute expiry of the cache entry, so the cache never holds an
/// expiry it did not derive from the token.
///
/// # Errors
///
/// - `TokenTooLarge` - token exceeds [`MAX_JWT_SIZE_BYTES`]
/// - `MalformedToken` - wrong segment count, bad base64url, or non-JSON payload
/// - `MissingExp` - payload has no integer `exp`
pub fn extract_exp(token: &str) -> Result<i64, JwtValidationError> {
    let payload = decode_payload(token)?;

    payload
        .get("exp")
        .and_then(serde_json::Value::as_i64)
        .ok_or_else(|| {
            tracing::debug!(target: "common.jwt", "Token rejected: missing integer exp claim");
            JwtValidationError::MissingExp
        })
}

fn decode_payload(token: &str) -> Result<serde_json::Value, JwtValidationError> {
    if token.len() > MAX_JWT_SIZE_BYTES {
        tracing::debug!(
            target: "common.jwt",
            token_size = token.len(),
            max_size = MAX_JWT_SIZE_BYTES,
            "Token rejected: size exceeds maximum allowed"
        );
        return Err(JwtValidationError::TokenTooLarge);
    }

    let parts: Vec<&str> = token.split('.').collect();
    if parts.len() != 3 || parts.iter().any(|p| p.is_empty()) {
        tracing::debug!(
            target: "common.jwt",
            parts = parts.len(),
            "Token rejected: invalid compact format"
        );
        return Err(JwtValidationError::MalformedToken);
    }

    let payload_part = parts.get(1).ok_or(JwtValidationError::MalformedToken)?;
    let payload_bytes = URL_SAFE_NO_PAD.decode(payload_part).map_err(|e| {
        tracing::debug!(target: "common.jwt", error = %e, "Failed to decode token payload base64");
        JwtValidationError::MalformedToken
    })?;

    serde_json::from_slice(&payload_bytes).map_err(|e| {
        tracing::debug!(target: "common.jwt", error = %e, "Failed to parse token payload JSON");
        JwtValidationError::MalformedToken
    })
}

/// Reject an `iat` more than `clock_skew` ahead of `now` (both epoch seconds).
///
/// # Errors
///
/// Returns `JwtValidationError::IatTooFarInFuture` when `iat > now + clock_skew`.
pub fn validate_iat_at(iat: i64, clock_skew: Duration, now: i64) -> Result<(), JwtValidationError> {
    // Config loaders cap clock_skew at MAX_CLOCK_SKEW
    #[allow(clippy::cast_possible_wrap)]
    let clock_skew_secs = clock_skew.as_secs() as i64;
    let max_iat = now.saturating_add(clock_skew_secs);

    if iat > max_iat {
        tracing::debug!(
            target: "common.jwt",
            iat = iat,
            now = now,
            max_allowed = max_iat,
            "Token rejected: iat too far in the future"
        );
        return Err(JwtValidationError::IatTooFarInFuture);
    }

    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn encode_segment(value: &serde_json::Value) -> String {
        URL_SAFE_NO_PAD.encode(serde_json::to_vec(value).unwrap())
    }

    fn token_with_payload(payload: &serde_json::Value) -> String {
        let header = serde_json::json!({"alg": "HS256", "typ": "JWT"});
        format!(
            "{}.{}.c2lnbmF0dXJl",
            encode_segment(&header),
            encode_segment(payload)
        )
    }

    // -------------------------------------------------------------------------
    // extract_exp
    // -------------------------------------------------------------------------

    #[test]
    fn test_extract_exp_reads_integer_claim() {
        let token = token_with_payload(&serde_json::json!({
            "sub": "roadside-api",
            "exp": 1_700_003_600_i64,
        }));

        assert_eq!(extract_exp(&token), Ok(1_700_003_600));
    }

    #[test]
    fn test_extract_exp_missing_claim() {
        let token = token_with_payload(&serde_json::json!({"sub": "roadside-api"}));
        assert_eq!(extract_exp(&token), Err(JwtValidationError::MissingExp));
    }

    #[test]
    fn test_extract_exp_non_integer_claim() {
        let token = token_with_payload(&serde_json::json!({"exp": "tomorrow"}));
        assert_eq!(extract_exp(&token), Err(JwtValidationError::MissingExp));
    }

    #[test]
    fn test_extract_exp_wrong_segment_count() {
        assert_eq!(
            extract_exp("only.two"),
            Err(JwtValidationError::MalformedToken)
        );
        assert_eq!(
            extract_exp("a.b.c.d"),
            Err(JwtValidationError::MalformedToken)
        );
        assert_eq!(extract_exp(""), Err(JwtValidationError::MalformedToken));
    }

    #[test]
    fn test_extract_exp_bad_base64_payload() {
        assert_eq!(
            extract_exp("eyJhbGciOiJIUzI1NiJ9.!!!notbase64!!!.sig"),
            Err(JwtValidationError::MalformedToken)
        );
    }

    #[test]
    fn test_extract_exp_payload_not_json() {
        let payload = URL_SAFE_NO_PAD.encode(b"not json");
        let token = format!("eyJhbGciOiJIUzI1NiJ9.{payload}.sig");
        assert_eq!(extract_exp(&token), Err(JwtValidationError::MalformedToken));
    }

    #[test]
    fn test_extract_exp_oversized_token() {
        let token = "a".repeat(MAX_JWT_SIZE_BYTES + 1);
        assert_eq!(extract_exp(&token), Err(JwtValidationError::TokenTooLarge));
    }

    #[test]
    fn test_error_messages_are_generic() {
        let messages = [
            JwtValidationError::TokenTooLarge.to_string(),
            JwtValidationError::MalformedToken.to_string(),
            JwtValidationError::MissingExp.to_string(),
            JwtValidationError::IatTooFarInFuture.to_string(),
        ];
        assert!(messages
            .iter()
            .all(|m| m == "The access token is invalid or expired"));
    }

    // -------------------------------------------------------------------------
    // validate_iat_at
    // -------------------------------------------------------------------------

    #[test]
    fn test_validate_iat_within_skew() {
        let now = 1_700_000_000;
        assert!(validate_iat_at(now, DEFAULT_CLOCK_SKEW, now).is_ok());
        assert!(validate_iat_at(now + 30, DEFAULT_CLOCK_SKEW, now).is_ok());
        assert!(validate_iat_at(now - 3600, DEFAULT_CLOCK_SKEW, now).is_ok());
    }

    #[test]
    fn test_validate_iat_beyond_skew() {
        let now = 1_700_000_000;
        assert_eq!(
            validate_iat_at(now + 31, DEFAULT_CLOCK_SKEW, now),
            Err(JwtValidationError::IatTooFarInFuture)
        );
    }

    // -------------------------------------------------------------------------
    // ServiceClaims
    // -------------------------------------------------------------------------

    #[test]
    fn test_claims_debug_redacts_subject() {
        let claims = ServiceClaims {
            sub: "roadside-api".to_string(),
            jti: "5b1d2f0c".to_string(),
            iss: "https://issuer.example".to_string(),
            aud: "roadside".to_string(),
            iat: 1_700_000_000,
            exp: 1_700_003_600,
        };

        let debug_str = format!("{claims:?}");
        assert!(!debug_str.contains("roadside-api"));
        assert!(debug_str.contains("[REDACTED]"));
        assert!(debug_str.contains("5b1d2f0c"));
        assert_eq!(claims.lifetime_secs(), 3600);
    }

    #[test]
    fn test_claims_serialize_with_standard_names() {
        let claims = ServiceClaims {
            sub: "roadside-api".to_string(),
            jti: "id".to_string(),
            iss: "iss".to_string(),
            aud: "aud".to_string(),
            iat: 1,
            exp: 2,
        };

        let value = serde_json::to_value(&claims).unwrap();
        for key in ["sub", "jti", "iss", "aud", "iat", "exp"] {
            assert!(value.get(key).is_some(), "missing claim {key}");
        }
    }
}
