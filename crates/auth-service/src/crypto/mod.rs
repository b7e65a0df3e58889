//! Token signing and verification (HS256).

use crate::config::Config;
use crate::credentials::ValidatedIdentity;
use crate::errors::{AuthError, INVALID_TOKEN_MESSAGE};
use crate::observability::metrics::record_token_validation;
use common::clock::Clock;
use common::jwt::{validate_iat_at, ServiceClaims, MAX_JWT_SIZE_BYTES};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use std::sync::Arc;
use std::time::Duration;
use tracing::instrument;
use uuid::Uuid;

/// Builds and signs service tokens.
///
/// Output depends only on the identity, the configuration, and the clock
/// (plus a fresh random `jti`).
pub struct TokenIssuer {
    encoding_key: Option<EncodingKey>,
    subject: String,
    issuer: String,
    audience: String,
    lifetime_secs: i64,
    clock: Arc<dyn Clock>,
}

impl TokenIssuer {
    pub fn new(config: &Config, clock: Arc<dyn Clock>) -> Self {
        let key_bytes = config.secret_key_bytes();
        let encoding_key = if key_bytes.is_empty() {
            None
        } else {
            Some(EncodingKey::from_secret(key_bytes))
        };

        Self {
            encoding_key,
            subject: config.subject.clone(),
            issuer: config.issuer.clone(),
            audience: config.audience.clone(),
            lifetime_secs: config.expiry_minutes.saturating_mul(60),
            clock,
        }
    }

    /// Sign a fresh token for a validated identity.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::SigningError` if no key is configured or encoding
    /// fails.
    #[instrument(skip_all)]
    pub fn issue(&self, _identity: &ValidatedIdentity) -> Result<String, AuthError> {
        let encoding_key = self.encoding_key.as_ref().ok_or_else(|| {
            tracing::error!(target: "auth.token", "No signing key configured");
            AuthError::SigningError("signing key is not configured".to_string())
        })?;

        let iat = self.clock.now().timestamp();
        let claims = ServiceClaims {
            sub: self.subject.clone(),
            jti: Uuid::new_v4().to_string(),
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
            iat,
            exp: iat.saturating_add(self.lifetime_secs),
        };

        let header = Header::new(Algorithm::HS256);

        encode(&header, &claims, encoding_key).map_err(|e| {
            tracing::error!(target: "auth.token", error = %e, "Token signing failed");
            AuthError::SigningError(format!("JWT signing operation failed: {}", e))
        })
    }
}

/// Verifies bearer tokens presented to protected routes.
///
/// Checks, in order: size, HS256 signature, `iss`, `aud`, `exp` (with skew
/// leeway against the injected clock), and that `iat` is not in the future.
/// Every failure maps to the same generic `InvalidToken`.
pub struct TokenVerifier {
    decoding_key: DecodingKey,
    validation: Validation,
    clock_skew: Duration,
    clock: Arc<dyn Clock>,
}

impl TokenVerifier {
    pub fn new(config: &Config, clock: Arc<dyn Clock>) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // exp is checked against the injected clock below
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.set_issuer(&[config.issuer.as_str()]);
        validation.set_audience(&[config.audience.as_str()]);
        validation.set_required_spec_claims(&["exp", "iss", "aud", "sub"]);

        Self {
            decoding_key: DecodingKey::from_secret(config.secret_key_bytes()),
            validation,
            clock_skew: Duration::from_secs(config.clock_skew_seconds.unsigned_abs()),
            clock,
        }
    }

    /// Verify a compact token and return its claims.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidToken` with a generic message on any failure.
    #[instrument(skip_all)]
    pub fn verify(&self, token: &str) -> Result<ServiceClaims, AuthError> {
        let result = self.verify_inner(token);
        match &result {
            Ok(_) => record_token_validation("success", None),
            Err(_) => record_token_validation("error", Some("cryptographic")),
        }
        result
    }

    fn verify_inner(&self, token: &str) -> Result<ServiceClaims, AuthError> {
        if token.len() > MAX_JWT_SIZE_BYTES {
            tracing::debug!(
                target: "auth.token",
                token_size = token.len(),
                max_size = MAX_JWT_SIZE_BYTES,
                "Token rejected: size exceeds maximum allowed"
            );
            return Err(invalid_token());
        }

        let token_data =
            decode::<ServiceClaims>(token, &self.decoding_key, &self.validation).map_err(|e| {
                tracing::debug!(target: "auth.token", error = %e, "Token verification failed");
                invalid_token()
            })?;
        let claims = token_data.claims;

        let now = self.clock.now().timestamp();
        // clock_skew is bounded by MAX_JWT_CLOCK_SKEW_SECONDS
        #[allow(clippy::cast_possible_wrap)]
        let skew_secs = self.clock_skew.as_secs() as i64;
        if claims.exp.saturating_add(skew_secs) <= now {
            tracing::debug!(
                target: "auth.token",
                exp = claims.exp,
                now = now,
                "Token rejected: expired"
            );
            return Err(invalid_token());
        }

        validate_iat_at(claims.iat, self.clock_skew, now).map_err(|_| invalid_token())?;

        Ok(claims)
    }
}

fn invalid_token() -> AuthError {
    AuthError::InvalidToken(INVALID_TOKEN_MESSAGE.to_string())
}
