//! Builder for hand-crafted service tokens.

use crate::credential_fixtures::{TEST_AUDIENCE, TEST_ISSUER, TEST_SECRET_KEY, TEST_SUBJECT};
use chrono::{Duration, Utc};
use common::jwt::ServiceClaims;
use jsonwebtoken::{encode, EncodingKey, Header};

/// Builds signed HS256 tokens with arbitrary claims.
///
/// Defaults match the fixtures, so `TestTokenBuilder::new().build()` is a
/// token the test server accepts.
///
/// # Example
/// ```rust,ignore
/// let stale = TestTokenBuilder::new().expires_in(-60).build();
/// let forged = TestTokenBuilder::new().signed_with("some-other-key-material-32-bytes").build();
/// ```
pub struct TestTokenBuilder {
    claims: ServiceClaims,
    key: String,
}

impl TestTokenBuilder {
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            claims: ServiceClaims {
                sub: TEST_SUBJECT.to_string(),
                jti: uuid::Uuid::new_v4().to_string(),
                iss: TEST_ISSUER.to_string(),
                aud: TEST_AUDIENCE.to_string(),
                iat: now.timestamp(),
                exp: (now + Duration::seconds(3600)).timestamp(),
            },
            key: TEST_SECRET_KEY.to_string(),
        }
    }

    /// Set `exp` relative to now (negative for an already expired token).
    pub fn expires_in(mut self, seconds: i64) -> Self {
        self.claims.exp = (Utc::now() + Duration::seconds(seconds)).timestamp();
        self
    }

    /// Set `exp` to an absolute Unix timestamp.
    pub fn expires_at(mut self, timestamp: i64) -> Self {
        self.claims.exp = timestamp;
        self
    }

    pub fn issued_at(mut self, timestamp: i64) -> Self {
        self.claims.iat = timestamp;
        self
    }

    pub fn with_audience(mut self, audience: &str) -> Self {
        self.claims.aud = audience.to_string();
        self
    }

    pub fn with_issuer(mut self, issuer: &str) -> Self {
        self.claims.iss = issuer.to_string();
        self
    }

    pub fn with_jti(mut self, jti: &str) -> Self {
        self.claims.jti = jti.to_string();
        self
    }

    /// Sign with a different HMAC key.
    pub fn signed_with(mut self, key: &str) -> Self {
        self.key = key.to_string();
        self
    }

    /// The claim set the token will carry.
    pub fn claims(&self) -> &ServiceClaims {
        &self.claims
    }

    /// Sign and return the compact token.
    pub fn build(self) -> String {
        encode(
            &Header::default(),
            &self.claims,
            &EncodingKey::from_secret(self.key.as_bytes()),
        )
        .expect("HS256 encoding of test claims cannot fail")
    }
}

impl Default for TestTokenBuilder {
    fn default() -> Self {
        Self::new()
    }
}
