use common::jwt::{DEFAULT_CLOCK_SKEW, MAX_CLOCK_SKEW};
use common::secret::{ExposeSecret, SecretString};
use std::collections::HashMap;
use std::env;
use std::fmt;
use thiserror::Error;

/// Default bind address for the HTTP listener.
pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:8080";

/// Default token lifetime in minutes.
pub const DEFAULT_EXPIRY_MINUTES: i64 = 60;

/// Maximum token lifetime in minutes (24 hours).
pub const MAX_EXPIRY_MINUTES: i64 = 1440;

/// Default `sub` claim placed in every issued token.
pub const DEFAULT_SUBJECT: &str = "roadside-api";

/// Default clock skew tolerance (seconds) for bearer verification.
#[allow(clippy::cast_possible_wrap)]
pub const DEFAULT_JWT_CLOCK_SKEW_SECONDS: i64 = DEFAULT_CLOCK_SKEW.as_secs() as i64;

/// Maximum allowed clock skew tolerance (seconds).
#[allow(clippy::cast_possible_wrap)]
pub const MAX_JWT_CLOCK_SKEW_SECONDS: i64 = MAX_CLOCK_SKEW.as_secs() as i64;

/// Minimum HMAC key length in bytes. HS256 keys shorter than the digest size
/// are rejected.
pub const MIN_SECRET_KEY_BYTES: usize = 32;

/// Issuer configuration.
///
/// Secrets are held in `SecretString` and redacted from `Debug` output.
#[derive(Clone)]
pub struct Config {
    pub bind_address: String,
    pub issuer: String,
    pub audience: String,
    pub secret_key: SecretString,
    pub expiry_minutes: i64,
    pub client_id: String,
    pub client_secret: SecretString,
    pub subject: String,
    pub clock_skew_seconds: i64,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("bind_address", &self.bind_address)
            .field("issuer", &self.issuer)
            .field("audience", &self.audience)
            .field("secret_key", &"[REDACTED]")
            .field("expiry_minutes", &self.expiry_minutes)
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .field("subject", &self.subject)
            .field("clock_skew_seconds", &self.clock_skew_seconds)
            .finish()
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid secret key: {0}")]
    InvalidSecretKey(String),

    #[error("Invalid expiry minutes: {0}")]
    InvalidExpiryMinutes(String),

    #[error("Invalid clock skew: {0}")]
    InvalidClockSkew(String),
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

        let issuer = required(vars, "JWT_ISSUER")?;
        let audience = required(vars, "JWT_AUDIENCE")?;

        let secret_key = required(vars, "JWT_SECRET_KEY")?;
        if secret_key.len() < MIN_SECRET_KEY_BYTES {
            return Err(ConfigError::InvalidSecretKey(format!(
                "Expected at least {} bytes, got {}",
                MIN_SECRET_KEY_BYTES,
                secret_key.len()
            )));
        }

        let expiry_minutes = match vars.get("JWT_EXPIRY_MINUTES") {
            Some(value) => {
                let minutes: i64 = value.parse().map_err(|e| {
                    ConfigError::InvalidExpiryMinutes(format!(
                        "JWT_EXPIRY_MINUTES must be an integer, got '{}': {}",
                        value, e
                    ))
                })?;
                if !(1..=MAX_EXPIRY_MINUTES).contains(&minutes) {
                    return Err(ConfigError::InvalidExpiryMinutes(format!(
                        "JWT_EXPIRY_MINUTES must be between 1 and {}, got {}",
                        MAX_EXPIRY_MINUTES, minutes
                    )));
                }
                minutes
            }
            None => DEFAULT_EXPIRY_MINUTES,
        };

        let client_id = required(vars, "JWT_CLIENT_ID")?;
        let client_secret = required(vars, "JWT_CLIENT_SECRET")?;

        let subject = vars
            .get("JWT_SUBJECT")
            .filter(|s| !s.is_empty())
            .cloned()
            .unwrap_or_else(|| DEFAULT_SUBJECT.to_string());

        let clock_skew_seconds = match vars.get("JWT_CLOCK_SKEW_SECONDS") {
            Some(value) => {
                let skew: i64 = value.parse().map_err(|e| {
                    ConfigError::InvalidClockSkew(format!(
                        "JWT_CLOCK_SKEW_SECONDS must be an integer, got '{}': {}",
                        value, e
                    ))
                })?;
                if !(0..=MAX_JWT_CLOCK_SKEW_SECONDS).contains(&skew) {
                    return Err(ConfigError::InvalidClockSkew(format!(
                        "JWT_CLOCK_SKEW_SECONDS must be between 0 and {}, got {}",
                        MAX_JWT_CLOCK_SKEW_SECONDS, skew
                    )));
                }
                skew
            }
            None => DEFAULT_JWT_CLOCK_SKEW_SECONDS,
        };

        Ok(Config {
            bind_address,
            issuer,
            audience,
            secret_key: SecretString::from(secret_key),
            expiry_minutes,
            client_id,
            client_secret: SecretString::from(client_secret),
            subject,
            clock_skew_seconds,
        })
    }

    /// Raw HMAC key bytes.
    pub fn secret_key_bytes(&self) -> &[u8] {
        self.secret_key.expose_secret().as_bytes()
    }
}

fn required(vars: &HashMap<String, String>, name: &str) -> Result<String, ConfigError> {
    vars.get(name)
        .filter(|v| !v.is_empty())
        .cloned()
        .ok_or_else(|| ConfigError::MissingEnvVar(name.to_string()))
}
