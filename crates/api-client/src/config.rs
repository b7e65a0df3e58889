//! Client configuration.
//!
//! Holds the issuer and API endpoints plus the client credential used to
//! obtain tokens. The credential secret is never printed.

use common::jwt::MAX_CLOCK_SKEW;
use common::secret::SecretString;
use std::collections::HashMap;
use std::time::Duration;
use thiserror::Error;

/// Default HTTP timeout for issuer and API requests.
pub const DEFAULT_HTTP_TIMEOUT_SECONDS: u64 = 10;

/// Connect timeout applied to every outbound connection.
pub const DEFAULT_CONNECT_TIMEOUT_SECONDS: u64 = 5;

/// Default margin subtracted from a token's `exp` before it is considered stale.
pub const DEFAULT_EXPIRY_SKEW_SECONDS: u64 = 0;

/// Upper bound on the expiry skew, matching the issuer's clock-skew cap.
pub const MAX_EXPIRY_SKEW_SECONDS: u64 = MAX_CLOCK_SKEW.as_secs();

/// Path on the issuer that hands out tokens.
pub const TOKEN_PATH: &str = "/api/auth/token";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid value for {name}: {reason}")]
    InvalidValue { name: String, reason: String },
}

/// Configuration for [`crate::ApiClient`].
#[derive(Clone)]
pub struct ClientConfig {
    /// Issuer base URL; tokens are requested from `{issuer_url}/api/auth/token`.
    pub issuer_url: String,

    /// Base URL that relative API paths are resolved against.
    pub api_base_url: String,

    pub client_id: String,

    pub client_secret: SecretString,

    /// Timeout for each HTTP request (default: 10 seconds).
    pub http_timeout: Duration,

    /// Subtracted from the token's `exp` when caching (default: 0).
    pub expiry_skew: Duration,
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("issuer_url", &self.issuer_url)
            .field("api_base_url", &self.api_base_url)
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .field("http_timeout", &self.http_timeout)
            .field("expiry_skew", &self.expiry_skew)
            .finish()
    }
}

impl ClientConfig {
    /// Create a configuration with default timeouts.
    ///
    /// Trailing slashes on both URLs are stripped.
    #[must_use]
    pub fn new(
        issuer_url: impl Into<String>,
        api_base_url: impl Into<String>,
        client_id: impl Into<String>,
        client_secret: SecretString,
    ) -> Self {
        Self {
            issuer_url: trim_trailing_slash(issuer_url.into()),
            api_base_url: trim_trailing_slash(api_base_url.into()),
            client_id: client_id.into(),
            client_secret,
            http_timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECONDS),
            expiry_skew: Duration::from_secs(DEFAULT_EXPIRY_SKEW_SECONDS),
        }
    }

    /// Like [`ClientConfig::new`], but refuses a non-HTTPS issuer.
    ///
    /// The client credential travels in the clear over plain HTTP.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if `issuer_url` is not `https://`.
    pub fn new_secure(
        issuer_url: impl Into<String>,
        api_base_url: impl Into<String>,
        client_id: impl Into<String>,
        client_secret: SecretString,
    ) -> Result<Self, ConfigError> {
        let issuer_url = issuer_url.into();
        if !issuer_url.starts_with("https://") {
            return Err(ConfigError::InvalidValue {
                name: "issuer_url".to_string(),
                reason: "must use HTTPS".to_string(),
            });
        }
        Ok(Self::new(issuer_url, api_base_url, client_id, client_secret))
    }

    #[must_use]
    pub fn with_http_timeout(mut self, timeout: Duration) -> Self {
        self.http_timeout = timeout;
        self
    }

    /// Set the expiry skew, capped at [`MAX_EXPIRY_SKEW_SECONDS`].
    #[must_use]
    pub fn with_expiry_skew(mut self, skew: Duration) -> Self {
        self.expiry_skew = skew.min(Duration::from_secs(MAX_EXPIRY_SKEW_SECONDS));
        self
    }

    /// Full URL of the issuer's token endpoint.
    pub fn token_url(&self) -> String {
        format!("{}{}", self.issuer_url, TOKEN_PATH)
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        let vars: HashMap<String, String> = std::env::vars().collect();
        Self::from_vars(&vars)
    }

    /// Build from a variable map (used by `from_env` and tests).
    ///
    /// Required: `API_BASE_URL`, `JWT_ISSUER`, `API_CLIENT_ID`, `API_CLIENT_SECRET`.
    /// Optional: `API_HTTP_TIMEOUT_SECONDS`, `API_TOKEN_EXPIRY_SKEW_SECONDS`.
    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let api_base_url = required(vars, "API_BASE_URL")?;
        let issuer_url = required(vars, "JWT_ISSUER")?;
        let client_id = required(vars, "API_CLIENT_ID")?;
        let client_secret = SecretString::from(required(vars, "API_CLIENT_SECRET")?);

        let http_timeout = optional_seconds(
            vars,
            "API_HTTP_TIMEOUT_SECONDS",
            DEFAULT_HTTP_TIMEOUT_SECONDS,
        )?;
        if http_timeout == 0 {
            return Err(ConfigError::InvalidValue {
                name: "API_HTTP_TIMEOUT_SECONDS".to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }

        let expiry_skew = optional_seconds(
            vars,
            "API_TOKEN_EXPIRY_SKEW_SECONDS",
            DEFAULT_EXPIRY_SKEW_SECONDS,
        )?;
        if expiry_skew > MAX_EXPIRY_SKEW_SECONDS {
            return Err(ConfigError::InvalidValue {
                name: "API_TOKEN_EXPIRY_SKEW_SECONDS".to_string(),
                reason: format!("must be at most {MAX_EXPIRY_SKEW_SECONDS}"),
            });
        }

        Ok(
            Self::new(issuer_url, api_base_url, client_id, client_secret)
                .with_http_timeout(Duration::from_secs(http_timeout))
                .with_expiry_skew(Duration::from_secs(expiry_skew)),
        )
    }
}

fn trim_trailing_slash(mut url: String) -> String {
    while url.ends_with('/') {
        url.pop();
    }
    url
}

fn required(vars: &HashMap<String, String>, name: &str) -> Result<String, ConfigError> {
    vars.get(name)
        .filter(|v| !v.is_empty())
        .cloned()
        .ok_or_else(|| ConfigError::MissingEnvVar(name.to_string()))
}

fn optional_seconds(
    vars: &HashMap<String, String>,
    name: &str,
    default: u64,
) -> Result<u64, ConfigError> {
    match vars.get(name) {
        None => Ok(default),
        Some(value) => value.parse::<u64>().map_err(|e| ConfigError::InvalidValue {
            name: name.to_string(),
            reason: e.to_string(),
        }),
    }
}
