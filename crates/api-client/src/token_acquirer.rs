//! Token acquisition from the issuer.
//!
//! One call is one `POST {issuer}/api/auth/token` carrying the client
//! credential as HTTP Basic. A 200 body is the bare token; anything else is
//! a typed [`AcquisitionError`]. No retries happen here.

use crate::config::ClientConfig;
use crate::errors::AcquisitionError;
use crate::metrics;
use crate::token_cache::TokenCache;
use common::secret::{ExposeSecret, SecretString};
use std::sync::Arc;
use tracing::{debug, instrument, trace, warn};

/// Fetches tokens and writes them into the shared cache.
pub struct TokenAcquirer {
    http: reqwest::Client,
    token_url: String,
    client_id: String,
    client_secret: SecretString,
    cache: Arc<TokenCache>,
}

impl std::fmt::Debug for TokenAcquirer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenAcquirer")
            .field("token_url", &self.token_url)
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .finish_non_exhaustive()
    }
}

impl TokenAcquirer {
    pub fn new(config: &ClientConfig, http: reqwest::Client, cache: Arc<TokenCache>) -> Self {
        Self {
            http,
            token_url: config.token_url(),
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
            cache,
        }
    }

    /// Request a new token and cache it.
    ///
    /// The cache is written once, after the whole exchange succeeded. A
    /// failed or abandoned acquisition leaves it untouched.
    ///
    /// # Errors
    ///
    /// - `Rejected` for any non-2xx status (400 means a bad credential)
    /// - `Transport` when the issuer cannot be reached or times out
    /// - `InvalidToken` when the body is empty or has no readable `exp`
    #[instrument(skip_all, name = "client.acquire_token")]
    pub async fn acquire(&self) -> Result<SecretString, AcquisitionError> {
        let result = self.request_token().await;
        metrics::record_token_acquisition(if result.is_ok() { "success" } else { "error" });
        result
    }

    async fn request_token(&self) -> Result<SecretString, AcquisitionError> {
        debug!(
            target: "client.acquirer",
            client_id = %self.client_id,
            url = %self.token_url,
            "Requesting token from issuer"
        );

        let response = self
            .http
            .post(&self.token_url)
            .basic_auth(&self.client_id, Some(self.client_secret.expose_secret()))
            .send()
            .await
            .map_err(|e| {
                debug!(target: "client.acquirer", error = %e, "HTTP request failed");
                AcquisitionError::Transport(e.to_string())
            })?;

        let status = response.status();

        if !status.is_success() {
            // Issuer error bodies are short and public, but keep them out of
            // normal logs anyway
            let body = response.text().await.unwrap_or_else(|e| {
                trace!(target: "client.acquirer", error = %e, "Failed to read error response body");
                String::new()
            });
            warn!(
                target: "client.acquirer",
                status = %status,
                "Issuer rejected token request"
            );
            trace!(target: "client.acquirer", body = %body, "Rejection response body");

            return Err(AcquisitionError::Rejected {
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or("Unknown").to_string(),
            });
        }

        let body = response.text().await.map_err(|e| {
            warn!(target: "client.acquirer", error = %e, "Failed to read token response");
            AcquisitionError::Transport(e.to_string())
        })?;

        let token = body.trim();
        if token.is_empty() {
            warn!(target: "client.acquirer", "Issuer returned an empty token");
            return Err(AcquisitionError::InvalidToken("empty response body".to_string()));
        }

        let token = SecretString::from(token.to_string());
        let expires_at = self.cache.store(token.clone()).map_err(|e| {
            warn!(target: "client.acquirer", error = %e, "Issued token has no readable expiry");
            AcquisitionError::InvalidToken(e.to_string())
        })?;

        debug!(
            target: "client.acquirer",
            expires_at = %expires_at,
            "Token acquired successfully"
        );

        Ok(token)
    }
}

// =============================================================================
// Tests
// =============================================================================
