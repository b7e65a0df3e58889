//! Bearer-token request interceptor.
//!
//! Attaches the cached token to every outbound request, acquiring one first
//! when the cache is empty or stale. When the API answers 401 the cached
//! token is dropped, a new one is acquired, and the request is sent exactly
//! once more. A second 401 goes back to the caller unchanged.

use crate::errors::{AcquisitionError, ClientError};
use crate::metrics;
use crate::token_acquirer::TokenAcquirer;
use crate::token_cache::TokenCache;
use common::secret::{ExposeSecret, SecretString};
use reqwest::header::{HeaderValue, AUTHORIZATION};
use reqwest::StatusCode;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

pub struct RequestInterceptor {
    http: reqwest::Client,
    cache: Arc<TokenCache>,
    acquirer: TokenAcquirer,
    /// Serializes acquisitions so concurrent misses share one issuer call.
    acquire_gate: Mutex<()>,
}

impl RequestInterceptor {
    pub fn new(http: reqwest::Client, cache: Arc<TokenCache>, acquirer: TokenAcquirer) -> Self {
        Self {
            http,
            cache,
            acquirer,
            acquire_gate: Mutex::new(()),
        }
    }

    /// Cached token, or a newly acquired one on a miss.
    ///
    /// Callers that miss together wait on the same acquisition; whoever gets
    /// the gate second finds the fresh token in the cache.
    pub async fn token(&self) -> Result<SecretString, AcquisitionError> {
        if let Some(token) = self.cache.get() {
            return Ok(token);
        }

        let _gate = self.acquire_gate.lock().await;
        if let Some(token) = self.cache.get() {
            debug!(target: "client.interceptor", "Token refreshed by concurrent caller");
            return Ok(token);
        }

        self.acquirer.acquire().await
    }

    /// Acquire regardless of what the cache holds.
    async fn forced_token(&self) -> Result<SecretString, AcquisitionError> {
        let _gate = self.acquire_gate.lock().await;
        self.acquirer.acquire().await
    }

    /// Send `request` with a bearer token, replaying it once on 401.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Acquisition` if no token can be obtained; the
    /// request is never sent without one. Transport failures map to
    /// `Transport` or `Timeout`. HTTP error statuses are returned as
    /// responses, not errors.
    pub async fn execute(
        &self,
        request: reqwest::Request,
    ) -> Result<reqwest::Response, ClientError> {
        // Streaming bodies cannot be replayed; those requests get no retry
        let replay = request.try_clone();

        let token = self.token().await?;
        let response = self.send_authorized(request, &token).await?;

        if response.status() != StatusCode::UNAUTHORIZED {
            return Ok(response);
        }

        let Some(replay) = replay else {
            warn!(
                target: "client.interceptor",
                "API returned 401 for a request that cannot be replayed"
            );
            return Ok(response);
        };

        info!(
            target: "client.interceptor",
            url = %replay.url(),
            "API rejected token, refreshing and retrying once"
        );
        self.cache.invalidate();
        metrics::record_unauthorized_retry();

        let token = self.forced_token().await?;
        let response = self.send_authorized(replay, &token).await?;

        if response.status() == StatusCode::UNAUTHORIZED {
            warn!(
                target: "client.interceptor",
                "API rejected freshly acquired token"
            );
        }

        Ok(response)
    }

    async fn send_authorized(
        &self,
        mut request: reqwest::Request,
        token: &SecretString,
    ) -> Result<reqwest::Response, ClientError> {
        let mut value = HeaderValue::from_str(&format!("Bearer {}", token.expose_secret()))
            .map_err(|e| AcquisitionError::InvalidToken(e.to_string()))?;
        value.set_sensitive(true);
        request.headers_mut().insert(AUTHORIZATION, value);

        Ok(self.http.execute(request).await?)
    }
}

// =============================================================================
// Tests
// =============================================================================
