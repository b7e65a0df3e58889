//! Authenticated API client.
//!
//! Wraps a `reqwest::Client` so that every request goes through the
//! [`RequestInterceptor`]. Typed helpers treat any non-2xx status as
//! [`ClientError::UnexpectedStatus`]; [`ApiClient::send`] hands the raw
//! response back instead.

use crate::config::{ClientConfig, DEFAULT_CONNECT_TIMEOUT_SECONDS};
use crate::errors::{AcquisitionError, ClientError};
use crate::interceptor::RequestInterceptor;
use crate::token_acquirer::TokenAcquirer;
use crate::token_cache::TokenCache;
use common::clock::{Clock, SystemClock};
use reqwest::{Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument};

/// Client for the protected API.
///
/// # Example
///
/// ```rust,ignore
/// let client = ApiClient::new(ClientConfig::from_env()?)?;
/// let profile: Profile = client.get_json("/api/profile").await?;
/// ```
pub struct ApiClient {
    base_url: String,
    http: reqwest::Client,
    cache: Arc<TokenCache>,
    interceptor: RequestInterceptor,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .field("cache", &self.cache)
            .finish_non_exhaustive()
    }
}

/// Shared HTTP client with the configured request and connect timeouts.
pub(crate) fn build_http_client(timeout: Duration) -> Result<reqwest::Client, AcquisitionError> {
    reqwest::Client::builder()
        .timeout(timeout)
        .connect_timeout(Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECONDS))
        .build()
        .map_err(|e| AcquisitionError::Configuration(format!("Failed to build HTTP client: {e}")))
}

impl ApiClient {
    /// Build a client using the system clock.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Acquisition(Configuration)` if the HTTP client
    /// cannot be constructed.
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Build a client whose token cache reads time from `clock`.
    pub fn with_clock(config: ClientConfig, clock: Arc<dyn Clock>) -> Result<Self, ClientError> {
        let http = build_http_client(config.http_timeout)?;
        let cache = Arc::new(TokenCache::new(clock, config.expiry_skew));
        let acquirer = TokenAcquirer::new(&config, http.clone(), Arc::clone(&cache));
        let interceptor = RequestInterceptor::new(http.clone(), Arc::clone(&cache), acquirer);

        Ok(Self {
            base_url: config.api_base_url,
            http,
            cache,
            interceptor,
        })
    }

    /// The cache shared by this client's interceptor.
    pub fn token_cache(&self) -> &Arc<TokenCache> {
        &self.cache
    }

    /// Resolve `path` against the API base URL. Absolute URLs pass through.
    pub fn url(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            path.to_string()
        } else {
            format!("{}/{}", self.base_url, path.trim_start_matches('/'))
        }
    }

    /// Start a request against the API. Send it with [`ApiClient::send`].
    pub fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.http.request(method, self.url(path))
    }

    /// Send a prepared request with bearer authentication.
    ///
    /// The response is returned whatever its status. A request-level
    /// timeout set on the builder is honored and surfaces as
    /// `ClientError::Timeout`.
    pub async fn send(&self, builder: RequestBuilder) -> Result<reqwest::Response, ClientError> {
        let request = builder.build()?;
        debug!(
            target: "client.api",
            method = %request.method(),
            url = %request.url(),
            "Sending API request"
        );
        self.interceptor.execute(request).await
    }

    /// Like [`ApiClient::send`], abandoning the request when `cancel` fires.
    ///
    /// Abandoning mid-acquisition leaves the token cache as it was.
    pub async fn send_with_cancel(
        &self,
        builder: RequestBuilder,
        cancel: &CancellationToken,
    ) -> Result<reqwest::Response, ClientError> {
        tokio::select! {
            biased;
            () = cancel.cancelled() => {
                debug!(target: "client.api", "API request cancelled");
                Err(ClientError::Cancelled)
            }
            result = self.send(builder) => result,
        }
    }

    #[instrument(skip_all, fields(path = %path))]
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        let response = self.send(self.request(Method::GET, path)).await?;
        Ok(success(response)?.json::<T>().await?)
    }

    #[instrument(skip_all, fields(path = %path))]
    pub async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T, ClientError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self
            .send(self.request(Method::POST, path).json(body))
            .await?;
        Ok(success(response)?.json::<T>().await?)
    }

    /// POST a JSON body and return the response body as text.
    #[instrument(skip_all, fields(path = %path))]
    pub async fn post_for_text<B>(&self, path: &str, body: &B) -> Result<String, ClientError>
    where
        B: Serialize + ?Sized,
    {
        let response = self
            .send(self.request(Method::POST, path).json(body))
            .await?;
        Ok(success(response)?.text().await?)
    }
}

fn success(response: reqwest::Response) -> Result<reqwest::Response, ClientError> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        debug!(target: "client.api", status = %status, "API returned error status");
        Err(ClientError::UnexpectedStatus(status.as_u16()))
    }
}

// =============================================================================
// Tests
// =============================================================================
