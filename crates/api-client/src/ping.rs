//! Unauthenticated issuer liveness probe.

use crate::api_client::build_http_client;
use crate::errors::ClientError;
use std::time::Duration;
use tracing::debug;

/// Checks that the issuer is up via `GET {issuer}/api/auth/ping`.
#[derive(Debug, Clone)]
pub struct PingClient {
    http: reqwest::Client,
    url: String,
}

impl PingClient {
    pub fn new(issuer_url: &str, timeout: Duration) -> Result<Self, ClientError> {
        Ok(Self {
            http: build_http_client(timeout)?,
            url: format!("{}/api/auth/ping", issuer_url.trim_end_matches('/')),
        })
    }

    /// `true` only for a 2xx answer. Transport failures and timeouts are `false`.
    pub async fn ping(&self) -> bool {
        match self.http.get(&self.url).send().await {
            Ok(response) => {
                let ok = response.status().is_success();
                if !ok {
                    debug!(
                        target: "client.ping",
                        status = %response.status(),
                        "Issuer ping failed"
                    );
                }
                ok
            }
            Err(e) => {
                debug!(target: "client.ping", error = %e, "Issuer unreachable");
                false
            }
        }
    }
}
