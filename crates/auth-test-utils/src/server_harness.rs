//! Test server harness for end-to-end tests
//!
//! Provides `TestAuthServer` for spawning the real issuer router in tests.

use crate::credential_fixtures::test_config;
use auth_service::config::Config;
use auth_service::observability::metrics::init_metrics_recorder;
use auth_service::routes::{self, AppState};
use common::clock::{Clock, SystemClock};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::task::JoinHandle;

/// Running issuer bound to a random local port.
///
/// The server task is aborted when this value is dropped.
///
/// # Example
/// ```rust,ignore
/// let server = TestAuthServer::spawn().await?;
/// let response = reqwest::Client::new()
///     .post(format!("{}/api/auth/token", server.url()))
///     .header("authorization", basic_header(TEST_CLIENT_ID, TEST_CLIENT_SECRET))
///     .send()
///     .await?;
/// ```
pub struct TestAuthServer {
    addr: SocketAddr,
    handle: JoinHandle<()>,
}

impl TestAuthServer {
    /// Spawn with the fixture configuration and the system clock.
    pub async fn spawn() -> Result<Self, anyhow::Error> {
        Self::spawn_with(test_config(), Arc::new(SystemClock)).await
    }

    /// Spawn with an explicit configuration and time source.
    pub async fn spawn_with(config: Config, clock: Arc<dyn Clock>) -> Result<Self, anyhow::Error> {
        let state = Arc::new(
            AppState::new(&config, clock)
                .map_err(|e| anyhow::anyhow!("Failed to build app state: {}", e))?,
        );

        // The global recorder can only be installed once per process; later
        // servers get a standalone handle.
        let metrics_handle = match init_metrics_recorder() {
            Ok(handle) => handle,
            Err(_) => PrometheusBuilder::new().build_recorder().handle(),
        };

        let app = routes::build_routes(state, metrics_handle);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .map_err(|e| anyhow::anyhow!("Failed to bind test server: {}", e))?;

        let addr = listener
            .local_addr()
            .map_err(|e| anyhow::anyhow!("Failed to get local address: {}", e))?;

        let handle = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                eprintln!("Test server error: {}", e);
            }
        });

        Ok(Self { addr, handle })
    }

    /// Base URL of the test server
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }
}

impl Drop for TestAuthServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
