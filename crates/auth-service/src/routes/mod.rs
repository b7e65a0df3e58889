//! HTTP routes for the token issuer.
//!
//! Defines the Axum router and application state.

use crate::config::Config;
use crate::crypto::TokenVerifier;
use crate::errors::AuthError;
use crate::handlers;
use crate::middleware::{http_metrics_middleware, require_bearer, AuthState};
use crate::services::TokenService;
use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use common::clock::Clock;
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

/// Application state shared across all handlers.
pub struct AppState {
    /// Credential validation and token signing.
    pub token_service: TokenService,

    /// Bearer verification for protected routes.
    pub verifier: Arc<TokenVerifier>,
}

impl AppState {
    /// Build state from configuration and a time source.
    ///
    /// # Errors
    ///
    /// Propagates `AuthError::Internal` from credential validator setup.
    pub fn new(config: &Config, clock: Arc<dyn Clock>) -> Result<Self, AuthError> {
        let token_service = TokenService::new(config, clock.clone())?;
        let verifier = Arc::new(TokenVerifier::new(config, clock));

        Ok(Self {
            token_service,
            verifier,
        })
    }
}

/// Build the application routes.
///
/// - `/api/auth/token` - token issuance (Basic credentials)
/// - `/api/auth/ping` - reachability probe
/// - `/api/auth/whoami` - echoes the presented bearer's claims (bearer required)
/// - `/health` - liveness probe
/// - `/metrics` - Prometheus scrape endpoint
pub fn build_routes(state: Arc<AppState>, metrics_handle: PrometheusHandle) -> Router {
    let auth_state = Arc::new(AuthState {
        verifier: state.verifier.clone(),
    });

    let public_routes = Router::new()
        .route("/health", get(handlers::health_check))
        .route("/api/auth/ping", get(handlers::handle_ping))
        .route("/api/auth/token", post(handlers::handle_token))
        .with_state(state.clone());

    let metrics_routes = Router::new()
        .route("/metrics", get(handlers::metrics_handler))
        .with_state(metrics_handle);

    let protected_routes = Router::new()
        .route("/api/auth/whoami", get(handlers::handle_whoami))
        .route_layer(middleware::from_fn_with_state(auth_state, require_bearer))
        .with_state(state);

    // Layer order (bottom-to-top execution):
    // 1. TimeoutLayer (innermost)
    // 2. TraceLayer
    // 3. http_metrics_middleware (outermost, sees every response)
    public_routes
        .merge(metrics_routes)
        .merge(protected_routes)
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(Duration::from_secs(30)))
        .layer(middleware::from_fn(http_metrics_middleware))
}
