//! Bearer authentication for protected routes.
//!
//! Extracts `Authorization: Bearer <token>`, verifies it with the
//! [`TokenVerifier`], and stores the claims in request extensions.

use crate::crypto::TokenVerifier;
use crate::errors::AuthError;
use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::IntoResponse,
};
use common::jwt::ServiceClaims;
use std::sync::Arc;
use tracing::instrument;

/// State for the bearer middleware.
#[derive(Clone)]
pub struct AuthState {
    pub verifier: Arc<TokenVerifier>,
}

fn extract_bearer_token(req: &Request) -> Result<&str, AuthError> {
    let auth_header = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| {
            tracing::debug!(target: "auth.middleware", "Missing Authorization header");
            AuthError::InvalidToken("Missing Authorization header".to_string())
        })?;

    auth_header.strip_prefix("Bearer ").ok_or_else(|| {
        tracing::debug!(target: "auth.middleware", "Invalid Authorization header format");
        AuthError::InvalidToken("Invalid Authorization header format".to_string())
    })
}

/// Reject the request with `401` unless it carries a valid service token.
#[instrument(skip_all, name = "auth.middleware.bearer")]
pub async fn require_bearer(
    State(state): State<Arc<AuthState>>,
    mut req: Request,
    next: Next,
) -> Result<impl IntoResponse, AuthError> {
    let token = extract_bearer_token(&req)?;
    let claims = state.verifier.verify(token)?;

    req.extensions_mut().insert(claims);

    Ok(next.run(req).await)
}

/// Access verified claims from a request that passed [`require_bearer`].
pub trait ClaimsExt {
    /// `None` when the bearer middleware was not applied.
    fn claims(&self) -> Option<&ServiceClaims>;
}

impl<B> ClaimsExt for axum::extract::Request<B> {
    fn claims(&self) -> Option<&ServiceClaims> {
        self.extensions().get::<ServiceClaims>()
    }
}
