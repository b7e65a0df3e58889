use crate::errors::AuthError;
use crate::middleware::ClaimsExt;
use crate::routes::AppState;
use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::sync::Arc;

/// Issue a service token
///
/// POST /api/auth/token
///
/// Credentials come from `Authorization: Basic ...`; there is no body.
/// `200` carries the compact token as plain text, `400` a plain-text reason.
pub async fn handle_token(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Response {
    let Some(value) = headers.get(header::AUTHORIZATION) else {
        tracing::debug!(target: "auth.handler", "Token request without Authorization header");
        return AuthError::MissingAuthorization.into_plain_response();
    };

    let Ok(value) = value.to_str() else {
        return AuthError::MalformedCredential.into_plain_response();
    };

    match state.token_service.issue_token(value) {
        Ok(token) => (StatusCode::OK, token).into_response(),
        Err(e) => e.into_plain_response(),
    }
}

/// Reachability probe
///
/// GET /api/auth/ping
pub async fn handle_ping() -> StatusCode {
    StatusCode::OK
}

#[derive(Debug, Serialize)]
pub struct WhoAmIResponse {
    pub sub: String,
    pub jti: String,
    pub exp: i64,
}

/// Describe the presented bearer token
///
/// GET /api/auth/whoami (bearer required)
pub async fn handle_whoami(req: Request) -> Result<Json<WhoAmIResponse>, AuthError> {
    let claims = req.claims().ok_or_else(|| {
        tracing::error!(target: "auth.handler", "whoami reached without bearer middleware");
        AuthError::Internal
    })?;

    Ok(Json(WhoAmIResponse {
        sub: claims.sub.clone(),
        jti: claims.jti.clone(),
        exp: claims.exp,
    }))
}

/// Liveness probe
///
/// GET /health
pub async fn health_check() -> &'static str {
    "OK"
}
