use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Generic message for every bearer verification failure.
pub const INVALID_TOKEN_MESSAGE: &str = "The access token is invalid or expired";

/// Errors raised by the issuer and the bearer verification layer.
///
/// Credential failures never cross the HTTP boundary as anything other than
/// a rejected request: `400` on the issuance endpoint, `401` on protected
/// routes.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Missing Authorization header")]
    MissingAuthorization,

    #[error("Malformed client credential")]
    MalformedCredential,

    #[error("Unknown client id")]
    InvalidClient,

    #[error("Invalid client secret")]
    InvalidSecret,

    #[error("Token signing failed: {0}")]
    SigningError(String),

    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Internal server error")]
    Internal,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    code: String,
    message: String,
}

impl AuthError {
    /// HTTP status for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::MissingAuthorization
            | AuthError::MalformedCredential
            | AuthError::InvalidClient
            | AuthError::InvalidSecret => StatusCode::BAD_REQUEST,
            AuthError::InvalidToken(_) => StatusCode::UNAUTHORIZED,
            AuthError::SigningError(_) | AuthError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Stable error code for the JSON envelope.
    pub fn code(&self) -> &'static str {
        match self {
            AuthError::MissingAuthorization => "MISSING_AUTHORIZATION",
            AuthError::MalformedCredential => "MALFORMED_CREDENTIAL",
            AuthError::InvalidClient | AuthError::InvalidSecret => "INVALID_CREDENTIALS",
            AuthError::SigningError(_) => "SIGNING_ERROR",
            AuthError::InvalidToken(_) => "INVALID_TOKEN",
            AuthError::Internal => "INTERNAL_ERROR",
        }
    }

    /// Client-facing reason. Unknown client and wrong secret share one
    /// message so callers cannot probe for valid client ids.
    pub fn public_message(&self) -> String {
        match self {
            AuthError::MissingAuthorization => "Missing Authorization header".to_string(),
            AuthError::MalformedCredential => "Malformed client credential".to_string(),
            AuthError::InvalidClient | AuthError::InvalidSecret => {
                "Invalid client credentials".to_string()
            }
            AuthError::SigningError(_) => "Token could not be issued".to_string(),
            AuthError::InvalidToken(reason) => reason.clone(),
            AuthError::Internal => "An internal error occurred".to_string(),
        }
    }

    /// Plain-text rejection for the token issuance endpoint, whose body is
    /// either the compact token or a human-readable reason.
    pub fn into_plain_response(self) -> Response {
        (self.status_code(), self.public_message()).into_response()
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let error_response = ErrorResponse {
            error: ErrorDetail {
                code: self.code().to_string(),
                message: self.public_message(),
            },
        };

        let mut response = (status, Json(error_response)).into_response();

        if status == StatusCode::UNAUTHORIZED {
            let challenge = "Bearer realm=\"roadside-api\", error=\"invalid_token\"";
            if let Ok(header_value) = challenge.parse() {
                response
                    .headers_mut()
                    .insert(header::WWW_AUTHENTICATE, header_value);
            }
        }

        response
    }
}
