use thiserror::Error;

/// Failure to obtain a token from the issuer.
///
/// Acquisition never retries; the caller sees exactly what went wrong.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AcquisitionError {
    /// Issuer answered with a non-success status (400 for bad credentials).
    #[error("Issuer rejected token request with status {status}: {reason}")]
    Rejected { status: u16, reason: String },

    /// Connection, TLS or timeout failure talking to the issuer.
    #[error("Issuer request failed: {0}")]
    Transport(String),

    /// Issuer returned a body that is not a usable token.
    #[error("Issuer returned an invalid token: {0}")]
    InvalidToken(String),

    /// Local setup problem (HTTP client, header encoding).
    #[error("Configuration error: {0}")]
    Configuration(String),
}

/// Errors surfaced by the API client.
#[derive(Debug, Error)]
pub enum ClientError {
    /// No token could be attached; the request was never sent unauthenticated.
    #[error("Token acquisition failed: {0}")]
    Acquisition(#[from] AcquisitionError),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Request cancelled")]
    Cancelled,

    #[error("Request timed out")]
    Timeout,

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Failed to decode response: {0}")]
    Decode(String),

    #[error("Unexpected status: {0}")]
    UnexpectedStatus(u16),
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ClientError::Timeout
        } else if err.is_decode() {
            ClientError::Decode(err.to_string())
        } else if err.is_builder() {
            ClientError::InvalidRequest(err.to_string())
        } else {
            ClientError::Transport(err.to_string())
        }
    }
}
