use crate::config::Config;
use crate::credentials::CredentialValidator;
use crate::crypto::TokenIssuer;
use crate::errors::AuthError;
use crate::observability::metrics::record_token_issuance;
use crate::observability::{hash_for_correlation, ErrorCategory};
use common::clock::Clock;
use std::sync::Arc;
use std::time::Instant;
use tracing::instrument;

/// Issuance entry point: Basic credential in, signed token out.
pub struct TokenService {
    validator: CredentialValidator,
    issuer: TokenIssuer,
}

impl TokenService {
    /// # Errors
    ///
    /// Returns `AuthError::Internal` if the credential validator cannot be
    /// initialized.
    pub fn new(config: &Config, clock: Arc<dyn Clock>) -> Result<Self, AuthError> {
        Ok(Self {
            validator: CredentialValidator::new(config)?,
            issuer: TokenIssuer::new(config, clock),
        })
    }

    /// Validate a `Basic` header value and issue a token.
    ///
    /// Every failure is returned as a typed error; nothing escapes as a panic.
    ///
    /// # Errors
    ///
    /// `MalformedCredential`, `InvalidClient`, `InvalidSecret` or
    /// `SigningError`.
    #[instrument(skip_all, fields(client_id_hash))]
    pub fn issue_token(&self, basic_header_value: &str) -> Result<String, AuthError> {
        let start = Instant::now();

        let result = self.validator.validate(basic_header_value).and_then(|identity| {
            let client_id_hash = hash_for_correlation(&identity.client_id);
            tracing::Span::current().record("client_id_hash", client_id_hash.as_str());
            self.issuer.issue(&identity)
        });

        match &result {
            Ok(_) => {
                record_token_issuance("success", None, start.elapsed());
                tracing::info!(target: "auth.token", "Service token issued");
            }
            Err(e) => {
                let category = ErrorCategory::from(e);
                record_token_issuance("error", Some(category.as_str()), start.elapsed());
                tracing::warn!(
                    target: "auth.token",
                    error_category = category.as_str(),
                    error = %e,
                    "Service token request rejected"
                );
            }
        }

        result
    }
}
