//! Single-slot token cache.
//!
//! Holds at most one token together with the instant it stops being served.
//! Readers and writers always observe a whole `(token, expires_at)` pair.

use crate::metrics;
use chrono::{DateTime, Utc};
use common::clock::Clock;
use common::jwt::{extract_exp, JwtValidationError};
use common::secret::{ExposeSecret, SecretString};
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;
use tracing::debug;

#[derive(Clone)]
struct CacheEntry {
    token: SecretString,
    expires_at: DateTime<Utc>,
}

/// Process-local cache for the current service token.
///
/// `get` never renews; it only reports whether the held token is still
/// before its expiry according to the injected clock.
pub struct TokenCache {
    slot: RwLock<Option<CacheEntry>>,
    clock: Arc<dyn Clock>,
    expiry_skew: Duration,
}

impl std::fmt::Debug for TokenCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenCache")
            .field("expires_at", &self.expires_at())
            .field("expiry_skew", &self.expiry_skew)
            .finish_non_exhaustive()
    }
}

impl TokenCache {
    pub fn new(clock: Arc<dyn Clock>, expiry_skew: Duration) -> Self {
        Self {
            slot: RwLock::new(None),
            clock,
            expiry_skew,
        }
    }

    /// Current token if one is held and `now < expires_at`.
    pub fn get(&self) -> Option<SecretString> {
        let now = self.clock.now();
        let token = self
            .slot
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .filter(|entry| now < entry.expires_at)
            .map(|entry| entry.token.clone());

        metrics::record_cache_lookup(token.is_some());
        token
    }

    /// Replace the held token in one step.
    pub fn set(&self, token: SecretString, expires_at: DateTime<Utc>) {
        let mut slot = self.slot.write().unwrap_or_else(PoisonError::into_inner);
        *slot = Some(CacheEntry { token, expires_at });
        debug!(target: "client.token_cache", expires_at = %expires_at, "Token cached");
    }

    /// Store a freshly issued token, deriving `expires_at` from its `exp`
    /// claim minus the configured skew.
    ///
    /// # Errors
    ///
    /// Returns the decode error if the token carries no readable `exp`, and
    /// `MalformedToken` if `exp` minus the skew falls outside the
    /// representable range. The cache is left unchanged in both cases.
    pub fn store(&self, token: SecretString) -> Result<DateTime<Utc>, JwtValidationError> {
        let exp = extract_exp(token.expose_secret())?;
        let skew = chrono::Duration::from_std(self.expiry_skew)
            .map_err(|_| JwtValidationError::MalformedToken)?;
        let expires_at = DateTime::<Utc>::from_timestamp(exp, 0)
            .and_then(|exp| exp.checked_sub_signed(skew))
            .ok_or(JwtValidationError::MalformedToken)?;

        self.set(token, expires_at);
        Ok(expires_at)
    }

    /// Drop the held token; the next `get` is a miss.
    pub fn invalidate(&self) {
        let mut slot = self.slot.write().unwrap_or_else(PoisonError::into_inner);
        *slot = None;
        metrics::record_cache_invalidation();
        debug!(target: "client.token_cache", "Token invalidated");
    }

    /// Expiry of the held token, whether or not it has passed.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.slot
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map(|entry| entry.expires_at)
    }
}
