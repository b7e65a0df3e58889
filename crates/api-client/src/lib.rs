//! Client side of service-token authentication.
//!
//! Obtains tokens from the issuer with a client credential, caches the
//! current one, and attaches it to API requests:
//!
//! - [`TokenCache`]: single slot, served only while `now < expires_at`
//! - [`TokenAcquirer`]: one issuer round trip per call, no retries
//! - [`RequestInterceptor`]: bearer attachment with one replay on 401
//! - [`ApiClient`]: typed JSON helpers plus cancellable raw sends
//! - [`PingClient`]: unauthenticated issuer liveness probe

pub mod api_client;
pub mod config;
pub mod errors;
pub mod interceptor;
pub mod metrics;
pub mod ping;
pub mod token_acquirer;
pub mod token_cache;

pub use api_client::ApiClient;
pub use config::ClientConfig;
pub use errors::{AcquisitionError, ClientError};
pub use interceptor::RequestInterceptor;
pub use ping::PingClient;
pub use token_acquirer::TokenAcquirer;
pub use token_cache::TokenCache;
