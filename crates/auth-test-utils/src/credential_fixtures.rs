//! Deterministic credential fixtures.
//!
//! Every value is fixed so failures reproduce exactly.

use auth_service::config::Config;
use base64::{engine::general_purpose, Engine as _};
use common::secret::SecretString;

pub const TEST_CLIENT_ID: &str = "client-1";
pub const TEST_CLIENT_SECRET: &str = "test-client-secret-0001";
/// 32-byte HS256 key.
pub const TEST_SECRET_KEY: &str = "test-signing-key-0123456789abcdef";
pub const TEST_ISSUER: &str = "http://issuer.test";
pub const TEST_AUDIENCE: &str = "roadside-web";
pub const TEST_SUBJECT: &str = "roadside-api";
pub const TEST_EXPIRY_MINUTES: i64 = 60;

/// Issuer configuration matching the fixtures above.
pub fn test_config() -> Config {
    Config {
        bind_address: "127.0.0.1:0".to_string(),
        issuer: TEST_ISSUER.to_string(),
        audience: TEST_AUDIENCE.to_string(),
        secret_key: SecretString::from(TEST_SECRET_KEY),
        expiry_minutes: TEST_EXPIRY_MINUTES,
        client_id: TEST_CLIENT_ID.to_string(),
        client_secret: SecretString::from(TEST_CLIENT_SECRET),
        subject: TEST_SUBJECT.to_string(),
        clock_skew_seconds: auth_service::config::DEFAULT_JWT_CLOCK_SKEW_SECONDS,
    }
}

/// `Basic base64(id:secret)` header value.
pub fn basic_header(client_id: &str, client_secret: &str) -> String {
    format!(
        "Basic {}",
        general_purpose::STANDARD.encode(format!("{client_id}:{client_secret}"))
    )
}
