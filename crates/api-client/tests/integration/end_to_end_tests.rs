//! Client against the real issuer, which also serves the protected
//! `whoami` route.

use api_client::{AcquisitionError, ApiClient, ClientConfig, ClientError, PingClient};
use auth_test_utils::{TestAuthServer, TestTokenBuilder, TEST_CLIENT_ID, TEST_CLIENT_SECRET};
use chrono::{Duration as ChronoDuration, Utc};
use common::secret::{ExposeSecret, SecretString};
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Deserialize)]
struct WhoAmI {
    sub: String,
    jti: String,
    exp: i64,
}

fn client_for(server: &TestAuthServer, secret: &str) -> Result<ApiClient, anyhow::Error> {
    let config = ClientConfig::new(
        server.url(),
        server.url(),
        TEST_CLIENT_ID,
        SecretString::from(secret.to_string()),
    );
    Ok(ApiClient::new(config)?)
}

#[tokio::test]
async fn test_client_acquires_token_and_calls_protected_route() -> Result<(), anyhow::Error> {
    let server = TestAuthServer::spawn().await?;
    let client = client_for(&server, TEST_CLIENT_SECRET)?;

    let me: WhoAmI = client.get_json("/api/auth/whoami").await?;
    assert_eq!(me.sub, "roadside-api");
    assert!(!me.jti.is_empty());

    let cached_expiry = client
        .token_cache()
        .expires_at()
        .map(|t| t.timestamp())
        .unwrap_or_default();
    assert_eq!(cached_expiry, me.exp, "cache expiry mirrors the exp claim");

    // Second call reuses the cached token
    let again: WhoAmI = client.get_json("/api/auth/whoami").await?;
    assert_eq!(again.jti, me.jti);

    Ok(())
}

#[tokio::test]
async fn test_rejected_cached_token_is_replaced_once() -> Result<(), anyhow::Error> {
    let server = TestAuthServer::spawn().await?;
    let client = client_for(&server, TEST_CLIENT_SECRET)?;

    // A token the server will refuse, cached as if still valid
    let stale = TestTokenBuilder::new()
        .signed_with("another-signing-key-0123456789abcdef")
        .build();
    client.token_cache().set(
        SecretString::from(stale.clone()),
        Utc::now() + ChronoDuration::minutes(30),
    );

    let me: WhoAmI = client.get_json("/api/auth/whoami").await?;
    assert_eq!(me.sub, "roadside-api");

    let current = client
        .token_cache()
        .get()
        .map(|t| t.expose_secret().to_string())
        .unwrap_or_default();
    assert_ne!(current, stale);
    assert!(!current.is_empty());

    Ok(())
}

#[tokio::test]
async fn test_wrong_secret_surfaces_acquisition_error() -> Result<(), anyhow::Error> {
    let server = TestAuthServer::spawn().await?;
    let client = client_for(&server, "wrong-secret")?;

    let result = client.get_json::<WhoAmI>("/api/auth/whoami").await;
    assert!(matches!(
        result,
        Err(ClientError::Acquisition(AcquisitionError::Rejected { status: 400, .. }))
    ));
    assert!(client.token_cache().get().is_none());

    Ok(())
}

#[tokio::test]
async fn test_ping_against_live_and_dead_issuer() -> Result<(), anyhow::Error> {
    let server = TestAuthServer::spawn().await?;

    let live = PingClient::new(&server.url(), Duration::from_secs(2))?;
    assert!(live.ping().await);

    // Bind then release a port so nothing answers on it
    let addr = std::net::TcpListener::bind("127.0.0.1:0")?.local_addr()?;

    let dead = PingClient::new(&format!("http://{addr}"), Duration::from_millis(500))?;
    assert!(!dead.ping().await);

    Ok(())
}
