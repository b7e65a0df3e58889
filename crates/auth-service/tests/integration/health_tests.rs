//! Ping, health and metrics endpoints.

use auth_test_utils::{basic_header, TestAuthServer, TEST_CLIENT_ID, TEST_CLIENT_SECRET};
use reqwest::StatusCode;

#[tokio::test]
async fn test_ping_returns_ok_without_credentials() -> Result<(), anyhow::Error> {
    let server = TestAuthServer::spawn().await?;

    let response = reqwest::get(format!("{}/api/auth/ping", server.url())).await?;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.text().await?.is_empty());

    Ok(())
}

#[tokio::test]
async fn test_health_endpoint_returns_ok() -> Result<(), anyhow::Error> {
    let server = TestAuthServer::spawn().await?;

    let response = reqwest::get(format!("{}/health", server.url())).await?;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.text().await?, "OK");

    Ok(())
}

#[tokio::test]
async fn test_metrics_endpoint_is_served() -> Result<(), anyhow::Error> {
    let server = TestAuthServer::spawn().await?;

    // Generate some traffic first
    reqwest::Client::new()
        .post(format!("{}/api/auth/token", server.url()))
        .header("authorization", basic_header(TEST_CLIENT_ID, TEST_CLIENT_SECRET))
        .send()
        .await?;

    let response = reqwest::get(format!("{}/metrics", server.url())).await?;
    assert_eq!(response.status(), StatusCode::OK);

    Ok(())
}
