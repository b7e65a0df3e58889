//! Bearer verification on the protected route.

use auth_test_utils::{
    basic_header, TestAuthServer, TestTokenBuilder, TEST_CLIENT_ID, TEST_CLIENT_SECRET,
};
use reqwest::StatusCode;

async fn whoami(server: &TestAuthServer, token: &str) -> Result<reqwest::Response, anyhow::Error> {
    Ok(reqwest::Client::new()
        .get(format!("{}/api/auth/whoami", server.url()))
        .bearer_auth(token)
        .send()
        .await?)
}

#[tokio::test]
async fn test_issued_token_is_accepted() -> Result<(), anyhow::Error> {
    let server = TestAuthServer::spawn().await?;

    let token = reqwest::Client::new()
        .post(format!("{}/api/auth/token", server.url()))
        .header("authorization", basic_header(TEST_CLIENT_ID, TEST_CLIENT_SECRET))
        .send()
        .await?
        .text()
        .await?;

    let response = whoami(&server, &token).await?;
    assert_eq!(response.status(), StatusCode::OK);

    let body: serde_json::Value = response.json().await?;
    assert_eq!(body["sub"], "roadside-api");
    assert!(body["exp"].as_i64().is_some());

    Ok(())
}

#[tokio::test]
async fn test_builder_token_is_accepted() -> Result<(), anyhow::Error> {
    let server = TestAuthServer::spawn().await?;

    let token = TestTokenBuilder::new().with_jti("fixed-jti").build();
    let response = whoami(&server, &token).await?;
    assert_eq!(response.status(), StatusCode::OK);

    let body: serde_json::Value = response.json().await?;
    assert_eq!(body["jti"], "fixed-jti");

    Ok(())
}

#[tokio::test]
async fn test_expired_token_is_401() -> Result<(), anyhow::Error> {
    let server = TestAuthServer::spawn().await?;

    let token = TestTokenBuilder::new().expires_in(-3600).build();
    let response = whoami(&server, &token).await?;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let challenge = response
        .headers()
        .get("www-authenticate")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    assert!(challenge.starts_with("Bearer"));

    Ok(())
}

#[tokio::test]
async fn test_token_issued_in_the_future_is_401() -> Result<(), anyhow::Error> {
    let server = TestAuthServer::spawn().await?;

    let an_hour_ahead = chrono::Utc::now().timestamp() + 3600;
    let token = TestTokenBuilder::new()
        .issued_at(an_hour_ahead)
        .expires_at(an_hour_ahead + 3600)
        .build();
    let response = whoami(&server, &token).await?;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    Ok(())
}

#[tokio::test]
async fn test_wrong_key_is_401() -> Result<(), anyhow::Error> {
    let server = TestAuthServer::spawn().await?;

    let token = TestTokenBuilder::new()
        .signed_with("another-signing-key-0123456789abcdef")
        .build();
    let response = whoami(&server, &token).await?;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    Ok(())
}

#[tokio::test]
async fn test_wrong_audience_or_issuer_is_401() -> Result<(), anyhow::Error> {
    let server = TestAuthServer::spawn().await?;

    let token = TestTokenBuilder::new().with_audience("other-app").build();
    assert_eq!(
        whoami(&server, &token).await?.status(),
        StatusCode::UNAUTHORIZED
    );

    let token = TestTokenBuilder::new().with_issuer("http://elsewhere").build();
    assert_eq!(
        whoami(&server, &token).await?.status(),
        StatusCode::UNAUTHORIZED
    );

    Ok(())
}

#[tokio::test]
async fn test_error_body_is_generic() -> Result<(), anyhow::Error> {
    let server = TestAuthServer::spawn().await?;

    let token = TestTokenBuilder::new().expires_in(-3600).build();
    let body: serde_json::Value = whoami(&server, &token).await?.json().await?;

    assert_eq!(body["error"]["code"], "INVALID_TOKEN");
    assert_eq!(
        body["error"]["message"],
        "The access token is invalid or expired"
    );

    Ok(())
}
