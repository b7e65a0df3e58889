//! Token issuance over HTTP against a real server.

use auth_test_utils::{
    basic_header, test_config, ManualClock, TestAuthServer, TEST_AUDIENCE, TEST_CLIENT_ID,
    TEST_CLIENT_SECRET, TEST_ISSUER, TEST_SUBJECT,
};
use base64::{engine::general_purpose, Engine as _};
use common::jwt::ServiceClaims;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use reqwest::StatusCode;
use std::collections::HashSet;
use std::sync::Arc;

const NOW: i64 = 1_700_000_000;

async fn request_token(
    server: &TestAuthServer,
    authorization: Option<String>,
) -> Result<reqwest::Response, anyhow::Error> {
    let mut request = reqwest::Client::new().post(format!("{}/api/auth/token", server.url()));
    if let Some(value) = authorization {
        request = request.header("authorization", value);
    }
    Ok(request.send().await?)
}

fn decode_claims(token: &str) -> ServiceClaims {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = false;
    validation.set_audience(&[TEST_AUDIENCE]);
    validation.set_issuer(&[TEST_ISSUER]);
    decode::<ServiceClaims>(
        token,
        &DecodingKey::from_secret(auth_test_utils::TEST_SECRET_KEY.as_bytes()),
        &validation,
    )
    .expect("issued token should verify")
    .claims
}

// ============================================================================
// Success
// ============================================================================

#[tokio::test]
async fn test_valid_credentials_return_plain_text_token() -> Result<(), anyhow::Error> {
    let server =
        TestAuthServer::spawn_with(test_config(), Arc::new(ManualClock::at_timestamp(NOW)))
            .await?;

    let response = request_token(
        &server,
        Some(basic_header(TEST_CLIENT_ID, TEST_CLIENT_SECRET)),
    )
    .await?;
    assert_eq!(response.status(), StatusCode::OK);

    let token = response.text().await?;
    let claims = decode_claims(&token);

    assert_eq!(claims.sub, TEST_SUBJECT);
    assert_eq!(claims.iat, NOW);
    assert_eq!(claims.exp, NOW + 60 * 60);
    assert!(!claims.jti.is_empty());

    Ok(())
}

#[tokio::test]
async fn test_exp_tracks_wall_clock_within_one_second() -> Result<(), anyhow::Error> {
    let server = TestAuthServer::spawn().await?;

    let before = chrono::Utc::now().timestamp();
    let token = request_token(
        &server,
        Some(basic_header(TEST_CLIENT_ID, TEST_CLIENT_SECRET)),
    )
    .await?
    .text()
    .await?;
    let after = chrono::Utc::now().timestamp();

    let claims = decode_claims(&token);
    assert_eq!(claims.exp - claims.iat, 3600);
    assert!(claims.iat >= before - 1 && claims.iat <= after + 1);

    Ok(())
}

#[tokio::test]
async fn test_jti_unique_across_requests() -> Result<(), anyhow::Error> {
    let server = TestAuthServer::spawn().await?;

    let mut jtis = HashSet::new();
    for _ in 0..10 {
        let token = request_token(
            &server,
            Some(basic_header(TEST_CLIENT_ID, TEST_CLIENT_SECRET)),
        )
        .await?
        .text()
        .await?;
        jtis.insert(decode_claims(&token).jti);
    }
    assert_eq!(jtis.len(), 10);

    Ok(())
}

// ============================================================================
// Rejections
// ============================================================================

#[tokio::test]
async fn test_missing_authorization_header_is_400() -> Result<(), anyhow::Error> {
    let server = TestAuthServer::spawn().await?;

    let response = request_token(&server, None).await?;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(response.text().await?, "Missing Authorization header");

    Ok(())
}

#[tokio::test]
async fn test_invalid_base64_is_400_not_a_crash() -> Result<(), anyhow::Error> {
    let server = TestAuthServer::spawn().await?;

    let response = request_token(&server, Some("Basic ###not-base64###".to_string())).await?;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(response.text().await?, "Malformed client credential");

    // Server still serves afterwards
    let response = request_token(
        &server,
        Some(basic_header(TEST_CLIENT_ID, TEST_CLIENT_SECRET)),
    )
    .await?;
    assert_eq!(response.status(), StatusCode::OK);

    Ok(())
}

#[tokio::test]
async fn test_missing_colon_is_400() -> Result<(), anyhow::Error> {
    let server = TestAuthServer::spawn().await?;

    let header = format!("Basic {}", general_purpose::STANDARD.encode("client-1"));
    let response = request_token(&server, Some(header)).await?;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    Ok(())
}

#[tokio::test]
async fn test_wrong_client_id_and_wrong_secret_are_400() -> Result<(), anyhow::Error> {
    let server = TestAuthServer::spawn().await?;

    let response = request_token(
        &server,
        Some(basic_header("client-x", TEST_CLIENT_SECRET)),
    )
    .await?;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let wrong_id_body = response.text().await?;

    let response = request_token(&server, Some(basic_header(TEST_CLIENT_ID, "wrong"))).await?;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let wrong_secret_body = response.text().await?;

    assert_eq!(wrong_id_body, "Invalid client credentials");
    assert_eq!(wrong_id_body, wrong_secret_body);

    Ok(())
}

#[tokio::test]
async fn test_get_is_method_not_allowed() -> Result<(), anyhow::Error> {
    let server = TestAuthServer::spawn().await?;

    let response = reqwest::Client::new()
        .get(format!("{}/api/auth/token", server.url()))
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);

    Ok(())
}
