//! E2E tests for signup, login and the bearer-token gate

mod common;

use chrono::Utc;
use chronoview::auth::{SigningKey, TokenSigner, TokenStatus};
use common::{TEST_SECRET, TestServer};

#[tokio::test]
async fn test_signup_creates_user() {
    let server = TestServer::new().await;

    let response = server
        .post_credentials("/chrono/signup", "alice", "pw1")
        .await;

    assert_eq!(response.status(), 201);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["message"], "User created successfully");
}

#[tokio::test]
async fn test_duplicate_signup_is_conflict() {
    let server = TestServer::new().await;

    let first = server
        .post_credentials("/chrono/signup", "alice", "pw1")
        .await;
    assert_eq!(first.status(), 201);

    let second = server
        .post_credentials("/chrono/signup", "alice", "other")
        .await;
    assert_eq!(second.status(), 409);
    let body: serde_json::Value = second.json().await.unwrap();
    assert_eq!(body["message"], "User already exists");

    // The first credential still works; the second never took effect.
    let login = server
        .post_credentials("/chrono/login", "alice", "pw1")
        .await;
    assert_eq!(login.status(), 200);
    let login = server
        .post_credentials("/chrono/login", "alice", "other")
        .await;
    assert_eq!(login.status(), 401);
}

#[tokio::test]
async fn test_login_returns_token_for_user() {
    let server = TestServer::new().await;
    let token = server.register_and_login("alice", "pw1").await;

    let signer = TokenSigner::new(
        SigningKey::from_secret(TEST_SECRET),
        chrono::Duration::hours(6),
    );
    match signer.verify(&token, Utc::now()) {
        TokenStatus::Valid(claims) => {
            assert_eq!(claims.username, "alice");
            assert_eq!(claims.exp - claims.iat, 6 * 60 * 60);
        }
        other => panic!("expected valid token, got {other:?}"),
    }
}

#[tokio::test]
async fn test_bad_credentials_share_response_shape() {
    let server = TestServer::new().await;
    server.register_and_login("alice", "pw1").await;

    let wrong_password = server
        .post_credentials("/chrono/login", "alice", "x")
        .await;
    let unknown_user = server
        .post_credentials("/chrono/login", "nobody", "pw1")
        .await;

    assert_eq!(wrong_password.status(), 401);
    assert_eq!(unknown_user.status(), 401);

    let wrong_body: serde_json::Value = wrong_password.json().await.unwrap();
    let unknown_body: serde_json::Value = unknown_user.json().await.unwrap();
    assert_eq!(wrong_body, unknown_body);
    assert_eq!(wrong_body["message"], "Invalid username or password");
}

#[tokio::test]
async fn test_missing_fields_are_rejected() {
    let server = TestServer::new().await;

    let response = server
        .client
        .post(server.url("/chrono/login"))
        .json(&serde_json::json!({"username": "alice"}))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 400);
}

#[tokio::test]
async fn test_view_without_token_is_rejected() {
    let server = TestServer::new().await;

    let response = server.get_view("timelines", None).await;

    assert_eq!(response.status(), 401);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["message"], "Token is missing");
}

#[tokio::test]
async fn test_view_with_malformed_header_is_rejected() {
    let server = TestServer::new().await;
    let token = server.register_and_login("alice", "pw1").await;

    for header in [token.clone(), format!("Bearer {token} extra")] {
        let response = server.get_view("timelines", Some(&header)).await;
        assert_eq!(response.status(), 401);
        let body: serde_json::Value = response.json().await.unwrap();
        assert_eq!(body["message"], "Authorization header is malformed");
    }
}

#[tokio::test]
async fn test_view_with_foreign_or_expired_token_is_rejected() {
    let server = TestServer::new().await;
    server.register_and_login("alice", "pw1").await;

    let other_secret = TokenSigner::new(SigningKey::generate(), chrono::Duration::hours(6));
    let forged = other_secret.mint("alice", Utc::now()).unwrap();

    let own_secret = TokenSigner::new(
        SigningKey::from_secret(TEST_SECRET),
        chrono::Duration::hours(6),
    );
    let expired = own_secret
        .mint("alice", Utc::now() - chrono::Duration::hours(7))
        .unwrap();

    for token in [forged, expired, "not-a-token".to_string()] {
        let response = server
            .get_view("capsules", Some(&format!("Bearer {token}")))
            .await;
        assert_eq!(response.status(), 401);
        let body: serde_json::Value = response.json().await.unwrap();
        assert_eq!(body["message"], "Token is invalid or expired");
    }
}
