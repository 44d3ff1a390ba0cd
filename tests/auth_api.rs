//! Authentication API integration tests
//!
//! Tests for signup, login, the current-user endpoint and the bearer-token
//! middleware.

#[macro_use]
mod common;

use axum::http::StatusCode;
use pretty_assertions::assert_eq;
use serde_json::json;
use uuid::Uuid;

use common::*;

#[tokio::test]
async fn test_health_is_public() {
    let server = create_test_server().await;

    let response = server.get("/health").await;

    assert_status!(response, StatusCode::OK);
    let body: serde_json::Value = response.json();
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_signup_success() {
    let server = create_test_server().await;

    let response = server
        .post("/api/auth/signup")
        .json(&json!({
            "username": "maya_sings",
            "email": "maya@example.com",
            "password": "password123"
        }))
        .await;

    assert_status!(response, StatusCode::OK);
    let body: serde_json::Value = response.json();
    assert!(body["token"].as_str().is_some_and(|t| !t.is_empty()));
    assert_eq!(body["user"]["username"], "maya_sings");
    assert_eq!(body["user"]["email"], "maya@example.com");
    assert!(body["user"].get("password_hash").is_none());
}

#[tokio::test]
async fn test_signup_duplicate_username_and_email() {
    let server = create_test_server().await;
    signup_user(&server, "maya").await;

    let response = server
        .post("/api/auth/signup")
        .json(&json!({
            "username": "MAYA",
            "email": "other@example.com",
            "password": "password123"
        }))
        .await;
    assert_status!(response, StatusCode::CONFLICT);

    let response = server
        .post("/api/auth/signup")
        .json(&json!({
            "username": "someone_else",
            "email": "maya@example.com",
            "password": "password123"
        }))
        .await;
    assert_status!(response, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_signup_validation() {
    let server = create_test_server().await;

    let cases = [
        json!({"username": "1abc", "email": "a@example.com", "password": "password123"}),
        json!({"username": "valid_name", "email": "not-an-email", "password": "password123"}),
        json!({"username": "valid_name", "email": "a@example.com", "password": "short"}),
    ];

    for case in cases {
        let response = server.post("/api/auth/signup").json(&case).await;
        assert_status!(response, StatusCode::BAD_REQUEST);
    }
}

#[tokio::test]
async fn test_login_by_username_or_email() {
    let server = create_test_server().await;
    let user = signup_user(&server, "maya").await;

    for identifier in ["maya", "maya@example.com"] {
        let response = server
            .post("/api/auth/login")
            .json(&json!({ "username": identifier, "password": TEST_PASSWORD }))
            .await;

        assert_status!(response, StatusCode::OK);
        let body: serde_json::Value = response.json();
        assert_eq!(body["user"]["id"], user.id.to_string());
        assert!(body["token"].is_string());
    }
}

#[tokio::test]
async fn test_login_invalid_credentials() {
    let server = create_test_server().await;
    signup_user(&server, "maya").await;

    let wrong_password = server
        .post("/api/auth/login")
        .json(&json!({ "username": "maya", "password": "wrongpassword" }))
        .await;
    let unknown_user = server
        .post("/api/auth/login")
        .json(&json!({ "username": "nobody", "password": "wrongpassword" }))
        .await;

    assert_status!(wrong_password, StatusCode::UNAUTHORIZED);
    assert_status!(unknown_user, StatusCode::UNAUTHORIZED);
    // Both failures look the same to the client.
    assert_eq!(wrong_password.text(), unknown_user.text());
}

#[tokio::test]
async fn test_get_me_with_valid_token() {
    let server = create_test_server().await;
    let user = signup_user(&server, "maya").await;

    let response = server.get("/api/auth/me").authorization_bearer(&user.token).await;

    assert_status!(response, StatusCode::OK);
    let body: serde_json::Value = response.json();
    assert_eq!(body["username"], "maya");
    assert_eq!(body["email"], "maya@example.com");
}

#[tokio::test]
async fn test_protected_routes_require_token() {
    let server = create_test_server().await;

    for path in ["/api/auth/me", "/api/posts", "/api/balance", "/api/notifications"] {
        let response = server.get(path).await;
        assert_status!(response, StatusCode::UNAUTHORIZED);
    }

    let response = server.get("/api/auth/me").authorization_bearer("not-a-jwt").await;
    assert_status!(response, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_token_for_unknown_user_is_rejected() {
    let server = create_test_server().await;
    let token = generate_test_token(Uuid::new_v4(), "ghost");

    let response = server.get("/api/auth/me").authorization_bearer(&token).await;

    assert_status!(response, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_unknown_route_is_not_found() {
    let server = create_test_server().await;

    let response = server.get("/definitely/not/here").await;

    assert_status!(response, StatusCode::NOT_FOUND);
}
