//! Authentication test helpers
//!
//! Provides utilities for signing up test users through the API and
//! issuing tokens directly.

use axum::http::StatusCode;
use axum_test::TestServer;
use serde_json::json;
use uuid::Uuid;

use talent_haven::backend::auth::sessions::create_token;

/// Password used by every helper-created user
pub const TEST_PASSWORD: &str = "password123";

/// Test user credentials
#[derive(Debug, Clone)]
pub struct TestUser {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub token: String,
}

/// Sign up `username` through the API
pub async fn signup_user(server: &TestServer, username: &str) -> TestUser {
    let email = format!("{}@example.com", username);
    let response = server
        .post("/api/auth/signup")
        .json(&json!({
            "username": username,
            "email": email,
            "password": TEST_PASSWORD,
        }))
        .await;

    assert_eq!(response.status_code(), StatusCode::OK, "signup of {} failed", username);
    let body: serde_json::Value = response.json();

    TestUser {
        id: body["user"]["id"]
            .as_str()
            .and_then(|id| id.parse().ok())
            .expect("signup response without user id"),
        username: username.to_string(),
        email,
        token: body["token"].as_str().expect("signup response without token").to_string(),
    }
}

/// Generate a token signed with the test configuration's secret
pub fn generate_test_token(user_id: Uuid, username: &str) -> String {
    create_token(user_id, username, "test-secret", 1).expect("Failed to generate test token")
}

/// Create authorization header value
pub fn auth_header(token: &str) -> String {
    format!("Bearer {}", token)
}
