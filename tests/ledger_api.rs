//! Monetization ledger integration tests

#[macro_use]
mod common;

use axum::http::StatusCode;
use axum_test::TestServer;
use futures_util::future::join_all;
use pretty_assertions::assert_eq;
use serde_json::json;
use uuid::Uuid;

use common::*;

async fn text_post(server: &TestServer, user: &TestUser) -> Uuid {
    let body: serde_json::Value = server
        .post("/api/posts")
        .authorization_bearer(&user.token)
        .json(&json!({ "media_type": "text", "caption": "support me" }))
        .await
        .json();
    body["id"].as_str().and_then(|id| id.parse().ok()).expect("post id")
}

async fn donate(server: &TestServer, donor: &TestUser, post_id: Uuid, amount_cents: i64) -> StatusCode {
    server
        .post(&format!("/api/posts/{}/donations", post_id))
        .authorization_bearer(&donor.token)
        .json(&json!({ "amount_cents": amount_cents, "message": "keep going" }))
        .await
        .status_code()
}

#[tokio::test]
async fn test_donation_updates_balance_and_post() {
    let server = create_test_server().await;
    let maya = signup_user(&server, "maya").await;
    let leo = signup_user(&server, "leo").await;
    let post_id = text_post(&server, &maya).await;

    let response = server
        .post(&format!("/api/posts/{}/donations", post_id))
        .authorization_bearer(&leo.token)
        .json(&json!({ "amount_cents": 1_500, "message": "Loved it" }))
        .await;
    assert_status!(response, StatusCode::CREATED);
    let donation: serde_json::Value = response.json();
    assert_eq!(donation["amount_cents"], 1_500);
    assert_eq!(donation["creator_id"], maya.id.to_string());
    assert_eq!(donation["donor_id"], leo.id.to_string());

    let balance: serde_json::Value = server.get("/api/balance").authorization_bearer(&maya.token).await.json();
    assert_eq!(
        balance,
        json!({
            "total_received_cents": 1_500,
            "total_withdrawn_cents": 0,
            "available_cents": 1_500,
            "donation_count": 1
        })
    );

    let post: serde_json::Value = server
        .get(&format!("/api/posts/{}", post_id))
        .authorization_bearer(&leo.token)
        .await
        .json();
    assert_eq!(post["donation_total_cents"], 1_500);
}

#[tokio::test]
async fn test_invalid_donations() {
    let server = create_test_server().await;
    let maya = signup_user(&server, "maya").await;
    let leo = signup_user(&server, "leo").await;
    let post_id = text_post(&server, &maya).await;

    assert_eq!(donate(&server, &leo, post_id, 0).await, StatusCode::BAD_REQUEST);
    assert_eq!(donate(&server, &leo, post_id, -100).await, StatusCode::BAD_REQUEST);
    assert_eq!(donate(&server, &maya, post_id, 500).await, StatusCode::BAD_REQUEST);
    assert_eq!(donate(&server, &leo, Uuid::new_v4(), 500).await, StatusCode::NOT_FOUND);

    let balance: serde_json::Value = server.get("/api/balance").authorization_bearer(&maya.token).await.json();
    assert_eq!(balance["donation_count"], 0);
}

#[tokio::test]
async fn test_supporters_ranking() {
    let server = create_test_server().await;
    let maya = signup_user(&server, "maya").await;
    let leo = signup_user(&server, "leo").await;
    let ana = signup_user(&server, "ana").await;
    let post_id = text_post(&server, &maya).await;

    donate(&server, &leo, post_id, 300).await;
    donate(&server, &ana, post_id, 1_000).await;
    donate(&server, &leo, post_id, 200).await;

    let body: serde_json::Value = server
        .get("/api/balance/supporters")
        .authorization_bearer(&maya.token)
        .await
        .json();
    assert_eq!(body["total_cents"], 1_500);

    let supporters = body["supporters"].as_array().expect("supporters");
    assert_eq!(supporters.len(), 2);
    assert_eq!(supporters[0]["user"]["username"], "ana");
    assert_eq!(supporters[0]["total_cents"], 1_000);
    assert_eq!(supporters[1]["user"]["username"], "leo");
    assert_eq!(supporters[1]["total_cents"], 500);
    assert_eq!(supporters[1]["donation_count"], 2);
}

#[tokio::test]
async fn test_withdrawals() {
    let server = create_test_server().await;
    let maya = signup_user(&server, "maya").await;
    let leo = signup_user(&server, "leo").await;
    let post_id = text_post(&server, &maya).await;
    donate(&server, &leo, post_id, 2_000).await;

    let withdraw = |amount: i64| {
        server
            .post("/api/withdrawals")
            .authorization_bearer(&maya.token)
            .json(&json!({
                "amount_cents": amount,
                "method": "paypal",
                "destination": "maya@example.com"
            }))
    };

    // Below the configured minimum
    let response = withdraw(TEST_MIN_WITHDRAWAL_CENTS - 1).await;
    assert_status!(response, StatusCode::BAD_REQUEST);

    let response = withdraw(1_200).await;
    assert_status!(response, StatusCode::CREATED);
    let body: serde_json::Value = response.json();
    assert_eq!(body["status"], "completed");
    assert_eq!(body["amount_cents"], 1_200);

    // Only 800 left
    let response = withdraw(900).await;
    assert_status!(response, StatusCode::BAD_REQUEST);
    assert_error_contains!(response, "insufficient funds");

    let balance: serde_json::Value = server.get("/api/balance").authorization_bearer(&maya.token).await.json();
    assert_eq!(balance["total_withdrawn_cents"], 1_200);
    assert_eq!(balance["available_cents"], 800);

    let withdrawals: Vec<serde_json::Value> = server
        .get("/api/withdrawals")
        .authorization_bearer(&maya.token)
        .await
        .json();
    assert_eq!(withdrawals.len(), 1);

    let response = server
        .post("/api/withdrawals")
        .authorization_bearer(&maya.token)
        .json(&json!({ "amount_cents": 600, "method": " ", "destination": "x" }))
        .await;
    assert_status!(response, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_donation_survives_post_deletion() {
    let server = create_test_server().await;
    let maya = signup_user(&server, "maya").await;
    let leo = signup_user(&server, "leo").await;
    let post_id = text_post(&server, &maya).await;
    donate(&server, &leo, post_id, 700).await;

    let response = server
        .delete(&format!("/api/posts/{}", post_id))
        .authorization_bearer(&maya.token)
        .await;
    assert_status!(response, StatusCode::NO_CONTENT);

    let balance: serde_json::Value = server.get("/api/balance").authorization_bearer(&maya.token).await.json();
    assert_eq!(balance["total_received_cents"], 700);
    assert_eq!(balance["available_cents"], 700);
}

#[tokio::test]
async fn test_concurrent_withdrawals_never_overdraw() {
    let dir = tempfile::tempdir().expect("temp dir");
    let server = create_test_server_with(file_config(&dir)).await;
    let maya = signup_user(&server, "maya").await;
    let leo = signup_user(&server, "leo").await;
    let post_id = text_post(&server, &maya).await;
    assert_eq!(donate(&server, &leo, post_id, 10_000).await, StatusCode::CREATED);

    let requests = (0..16).map(|_| async {
        server
            .post("/api/withdrawals")
            .authorization_bearer(&maya.token)
            .json(&json!({ "amount_cents": 1_000, "method": "paypal", "destination": "maya@example.com" }))
            .await
            .status_code()
    });
    let statuses = join_all(requests).await;

    let created = statuses.iter().filter(|s| **s == StatusCode::CREATED).count();
    let refused = statuses.iter().filter(|s| **s == StatusCode::BAD_REQUEST).count();
    assert_eq!((created, refused), (10, 6), "statuses: {:?}", statuses);

    let balance: serde_json::Value = server.get("/api/balance").authorization_bearer(&maya.token).await.json();
    assert_eq!(balance["total_withdrawn_cents"], 10_000);
    assert_eq!(balance["available_cents"], 0);
}
