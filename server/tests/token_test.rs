//! Token endpoint integration tests.

mod common;

use sr_common::{ErrorBody, TokenResponse};
use sr_server::token::jwt;

use common::spawn_server;

#[tokio::test]
async fn blank_username_is_rejected_with_message() {
    let base = spawn_server().await;
    let http = reqwest::Client::new();

    let resp = http
        .post(format!("{base}/get-token"))
        .json(&serde_json::json!({
            "username": "   ",
            "room": "room-1",
            "isHost": false,
        }))
        .send()
        .await
        .expect("request");

    assert_eq!(resp.status(), 400);
    let body: ErrorBody = resp.json().await.expect("error body");
    assert!(!body.message.is_empty());
}

#[tokio::test]
async fn host_path_allocates_a_room() {
    let base = spawn_server().await;
    let http = reqwest::Client::new();

    let resp = http
        .post(format!("{base}/get-token"))
        .json(&serde_json::json!({
            "username": "alice",
            "room": "",
            "isHost": true,
        }))
        .send()
        .await
        .expect("request");

    assert!(resp.status().is_success());
    let body: TokenResponse = resp.json().await.expect("token body");
    assert!(!body.room.is_empty());
    assert_eq!(body.display_name, "alice");

    let claims = jwt::validate(&body.token, "test-secret").expect("claims");
    assert_eq!(claims.sub, "alice");
    assert_eq!(claims.room, body.room);
    assert!(claims.host);
}

#[tokio::test]
async fn explicit_room_is_echoed_back() {
    let base = spawn_server().await;
    let http = reqwest::Client::new();

    let resp = http
        .post(format!("{base}/get-token"))
        .json(&serde_json::json!({
            "username": "bob",
            "room": "room-1",
            "isHost": false,
        }))
        .send()
        .await
        .expect("request");

    assert!(resp.status().is_success());
    let body: TokenResponse = resp.json().await.expect("token body");
    assert_eq!(body.room, "room-1");

    let claims = jwt::validate(&body.token, "test-secret").expect("claims");
    assert!(!claims.host);
}
