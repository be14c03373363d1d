//! Schema validation tests for API responses
//!
//! Every response must use the shared envelope, and the payloads inside it
//! must match the schemas in `tests/schemas/`.

mod common;

use common::TestServer;
use common::schema_validator::assert_matches_schema;
use serde_json::json;

#[tokio::test]
async fn test_account_schema_profile() {
    let server = TestServer::new().await;
    let alice = server.create_user("alice", "public").await;

    let (status, body) = server
        .get_json("/api/v1/users/profile", Some(&alice.access_token))
        .await;
    assert_eq!(status, 200);

    assert_matches_schema(&body, "envelope");
    assert_matches_schema(&body["data"], "account");
}

#[tokio::test]
async fn test_account_schema_login_session() {
    let server = TestServer::new().await;
    let alice = server.create_user("alice", "public").await;

    let (status, body) = server
        .post_json(
            "/api/v1/users/login",
            None,
            json!({ "email": alice.email, "password": common::TEST_PASSWORD }),
        )
        .await;
    assert_eq!(status, 200);

    assert_matches_schema(&body, "envelope");
    assert_matches_schema(&body["data"]["account"], "account");
}

#[tokio::test]
async fn test_post_schema() {
    let server = TestServer::new().await;
    let alice = server.create_user("alice", "public").await;

    let (status, body) = server
        .post_json(
            "/api/v1/posts",
            Some(&alice.access_token),
            json!({
                "title": "Schema",
                "description": "Checked",
                "tags": ["test"],
                "media": [{ "url": "http://x/y.png", "publicId": "images/y.png", "kind": "image" }],
            }),
        )
        .await;
    assert_eq!(status, 201);

    assert_matches_schema(&body, "envelope");
    assert_matches_schema(&body["data"], "post");
}

#[tokio::test]
async fn test_follow_stats_schema() {
    let server = TestServer::new().await;
    let alice = server.create_user("alice", "public").await;

    let (status, body) = server
        .get_json("/api/v1/follows/me/stats", Some(&alice.access_token))
        .await;
    assert_eq!(status, 200);

    assert_matches_schema(&body, "envelope");
    assert_matches_schema(&body["data"], "follow_stats");
}

#[tokio::test]
async fn test_error_envelope_schema() {
    let server = TestServer::new().await;
    let alice = server.create_user("alice", "public").await;

    let responses = [
        server.get_json("/api/v1/users/profile", None).await,
        server
            .get_json("/api/v1/posts/not-an-id", Some(&alice.access_token))
            .await,
        server
            .post_json(
                "/api/v1/follows/follow",
                Some(&alice.access_token),
                json!({ "followingId": alice.id }),
            )
            .await,
    ];

    for (status, body) in responses {
        assert!(status.is_client_error());
        assert_eq!(body["statusCode"], status.as_u16());
        assert_matches_schema(&body, "envelope");
    }
}

#[tokio::test]
async fn test_malformed_json_uses_envelope() {
    let server = TestServer::new().await;

    let response = server
        .client
        .post(server.url("/api/v1/users/register"))
        .header("Content-Type", "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 400);

    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["success"], false);
    assert_matches_schema(&body, "envelope");
}
