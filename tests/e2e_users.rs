//! E2E tests for registration, sessions and profiles

mod common;

use common::{TEST_PASSWORD, TestServer};
use serde_json::{Value, json};

#[tokio::test]
async fn test_register_returns_public_projection() {
    let server = TestServer::new().await;

    let (status, body) = server
        .post_json(
            "/api/v1/users/register",
            None,
            json!({
                "username": "alice",
                "email": "alice@example.com",
                "password": TEST_PASSWORD,
                "bio": "hello",
            }),
        )
        .await;

    assert_eq!(status, 201);
    assert_eq!(body["statusCode"], 201);
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "User registered successfully");
    assert_eq!(body["data"]["username"], "alice");
    assert_eq!(body["data"]["privacy"], "public");
    assert!(body["data"].get("passwordHash").is_none());
}

#[tokio::test]
async fn test_register_rejects_blank_and_duplicate() {
    let server = TestServer::new().await;
    server.create_user("alice", "public").await;

    let (status, body) = server
        .post_json(
            "/api/v1/users/register",
            None,
            json!({ "username": "", "email": "x@example.com", "password": "pw" }),
        )
        .await;
    assert_eq!(status, 400);
    assert_eq!(body["message"], "All fields are required");

    let (status, body) = server
        .post_json(
            "/api/v1/users/register",
            None,
            json!({
                "username": "someone-else",
                "email": "ALICE@example.com",
                "password": TEST_PASSWORD,
            }),
        )
        .await;
    assert_eq!(status, 400);
    assert_eq!(body["message"], "User already exists");
    assert!(body["errors"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_login_failures() {
    let server = TestServer::new().await;
    let alice = server.create_user("alice", "public").await;

    let (status, body) = server
        .post_json(
            "/api/v1/users/login",
            None,
            json!({ "email": "nobody@example.com", "password": TEST_PASSWORD }),
        )
        .await;
    assert_eq!(status, 400);
    assert_eq!(body["message"], "User does not exist");

    let (status, body) = server
        .post_json(
            "/api/v1/users/login",
            None,
            json!({ "email": alice.email, "password": "wrong" }),
        )
        .await;
    assert_eq!(status, 401);
    assert_eq!(body["message"], "Invalid user credentials");
}

#[tokio::test]
async fn test_login_sets_http_only_cookies() {
    let server = TestServer::new().await;
    let alice = server.create_user("alice", "public").await;

    let response = server
        .client
        .post(server.url("/api/v1/users/login"))
        .json(&json!({ "email": alice.email, "password": TEST_PASSWORD }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);

    let cookies: Vec<String> = response
        .headers()
        .get_all("set-cookie")
        .iter()
        .map(|value| value.to_str().unwrap().to_string())
        .collect();

    assert!(cookies.iter().any(|c| c.starts_with("accessToken=") && c.contains("HttpOnly")));
    assert!(cookies.iter().any(|c| c.starts_with("refreshToken=") && c.contains("HttpOnly")));
}

#[tokio::test]
async fn test_cookie_session_authenticates() {
    let server = TestServer::new().await;
    let alice = server.create_user("alice", "public").await;

    let response = server
        .client
        .get(server.url("/api/v1/users/profile"))
        .header("Cookie", format!("accessToken={}", alice.access_token))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["data"]["id"], alice.id);
}

#[tokio::test]
async fn test_refresh_rotates_and_rejects_reuse() {
    let server = TestServer::new().await;
    let alice = server.create_user("alice", "public").await;

    let (_, login) = server
        .post_json(
            "/api/v1/users/login",
            None,
            json!({ "email": alice.email, "password": TEST_PASSWORD }),
        )
        .await;
    let original = login["data"]["refreshToken"].as_str().unwrap().to_string();

    let (status, body) = server
        .post_json(
            "/api/v1/users/refresh-token",
            None,
            json!({ "refreshToken": original }),
        )
        .await;
    assert_eq!(status, 200);
    assert_eq!(body["message"], "Access token refreshed successfully");
    assert_ne!(body["data"]["refreshToken"], original.as_str());

    let (status, body) = server
        .post_json(
            "/api/v1/users/refresh-token",
            None,
            json!({ "refreshToken": original }),
        )
        .await;
    assert_eq!(status, 403);
    assert_eq!(body["message"], "Refresh token reuse detected, login again");
}

#[tokio::test]
async fn test_refresh_without_token_is_unauthorized() {
    let server = TestServer::new().await;

    let (status, _) = server
        .post_json("/api/v1/users/refresh-token", None, json!({}))
        .await;
    assert_eq!(status, 401);
}

#[tokio::test]
async fn test_logout_revokes_refresh_token() {
    let server = TestServer::new().await;
    let alice = server.create_user("alice", "public").await;

    let (_, login) = server
        .post_json(
            "/api/v1/users/login",
            None,
            json!({ "email": alice.email, "password": TEST_PASSWORD }),
        )
        .await;
    let access = login["data"]["accessToken"].as_str().unwrap().to_string();
    let refresh = login["data"]["refreshToken"].as_str().unwrap().to_string();

    let (status, body) = server
        .post_json("/api/v1/users/logout", Some(&access), json!({}))
        .await;
    assert_eq!(status, 200);
    assert_eq!(body["message"], "User logged out successfully");

    let (status, _) = server
        .post_json(
            "/api/v1/users/refresh-token",
            None,
            json!({ "refreshToken": refresh }),
        )
        .await;
    assert_eq!(status, 403);
}

#[tokio::test]
async fn test_change_password() {
    let server = TestServer::new().await;
    let alice = server.create_user("alice", "public").await;

    let (status, body) = server
        .post_json(
            "/api/v1/users/change-password",
            Some(&alice.access_token),
            json!({ "oldPassword": "wrong", "newPassword": "new-password" }),
        )
        .await;
    assert_eq!(status, 400);
    assert_eq!(body["message"], "Old password did not match");

    let (status, _) = server
        .post_json(
            "/api/v1/users/change-password",
            Some(&alice.access_token),
            json!({ "oldPassword": TEST_PASSWORD, "newPassword": "new-password" }),
        )
        .await;
    assert_eq!(status, 200);

    server.login(&alice.email, "new-password").await;
}

#[tokio::test]
async fn test_update_profile_and_privacy() {
    let server = TestServer::new().await;
    let alice = server.create_user("alice", "public").await;
    server.create_user("bob", "public").await;

    let (status, body) = server
        .post_json(
            "/api/v1/users/update-profile",
            Some(&alice.access_token),
            json!({ "username": "bob" }),
        )
        .await;
    assert_eq!(status, 400);
    assert_eq!(body["message"], "Username or Email is already taken. Try other");

    let (status, body) = server
        .post_json(
            "/api/v1/users/update-profile",
            Some(&alice.access_token),
            json!({ "bio": "updated bio" }),
        )
        .await;
    assert_eq!(status, 200);
    assert_eq!(body["data"]["bio"], "updated bio");
    assert_eq!(body["data"]["username"], "alice");

    let (status, body) = server
        .post_json(
            "/api/v1/users/update-privacy",
            Some(&alice.access_token),
            json!({ "privacy": "followers" }),
        )
        .await;
    assert_eq!(status, 200);
    assert_eq!(body["data"]["privacy"], "followers");

    let (status, _) = server
        .post_json(
            "/api/v1/users/update-privacy",
            Some(&alice.access_token),
            json!({ "privacy": "everyone" }),
        )
        .await;
    assert_eq!(status, 400);
}

#[tokio::test]
async fn test_profile_lookup_and_search() {
    let server = TestServer::new().await;
    let alice = server.create_user("alice", "public").await;
    server.create_user("alfred", "public").await;
    server.create_user("bob", "public").await;

    let (status, body) = server
        .get_json(
            &format!("/api/v1/users/profile/{}", alice.id),
            Some(&alice.access_token),
        )
        .await;
    assert_eq!(status, 200);
    assert_eq!(body["data"]["username"], "alice");

    let (status, body) = server
        .get_json("/api/v1/users/profile/not-an-id", Some(&alice.access_token))
        .await;
    assert_eq!(status, 400);
    assert_eq!(body["message"], "Invalid id provided.");

    let (status, body) = server
        .get_json("/api/v1/users/search?query=al", Some(&alice.access_token))
        .await;
    assert_eq!(status, 200);
    let names: Vec<&str> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|account| account["username"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["alfred", "alice"]);

    let (status, body) = server
        .get_json("/api/v1/users/search?query=zz", Some(&alice.access_token))
        .await;
    assert_eq!(status, 404);
    assert_eq!(body["message"], "No matching users found");
}
