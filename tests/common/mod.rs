//! Common test utilities for E2E tests

#![allow(dead_code)]

pub mod schema_validator;

use reqwest::StatusCode;
use serde_json::{Value, json};
use socialhub::{AppState, config};
use tempfile::TempDir;
use tokio::net::TcpListener;

pub const TEST_PASSWORD: &str = "correct horse battery staple";

/// Test server instance
pub struct TestServer {
    pub addr: String,
    pub state: AppState,
    pub _temp_dir: TempDir,
    pub client: reqwest::Client,
}

/// An account registered through the API, with a live access token
#[derive(Debug, Clone)]
pub struct TestUser {
    pub id: String,
    pub username: String,
    pub email: String,
    pub access_token: String,
}

impl TestServer {
    /// Create a new test server instance
    pub async fn new() -> Self {
        socialhub::metrics::init_metrics();

        // Create temporary directory for test database and media
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("test.db");
        let media_root = temp_dir.path().join("media");

        // Bind first so the media public URL can point at this server
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let addr_str = format!("http://{}", addr);

        let config = config::AppConfig {
            server: config::ServerConfig {
                host: "127.0.0.1".to_string(),
                port: addr.port(),
                domain: "localhost".to_string(),
                protocol: "http".to_string(),
                json_body_limit: 16 * 1024,
            },
            database: config::DatabaseConfig { path: db_path },
            storage: config::StorageConfig {
                media: config::MediaStorageConfig {
                    backend: config::MediaBackendKind::Local,
                    local_root: media_root,
                    bucket: "test-media".to_string(),
                    public_url: format!("{}/media", addr_str),
                },
            },
            cloudflare: None,
            auth: config::AuthConfig {
                token_secret: "test-secret-key-32-bytes-long!!!".to_string(),
                access_token_max_age: 3600,
                refresh_token_max_age: 7200,
            },
            logging: config::LoggingConfig {
                level: "info".to_string(),
                format: "pretty".to_string(),
            },
        };

        // Initialize app state
        let state = AppState::new(config).await.unwrap();

        // Create HTTP client
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(10))
            .build()
            .unwrap();

        let app = socialhub::build_router(state.clone());

        // Spawn server in background
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            addr: addr_str,
            state,
            _temp_dir: temp_dir,
            client,
        }
    }

    /// Get base URL for API requests
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.addr, path)
    }

    /// Register an account and log it in
    pub async fn create_user(&self, username: &str, privacy: &str) -> TestUser {
        let email = format!("{}@example.com", username);
        let (status, body) = self
            .post_json(
                "/api/v1/users/register",
                None,
                json!({
                    "username": username,
                    "email": email,
                    "password": TEST_PASSWORD,
                    "privacy": privacy,
                }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "register failed: {body}");

        let id = body["data"]["id"].as_str().unwrap().to_string();
        let access_token = self.login(&email, TEST_PASSWORD).await;

        TestUser {
            id,
            username: username.to_string(),
            email,
            access_token,
        }
    }

    /// Log in and return the access token
    pub async fn login(&self, email: &str, password: &str) -> String {
        let (status, body) = self
            .post_json(
                "/api/v1/users/login",
                None,
                json!({ "email": email, "password": password }),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "login failed: {body}");

        body["data"]["accessToken"].as_str().unwrap().to_string()
    }

    fn authorize(&self, request: reqwest::RequestBuilder, token: Option<&str>) -> reqwest::RequestBuilder {
        match token {
            Some(token) => request.header("Authorization", format!("Bearer {}", token)),
            None => request,
        }
    }

    async fn into_parts(response: reqwest::Response) -> (StatusCode, Value) {
        let status = response.status();
        let body = response.json::<Value>().await.unwrap_or(Value::Null);
        (status, body)
    }

    pub async fn get_json(&self, path: &str, token: Option<&str>) -> (StatusCode, Value) {
        let request = self.authorize(self.client.get(self.url(path)), token);
        Self::into_parts(request.send().await.unwrap()).await
    }

    pub async fn post_json(&self, path: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        let request = self.authorize(self.client.post(self.url(path)), token).json(&body);
        Self::into_parts(request.send().await.unwrap()).await
    }

    pub async fn patch_json(&self, path: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        let request = self.authorize(self.client.patch(self.url(path)), token).json(&body);
        Self::into_parts(request.send().await.unwrap()).await
    }

    pub async fn delete_json(&self, path: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        let request = self.authorize(self.client.delete(self.url(path)), token).json(&body);
        Self::into_parts(request.send().await.unwrap()).await
    }

    /// `A -> B` follow through the API; returns the resulting edge status
    pub async fn follow(&self, follower: &TestUser, followee: &TestUser) -> String {
        let (status, body) = self
            .post_json(
                "/api/v1/follows/follow",
                Some(&follower.access_token),
                json!({ "followingId": followee.id }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "follow failed: {body}");
        body["data"]["status"].as_str().unwrap().to_string()
    }
}
