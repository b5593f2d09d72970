//! Common test utilities for E2E testing with mocks.
//!
//! This module provides a test fixture that creates an in-process server
//! backed by a mock media server, enabling E2E testing of the HTTP surface
//! without a real Logitech Media Server.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

use squeezer_core::{load_config_from_str, testing::MockMediaServer, MediaSkill};
use squeezer_server::{api::create_router, state::AppState};

/// Re-export fixtures for test convenience
pub use squeezer_core::testing::fixtures;

/// Test fixture for E2E testing with a mock media server.
///
/// The mock is seeded with the fixture library, favorites, playlists,
/// podcasts and a two-player roster before the skill is initialized.
///
/// # Example
///
/// ```rust,ignore
/// #[tokio::test]
/// async fn test_play() {
///     let fixture = TestFixture::new().await;
///
///     let response = fixture.post("/api/v1/play", json!({
///         "phrase": "the album abbey road"
///     })).await;
///
///     assert_eq!(response.status, 200);
/// }
/// ```
pub struct TestFixture {
    /// The Axum router for testing
    pub router: Router,
    /// Mock media server - inspect recorded calls, inject failures
    pub server: Arc<MockMediaServer>,
    /// Temporary directory holding the catalog cache
    pub temp_dir: TempDir,
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
    pub text: String,
}

impl TestFixture {
    /// Create a new test fixture with the default fixture data.
    pub async fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let config = load_config_from_str(&format!(
            r#"
[server]
host = "lms.local"
password = "hunter2"

[player]
default_player_name = "Living Room"

[cache]
dir = "{}"
"#,
            temp_dir.path().join("cache").display()
        ))
        .expect("Failed to parse config");

        let server = Arc::new(MockMediaServer::new());
        server.set_players(fixtures::roster()).await;
        server.set_catalog(fixtures::beatles_catalog(), 1234.5).await;
        server.set_favorites(fixtures::favorites()).await;
        server.set_playlists(fixtures::playlists()).await;
        server.set_podcasts(fixtures::podcasts()).await;

        let skill = MediaSkill::initialize(&config, server.clone())
            .await
            .expect("Failed to initialize skill");
        server.clear_calls().await;

        let state = Arc::new(AppState::new(config, Arc::new(skill)));
        let router = create_router(state);

        Self {
            router,
            server,
            temp_dir,
        }
    }

    /// Send a GET request to the test server.
    pub async fn get(&self, path: &str) -> TestResponse {
        self.request("GET", path, None).await
    }

    /// Send a POST request with JSON body.
    pub async fn post(&self, path: &str, body: Value) -> TestResponse {
        self.request("POST", path, Some(body)).await
    }

    /// Send a POST request without a body.
    pub async fn post_empty(&self, path: &str) -> TestResponse {
        self.request("POST", path, None).await
    }

    /// Send a POST request with raw string body (for testing malformed JSON).
    pub async fn post_raw(&self, path: &str, body: &str) -> TestResponse {
        let request = Request::builder()
            .method("POST")
            .uri(path)
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        self.send(request).await
    }

    /// Send a request to the test server.
    async fn request(&self, method: &str, path: &str, body: Option<Value>) -> TestResponse {
        let mut request_builder = Request::builder().method(method).uri(path);

        let body = if let Some(json_body) = body {
            request_builder = request_builder.header("Content-Type", "application/json");
            Body::from(serde_json::to_vec(&json_body).unwrap())
        } else {
            Body::empty()
        };

        let request = request_builder.body(body).unwrap();
        self.send(request).await
    }

    async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes();

        let text = String::from_utf8_lossy(&body_bytes).to_string();
        let body: Value = if body_bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body_bytes).unwrap_or(Value::Null)
        };

        TestResponse { status, body, text }
    }
}

/// Helper to assert a response has expected status.
#[macro_export]
macro_rules! assert_status {
    ($response:expr, $status:expr) => {
        assert_eq!(
            $response.status, $status,
            "Expected status {:?}, got {:?}. Body: {}",
            $status, $response.status, $response.text
        );
    };
}
