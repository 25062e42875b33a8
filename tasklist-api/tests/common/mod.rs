/// Common test utilities for integration tests
///
/// This module provides shared infrastructure for integration tests:
/// - An app over the in-memory store
/// - Request builders that attach the session header
/// - Body decoding helpers

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::Value;
use tasklist_api::app::{build_router, AppState};
use tasklist_api::config::{ApiConfig, Config, StoreBackend, StoreConfig, TokenConfig};
use tasklist_shared::auth::SESSION_HEADER;
use tasklist_shared::store::memory::MemoryStore;
use tower::ServiceExt;

pub const TEST_SECRET: &str = "test-secret-key-at-least-32-bytes-long";

/// Configuration for a memory-backed app
pub fn test_config() -> Config {
    Config {
        api: ApiConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            cors_origins: vec!["*".to_string()],
        },
        store: StoreConfig {
            backend: StoreBackend::Memory,
            database_url: None,
            max_connections: 1,
        },
        token: TokenConfig {
            secret: TEST_SECRET.to_string(),
        },
    }
}

/// Decoded response
pub struct TestResponse {
    pub status: StatusCode,
    pub token: Option<String>,
    pub body: Value,
}

/// Test context wrapping a fresh app
pub struct TestContext {
    pub app: Router,
    pub state: AppState,
}

impl TestContext {
    /// Creates an app over an empty in-memory store
    pub fn new() -> Self {
        let state = AppState::with_backend(test_config(), MemoryStore::new());
        let app = build_router(state.clone());
        Self { app, state }
    }

    /// Sends a request, optionally with a session token and JSON body
    pub async fn send(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);

        if let Some(token) = token {
            builder = builder.header(SESSION_HEADER, token);
        }

        let body = match body {
            Some(json) => {
                builder = builder.header("content-type", "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };

        let response = self
            .app
            .clone()
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap();

        let status = response.status();
        let token = response
            .headers()
            .get(SESSION_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };

        TestResponse {
            status,
            token,
            body,
        }
    }

    /// Registers an account and returns its token
    pub async fn register(&self, email: &str, password: &str) -> String {
        let response = self
            .send(
                "POST",
                "/accounts",
                None,
                Some(serde_json::json!({ "email": email, "password": password })),
            )
            .await;
        assert_eq!(response.status, StatusCode::OK, "register failed: {}", response.body);
        response.token.expect("registration returns a token")
    }

    /// Creates a task for the token's account and returns its JSON
    pub async fn create_task(&self, token: &str, text: &str) -> Value {
        let response = self
            .send(
                "POST",
                "/tasks",
                Some(token),
                Some(serde_json::json!({ "text": text })),
            )
            .await;
        assert_eq!(response.status, StatusCode::OK, "create failed: {}", response.body);
        response.body
    }
}
