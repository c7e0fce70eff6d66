// tests/common/mod.rs
// Shared helpers for router-level integration tests

#![allow(dead_code)]

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

use workbench::api::create_router;
use workbench::config::ServerConfig;
use workbench::llm::ProviderId;
use workbench::state::AppState;

/// Isolated workbench rooted in a temp dir
pub struct TestApp {
    pub dir: TempDir,
    pub router: Router,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_config(|config| config)
    }

    pub fn with_config(customise: impl FnOnce(ServerConfig) -> ServerConfig) -> Self {
        let dir = TempDir::new().expect("temp dir");
        let config = customise(ServerConfig::rooted_at(dir.path()));
        let state = AppState::new(config).expect("app state");
        Self {
            dir,
            router: create_router(state),
        }
    }

    /// Every provider pointed at one mock origin
    pub fn against(upstream: &str, env: &str) -> Self {
        let app = Self::with_config(|config| {
            ProviderId::ALL
                .iter()
                .fold(config, |c, id| c.with_base_url(*id, upstream))
        });
        std::fs::write(app.dir.path().join(".env"), env).expect("write .env");
        app
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.send("GET", uri, None).await
    }

    pub async fn post(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.send("POST", uri, Some(body)).await
    }

    pub async fn send(&self, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let (status, _, bytes) = self.raw(method, uri, body).await;
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).expect("JSON response")
        };
        (status, json)
    }

    /// Status, content type and raw body
    pub async fn raw(
        &self,
        method: &str,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Option<String>, Vec<u8>) {
        let mut builder = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(json) => {
                builder = builder.header("content-type", "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };

        let response = self
            .router
            .clone()
            .oneshot(builder.body(body).expect("request"))
            .await
            .expect("router response");

        let status = response.status();
        let content_type = response
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body");
        (status, content_type, bytes.to_vec())
    }
}
