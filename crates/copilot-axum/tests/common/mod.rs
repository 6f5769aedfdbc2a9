//! Shared fixtures for the router tests.

#![allow(dead_code)]

pub mod fakes;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, Response, StatusCode};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use copilot_axum::bootstrap::{AxumContext, CorsConfig};
use copilot_axum::routes::create_router;
use copilot_core::MemoryStore;

use fakes::{FakeChatModel, FakeConnector, Journal};

/// A router over an in-memory store, a fake MCP connector and a fake model.
pub struct TestApp {
    pub router: Router,
    pub journal: Arc<Journal>,
    _dir: tempfile::TempDir,
}

/// Catalog used by the tests.
pub const CATALOG_YAML: &str = r#"
servers:
  - label: XM Cloud
    name: XM
    url: https://xm.example.com/mcp
    type: http
    security: open
    apiDefinitionId: xmcloud-authoring
    headers:
      - key: Authorization
        required: true
        source:
          type: apiDefinition
          fieldId: apiKey
  - label: Docs
    name: Docs
    url: https://docs.example.com/sse
    type: sse
    security: open
    headers: []
"#;

pub fn test_app() -> TestApp {
    test_app_with(FakeChatModel::default(), Duration::from_secs(300))
}

pub fn test_app_with(model: FakeChatModel, chat_max_duration: Duration) -> TestApp {
    let dir = tempfile::tempdir().unwrap();
    let catalog_path: PathBuf = dir.path().join("mcp-servers.yaml");
    std::fs::write(&catalog_path, CATALOG_YAML).unwrap();

    let journal = Arc::new(Journal::default());
    let ctx = AxumContext::new(
        Arc::new(MemoryStore::new()),
        Arc::new(FakeConnector::new(Arc::clone(&journal))),
        Arc::new(model.with_journal(Arc::clone(&journal))),
        catalog_path,
        chat_max_duration,
    );
    TestApp {
        router: create_router(ctx, &CorsConfig::AllowAll),
        journal,
        _dir: dir,
    }
}

impl TestApp {
    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.router.clone().oneshot(request).await.unwrap()
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        let response = self
            .send(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await;
        json_parts(response).await
    }

    pub async fn send_json(&self, method: &str, uri: &str, body: &Value) -> (StatusCode, Value) {
        let response = self
            .send(
                Request::builder()
                    .method(method)
                    .uri(uri)
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await;
        json_parts(response).await
    }
}

pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    response.into_body().collect().await.unwrap().to_bytes().to_vec()
}

/// Status plus JSON body (`Null` for empty bodies).
pub async fn json_parts(response: Response<Body>) -> (StatusCode, Value) {
    let status = response.status();
    let bytes = body_bytes(response).await;
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}
