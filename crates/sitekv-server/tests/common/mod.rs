//! Shared helpers for server integration tests.

#![allow(dead_code, clippy::unwrap_used, clippy::expect_used)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use sitekv_server::config::ServerConfig;
use sitekv_server::state::AppState;
use sitekv_storage::{MemoryBackend, StorageBackend, StorageError};
use tower::ServiceExt;

/// A router over an in-memory backend the test can inspect directly.
pub struct TestServer {
    pub router: axum::Router,
    pub backend: MemoryBackend,
}

impl TestServer {
    pub fn new() -> Self {
        let backend = MemoryBackend::new();
        let router = router_over(Arc::new(backend.clone()));
        Self { router, backend }
    }

    /// Send a request and return the status and parsed JSON body.
    pub async fn request(
        &self,
        method: &str,
        uri: &str,
        body: Option<serde_json::Value>,
    ) -> (StatusCode, serde_json::Value) {
        json_request(&self.router, method, uri, body).await
    }
}

pub fn router_over(storage: Arc<dyn StorageBackend>) -> axum::Router {
    sitekv_server::build_router(Arc::new(AppState::new(storage)), &ServerConfig::default())
}

pub async fn json_request(
    router: &axum::Router,
    method: &str,
    uri: &str,
    body: Option<serde_json::Value>,
) -> (StatusCode, serde_json::Value) {
    let mut builder = Request::builder().method(method).uri(uri);

    let body = match body {
        Some(v) => {
            builder = builder.header("Content-Type", "application/json");
            Body::from(serde_json::to_vec(&v).unwrap())
        }
        None => Body::empty(),
    };

    let response = router
        .clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap();
    let status = response.status();

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("response body should be JSON")
    };

    (status, json)
}

/// Backend that fails every call, for 500-path tests.
pub struct OfflineBackend;

#[async_trait::async_trait]
impl StorageBackend for OfflineBackend {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Err(StorageError::Read {
            key: key.to_owned(),
            reason: "backend offline".to_owned(),
        })
    }

    async fn put(&self, key: &str, _value: &str) -> Result<(), StorageError> {
        Err(StorageError::Write {
            key: key.to_owned(),
            reason: "backend offline".to_owned(),
        })
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        Err(StorageError::Delete {
            key: key.to_owned(),
            reason: "backend offline".to_owned(),
        })
    }

    async fn list(&self, prefix: &str) -> Result<Vec<String>, StorageError> {
        Err(StorageError::List {
            prefix: prefix.to_owned(),
            reason: "backend offline".to_owned(),
        })
    }
}
