//! Shared test helpers for integration tests.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration as StdDuration;

use axum::Router;
use axum::body::Body;
use chrono::{Duration, TimeZone, Utc};
use http::{Request, StatusCode};
use serde_json::Value;
use tower::ServiceExt;

use sharecode_api::{AppState, build_app, build_services};
use sharecode_core::config::{AppConfig, BlobProvider, DatabaseBackend};
use sharecode_core::traits::{BlobStore, ManualClock};
use sharecode_database::Stores;
use sharecode_service::{CodeSource, TimeRandomCodeSource};
use sharecode_storage::providers::MemoryBlobStore;
use sharecode_storage::{BlobStoreManager, RetryPolicy};

/// Test application context
pub struct TestApp {
    /// The Axum router for making test requests
    pub router: Router,
    /// In-memory stores behind the router
    pub stores: Stores,
    /// Blob store the router deletes from
    pub blobs: MemoryBlobStore,
    /// Clock every service reads
    pub clock: Arc<ManualClock>,
    /// Application config
    pub config: AppConfig,
}

impl TestApp {
    /// Create a new test application
    pub fn new() -> Self {
        Self::with_codes(TimeRandomCodeSource::new())
    }

    /// Create a test application that draws share codes from `codes`
    pub fn with_codes(codes: impl CodeSource) -> Self {
        Self::build(
            codes,
            |blobs| Arc::new(blobs),
            RetryPolicy::no_retry(StdDuration::from_secs(1)),
        )
    }

    /// Create a test application whose blob deletes go through `wrap`
    /// instead of straight to the in-memory store
    pub fn with_blob_store(
        wrap: impl FnOnce(MemoryBlobStore) -> Arc<dyn BlobStore>,
        retry: RetryPolicy,
    ) -> Self {
        Self::build(TimeRandomCodeSource::new(), wrap, retry)
    }

    fn build(
        codes: impl CodeSource,
        wrap: impl FnOnce(MemoryBlobStore) -> Arc<dyn BlobStore>,
        retry: RetryPolicy,
    ) -> Self {
        let mut config = AppConfig::default();
        config.database.backend = DatabaseBackend::Memory;
        config.blob_store.provider = BlobProvider::Memory;
        config.sweeper.enabled = false;
        config.share.code_max_attempts = 3;

        let clock = Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2024, 9, 1, 9, 0, 0).unwrap(),
        ));
        let stores = Stores::in_memory();
        let blobs = MemoryBlobStore::new(2 * 1024 * 1024 * 1024);
        let manager = Arc::new(BlobStoreManager::from_provider(wrap(blobs.clone()), retry));

        let services = build_services(
            &config,
            &stores,
            manager.clone(),
            clock.clone(),
            Arc::new(codes),
        );
        let state = AppState::new(Arc::new(config.clone()), &services, &stores, manager);

        Self {
            router: build_app(state),
            stores,
            blobs,
            clock,
            config,
        }
    }

    /// Move the clock forward
    pub fn advance(&self, by: Duration) {
        self.clock.advance(by);
    }

    /// Register `files` (name, size, key) and return the share code
    pub async fn create_share(&self, files: &[(&str, u64, &str)], body_extra: Value) -> String {
        for (_, size, key) in files {
            self.blobs.put(*key, *size);
        }

        let mut body = serde_json::json!({
            "Files": files
                .iter()
                .map(|(name, size, key)| serde_json::json!({
                    "Name": name,
                    "Size": size.to_string(),
                    "Key": key,
                }))
                .collect::<Vec<_>>(),
        });
        if let (Some(body), Some(extra)) = (body.as_object_mut(), body_extra.as_object()) {
            body.extend(extra.clone());
        }

        let response = self.request("POST", "/api/store", Some(body)).await;
        assert_eq!(
            response.status,
            StatusCode::CREATED,
            "Create failed: {:?}",
            response.body
        );

        response.body["ShareCode"]
            .as_str()
            .expect("No ShareCode in create response")
            .to_string()
    }

    /// Make an HTTP request to the test app
    pub async fn request(&self, method: &str, path: &str, body: Option<Value>) -> TestResponse {
        let body_str = body
            .map(|b| serde_json::to_string(&b).expect("Failed to serialize body"))
            .unwrap_or_default();

        self.raw_request(method, path, body_str).await
    }

    /// Make an HTTP request with a raw body
    pub async fn raw_request(&self, method: &str, path: &str, body: String) -> TestResponse {
        let req = Request::builder()
            .method(method)
            .uri(path)
            .header("Content-Type", "application/json")
            .body(Body::from(body))
            .expect("Failed to build request");

        let response = self
            .router
            .clone()
            .oneshot(req)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
            .await
            .expect("Failed to read body");

        let body: Value = serde_json::from_slice(&body_bytes).unwrap_or(Value::Null);

        TestResponse { status, body }
    }
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    /// HTTP status code
    pub status: StatusCode,
    /// Parsed JSON body
    pub body: Value,
}
