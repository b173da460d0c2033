//! Integration tests for share create, retrieval, and delete.

mod helpers;

use std::sync::Arc;
use std::time::Duration as StdDuration;

use async_trait::async_trait;
use chrono::Duration;
use http::StatusCode;
use serde_json::json;

use sharecode_core::result::AppResult;
use sharecode_core::traits::{BlobStore, Clock, UsageInfo};
use sharecode_database::{BlobDeletionQueue, ShareStore};
use sharecode_entity::blob::DeletionReason;
use sharecode_service::share::FixedCodeSource;
use sharecode_storage::RetryPolicy;
use sharecode_storage::providers::MemoryBlobStore;

use helpers::TestApp;

#[tokio::test]
async fn test_create_share_returns_entry() {
    let app = TestApp::new();
    app.blobs.put("k1", 100);
    app.blobs.put("k2", 250);

    let response = app
        .request(
            "POST",
            "/api/store",
            Some(json!({
                "Files": [
                    { "Name": "a.txt", "Size": "100", "Key": "k1" },
                    { "Name": "b.png", "Size": "250", "Key": "k2" },
                ],
            })),
        )
        .await;

    assert_eq!(response.status, StatusCode::CREATED);
    let body = &response.body;
    assert_eq!(body["size"], "350");
    assert_eq!(body["ExpiresIn"], 86_400);
    assert_eq!(body["OneTimeCode"], false);
    assert_eq!(body["File"].as_array().map(Vec::len), Some(2));
    assert_eq!(body["File"][1]["Name"], "b.png");
    assert_eq!(body["createdAt"], "2024-09-01T09:00:00Z");
    assert_eq!(body["expiresAt"], "2024-09-02T09:00:00Z");

    let code = body["ShareCode"].as_str().unwrap();
    assert_eq!(code.len(), 6);
    assert!(code.chars().all(|c| c.is_ascii_alphanumeric()));
}

#[tokio::test]
async fn test_get_returns_what_was_stored() {
    let app = TestApp::new();
    let code = app
        .create_share(&[("a.txt", 100, "k1"), ("b.txt", 5, "k2")], json!({}))
        .await;

    let response = app
        .request("GET", &format!("/api/store?code={code}"), None)
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["ShareCode"], code.as_str());
    assert_eq!(response.body["size"], "105");
    assert_eq!(response.body["File"][0]["Key"], "k1");
    assert_eq!(response.body["File"][1]["Size"], "5");
}

#[tokio::test]
async fn test_create_accepts_numeric_size_and_custom_lifetime() {
    let app = TestApp::new();
    let response = app
        .request(
            "POST",
            "/api/store",
            Some(json!({
                "Files": [{ "Name": "a.txt", "Size": 42, "Key": "k1" }],
                "ExpiresIn": 3600,
            })),
        )
        .await;

    assert_eq!(response.status, StatusCode::CREATED);
    assert_eq!(response.body["size"], "42");
    assert_eq!(response.body["expiresAt"], "2024-09-01T10:00:00Z");
}

#[tokio::test]
async fn test_create_without_files_is_bad_request() {
    let app = TestApp::new();

    let missing = app.request("POST", "/api/store", Some(json!({}))).await;
    assert_eq!(missing.status, StatusCode::BAD_REQUEST);
    assert_eq!(missing.body["code"], "VALIDATION_ERROR");

    let empty = app
        .request("POST", "/api/store", Some(json!({ "Files": [] })))
        .await;
    assert_eq!(empty.status, StatusCode::BAD_REQUEST);

    assert_eq!(app.stores.shares.count().await.unwrap(), 0);
}

#[tokio::test]
async fn test_create_with_bad_size_is_bad_request() {
    let app = TestApp::new();
    let response = app
        .request(
            "POST",
            "/api/store",
            Some(json!({ "Files": [{ "Name": "a.txt", "Size": "lots", "Key": "k1" }] })),
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(app.stores.shares.count().await.unwrap(), 0);
}

#[tokio::test]
async fn test_create_with_malformed_json_is_bad_request() {
    let app = TestApp::new();
    let response = app
        .raw_request("POST", "/api/store", "{\"Files\": [".to_string())
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_create_with_excessive_lifetime_is_bad_request() {
    let app = TestApp::new();
    let response = app
        .request(
            "POST",
            "/api/store",
            Some(json!({
                "Files": [{ "Name": "a.txt", "Size": "1", "Key": "k1" }],
                "ExpiresIn": 365 * 86_400,
            })),
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_get_without_code_is_bad_request() {
    let app = TestApp::new();

    let response = app.request("GET", "/api/store", None).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["error"], "Share code is required");

    let blank = app.request("GET", "/api/store?code=", None).await;
    assert_eq!(blank.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_get_unknown_code_is_not_found() {
    let app = TestApp::new();

    let response = app.request("GET", "/api/store?code=ZZZZZZ", None).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.body["code"], "NOT_FOUND");

    let malformed = app
        .request("GET", "/api/store?code=not%20a%20code", None)
        .await;
    assert_eq!(malformed.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_expired_share_is_gone_before_sweep() {
    let app = TestApp::new();
    let code = app.create_share(&[("a.txt", 100, "k1")], json!({})).await;

    app.advance(Duration::hours(24));

    let response = app
        .request("GET", &format!("/api/store?code={code}"), None)
        .await;
    assert_eq!(response.status, StatusCode::GONE);
    assert_eq!(response.body["code"], "EXPIRED");

    // Still stored until a sweep runs.
    assert_eq!(app.stores.shares.count().await.unwrap(), 1);
}

#[tokio::test]
async fn test_one_time_share_is_consumed_by_first_get() {
    let app = TestApp::new();
    let code = app
        .create_share(&[("a.txt", 100, "k1")], json!({ "OneTimeCode": true }))
        .await;

    let first = app
        .request("GET", &format!("/api/store?code={code}"), None)
        .await;
    assert_eq!(first.status, StatusCode::OK);
    assert_eq!(first.body["OneTimeCode"], true);

    let second = app
        .request("GET", &format!("/api/store?code={code}"), None)
        .await;
    assert_eq!(second.status, StatusCode::NOT_FOUND);
    assert_eq!(app.stores.shares.count().await.unwrap(), 0);

    // The recipient still needs the blob, so its delete is deferred.
    assert!(app.blobs.contains("k1"));
    assert_eq!(app.stores.deletions.count().await.unwrap(), 1);
}

#[tokio::test]
async fn test_probe_does_not_consume_one_time_share() {
    let app = TestApp::new();
    let code = app
        .create_share(&[("a.txt", 100, "k1")], json!({ "OneTimeCode": true }))
        .await;

    let probe = app
        .request("GET", &format!("/api/store?code={code}&probe=true"), None)
        .await;
    assert_eq!(probe.status, StatusCode::OK);

    let real = app
        .request("GET", &format!("/api/store?code={code}"), None)
        .await;
    assert_eq!(real.status, StatusCode::OK);
}

#[tokio::test]
async fn test_concurrent_one_time_gets_have_one_winner() {
    let app = TestApp::new();
    let code = app
        .create_share(&[("a.txt", 100, "k1")], json!({ "OneTimeCode": true }))
        .await;
    let path = format!("/api/store?code={code}");

    let (a, b, c) = tokio::join!(
        app.request("GET", &path, None),
        app.request("GET", &path, None),
        app.request("GET", &path, None),
    );

    let statuses = [a.status, b.status, c.status];
    assert_eq!(statuses.iter().filter(|s| **s == StatusCode::OK).count(), 1);
    assert_eq!(
        statuses
            .iter()
            .filter(|s| **s == StatusCode::NOT_FOUND)
            .count(),
        2
    );
}

#[tokio::test]
async fn test_delete_removes_share_and_blobs() {
    let app = TestApp::new();
    let code = app
        .create_share(&[("a.txt", 100, "k1"), ("b.txt", 1, "k2")], json!({}))
        .await;

    let response = app
        .request("DELETE", &format!("/api/store?code={code}"), None)
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["deleted"], true);
    assert!(app.blobs.was_deleted("k1"));
    assert!(app.blobs.was_deleted("k2"));

    let again = app
        .request("DELETE", &format!("/api/store?code={code}"), None)
        .await;
    assert_eq!(again.status, StatusCode::NOT_FOUND);

    let get = app
        .request("GET", &format!("/api/store?code={code}"), None)
        .await;
    assert_eq!(get.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_survives_blob_store_outage() {
    let app = TestApp::new();
    let code = app.create_share(&[("a.txt", 100, "k1")], json!({})).await;
    app.blobs.set_available(false);

    let response = app
        .request("DELETE", &format!("/api/store?code={code}"), None)
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(app.stores.shares.count().await.unwrap(), 0);
    assert_eq!(app.stores.deletions.count().await.unwrap(), 1);
}

#[tokio::test]
async fn test_code_collision_is_retried() {
    let app = TestApp::with_codes(FixedCodeSource::new(["AAAAAA", "AAAAAA", "BBBBBB"]));

    let first = app.create_share(&[("a.txt", 1, "k1")], json!({})).await;
    let second = app.create_share(&[("b.txt", 2, "k2")], json!({})).await;

    assert_eq!(first, "AAAAAA");
    assert_eq!(second, "BBBBBB");
    assert_eq!(app.stores.shares.count().await.unwrap(), 2);
}

#[tokio::test]
async fn test_code_exhaustion_is_service_unavailable() {
    let app = TestApp::with_codes(FixedCodeSource::new([
        "AAAAAA", "AAAAAA", "AAAAAA", "AAAAAA",
    ]));
    app.create_share(&[("a.txt", 1, "k1")], json!({})).await;

    let response = app
        .request(
            "POST",
            "/api/store",
            Some(json!({ "Files": [{ "Name": "b.txt", "Size": "2", "Key": "k2" }] })),
        )
        .await;

    assert_eq!(response.status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(response.body["code"], "GENERATION_EXHAUSTED");
    assert_eq!(app.stores.shares.count().await.unwrap(), 1);
}

/// Blob store whose deletes take an hour to come back.
#[derive(Debug)]
struct StalledBlobStore(MemoryBlobStore);

#[async_trait]
impl BlobStore for StalledBlobStore {
    fn provider_type(&self) -> &str {
        "stalled"
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(true)
    }

    async fn delete_files(&self, keys: &[String]) -> AppResult<u64> {
        tokio::time::sleep(StdDuration::from_secs(3600)).await;
        self.0.delete_files(keys).await
    }

    async fn usage(&self) -> AppResult<UsageInfo> {
        self.0.usage().await
    }
}

#[tokio::test(start_paused = true)]
async fn test_timed_out_delete_keeps_blob_keys_queued() {
    let app = TestApp::with_blob_store(
        |blobs| Arc::new(StalledBlobStore(blobs)),
        RetryPolicy::no_retry(StdDuration::from_secs(2 * 3600)),
    );
    let code = app.create_share(&[("a.txt", 10, "k1")], json!({})).await;

    let response = app
        .request("DELETE", &format!("/api/store?code={code}"), None)
        .await;
    assert_eq!(response.status, StatusCode::REQUEST_TIMEOUT);
    assert_eq!(app.stores.shares.count().await.unwrap(), 0);

    // The key is on record while the delete is still running.
    let queued = app.stores.deletions.list(10).await.unwrap();
    assert_eq!(queued.len(), 1);
    assert_eq!(queued[0].storage_key, "k1");
    assert_eq!(queued[0].reason, DeletionReason::PurgeFailed);
    assert!(
        app.stores
            .deletions
            .due(app.clock.now(), 10, 10)
            .await
            .unwrap()
            .is_empty()
    );

    // The purge outlives the request and clears its queue row.
    tokio::time::sleep(StdDuration::from_secs(2 * 3600)).await;
    assert!(!app.blobs.contains("k1"));
    assert_eq!(app.stores.deletions.count().await.unwrap(), 0);
}
