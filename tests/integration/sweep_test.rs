//! Integration tests for the on-demand expiration sweep.

mod helpers;

use chrono::Duration;
use http::StatusCode;
use serde_json::json;

use sharecode_database::{BlobDeletionQueue, ShareStore};

use helpers::TestApp;

#[tokio::test]
async fn test_clear_expired_removes_entry_and_blob() {
    let app = TestApp::new();
    let code = app.create_share(&[("a.txt", 100, "k1")], json!({})).await;

    app.advance(Duration::hours(25));

    let response = app.request("POST", "/api/store/clearExpired", None).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["removed"], 1);
    assert_eq!(response.body["blobFailures"], 0);
    assert_eq!(response.body["message"], "Expired files deleted successfully");

    let get = app
        .request("GET", &format!("/api/store?code={code}"), None)
        .await;
    assert_eq!(get.status, StatusCode::NOT_FOUND);
    assert!(app.blobs.was_deleted("k1"));
    assert!(!app.blobs.contains("k1"));
}

#[tokio::test]
async fn test_clear_expired_is_idempotent() {
    let app = TestApp::new();
    app.create_share(&[("a.txt", 100, "k1")], json!({})).await;
    app.advance(Duration::hours(25));

    let first = app.request("GET", "/api/store/clearExpired", None).await;
    assert_eq!(first.body["removed"], 1);

    let second = app.request("GET", "/api/store/clearExpired", None).await;
    assert_eq!(second.status, StatusCode::OK);
    assert_eq!(second.body["removed"], 0);
}

#[tokio::test]
async fn test_clear_expired_keeps_live_entries() {
    let app = TestApp::new();
    let short = app
        .create_share(&[("a.txt", 1, "k1")], json!({ "ExpiresIn": 60 }))
        .await;
    let long = app.create_share(&[("b.txt", 2, "k2")], json!({})).await;

    app.advance(Duration::minutes(5));

    let response = app.request("POST", "/api/store/clearExpired", None).await;
    assert_eq!(response.body["removed"], 1);
    assert_eq!(app.stores.shares.count().await.unwrap(), 1);

    let gone = app
        .request("GET", &format!("/api/store?code={short}"), None)
        .await;
    assert_eq!(gone.status, StatusCode::NOT_FOUND);

    let live = app
        .request("GET", &format!("/api/store?code={long}"), None)
        .await;
    assert_eq!(live.status, StatusCode::OK);
    assert!(app.blobs.contains("k2"));
}

#[tokio::test]
async fn test_clear_expired_queues_blobs_during_outage() {
    let app = TestApp::new();
    app.create_share(&[("a.txt", 100, "k1"), ("b.txt", 1, "k2")], json!({}))
        .await;
    app.advance(Duration::days(2));
    app.blobs.set_available(false);

    let response = app.request("POST", "/api/store/clearExpired", None).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["removed"], 1);
    assert_eq!(response.body["blobFailures"], 2);

    assert_eq!(app.stores.shares.count().await.unwrap(), 0);
    assert_eq!(app.stores.deletions.count().await.unwrap(), 2);
}
