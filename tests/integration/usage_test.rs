//! Integration tests for usage stats and the health check.

mod helpers;

use http::StatusCode;

use helpers::TestApp;

#[tokio::test]
async fn test_stats_reports_blob_usage() {
    let app = TestApp::new();
    app.blobs.put("k1", 1024);
    app.blobs.put("k2", 512);

    let response = app.request("GET", "/api/store/stats", None).await;

    assert_eq!(response.status, StatusCode::OK);
    let body = &response.body;
    assert_eq!(body["totalBytes"], 1536);
    assert_eq!(body["appTotalBytes"], 1536);
    assert_eq!(body["filesUploaded"], 2);
    assert_eq!(body["limitBytes"], 2u64 * 1024 * 1024 * 1024);
    assert_eq!(body["formatted"]["appTotal"], "1.50 KB");
    assert_eq!(body["formatted"]["limit"], "2.00 GB");
}

#[tokio::test]
async fn test_stats_upstream_failure_is_bad_gateway() {
    let app = TestApp::new();
    app.blobs.set_available(false);

    let response = app.request("GET", "/api/store/stats", None).await;

    assert_eq!(response.status, StatusCode::BAD_GATEWAY);
    assert_eq!(response.body["code"], "UPSTREAM_STORE_FAILURE");
}

#[tokio::test]
async fn test_health_reports_dependencies() {
    let app = TestApp::new();

    let response = app.request("GET", "/api/health", None).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["status"], "ok");
    assert_eq!(response.body["store"], "connected");
    assert_eq!(response.body["blob_store"], "available");

    app.blobs.set_available(false);
    let degraded = app.request("GET", "/api/health", None).await;
    assert_eq!(degraded.status, StatusCode::OK);
    assert_eq!(degraded.body["status"], "degraded");
    assert_eq!(degraded.body["blob_store"], "unavailable");
}

#[tokio::test]
async fn test_unknown_route_is_not_found() {
    let app = TestApp::new();
    let response = app.request("GET", "/api/nope", None).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}
