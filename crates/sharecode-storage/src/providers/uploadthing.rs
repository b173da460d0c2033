//! UploadThing HTTP API blob store provider.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use sharecode_core::config::BlobStoreConfig;
use sharecode_core::error::{AppError, ErrorKind};
use sharecode_core::result::AppResult;
use sharecode_core::traits::blob_store::{BlobStore, UsageInfo};

const API_KEY_HEADER: &str = "X-Uploadthing-Api-Key";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct DeleteFilesRequest<'a> {
    file_keys: &'a [String],
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DeleteFilesResponse {
    success: bool,
    #[serde(default)]
    deleted_count: u64,
}

/// Usage counters as the API returns them. JSON numbers may arrive as
/// floats, so they are read as `f64`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageResponse {
    total_bytes: f64,
    app_total_bytes: f64,
    files_uploaded: f64,
    limit_bytes: f64,
}

impl From<UsageResponse> for UsageInfo {
    fn from(r: UsageResponse) -> Self {
        Self {
            total_bytes: r.total_bytes.max(0.0) as u64,
            app_total_bytes: r.app_total_bytes.max(0.0) as u64,
            files_uploaded: r.files_uploaded.max(0.0) as u64,
            limit_bytes: r.limit_bytes.max(0.0) as u64,
        }
    }
}

/// Blob store backed by the UploadThing REST API (`/v6`).
#[derive(Debug, Clone)]
pub struct UploadThingBlobStore {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl UploadThingBlobStore {
    /// Create a new UploadThing provider from configuration.
    pub fn new(config: &BlobStoreConfig) -> AppResult<Self> {
        if config.api_key.is_empty() {
            return Err(AppError::configuration(
                "blob_store.api_key is required for the uploadthing provider",
            ));
        }
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_seconds))
            .build()
            .map_err(|e| {
                AppError::with_source(
                    ErrorKind::Configuration,
                    "Failed to build UploadThing HTTP client",
                    e,
                )
            })?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/v6/{path}", self.base_url)
    }

    async fn post(&self, path: &str, body: &impl Serialize) -> AppResult<reqwest::Response> {
        let response = self
            .client
            .post(self.endpoint(path))
            .header(API_KEY_HEADER, &self.api_key)
            .json(body)
            .send()
            .await
            .map_err(|e| {
                AppError::with_source(
                    ErrorKind::ExternalService,
                    format!("UploadThing {path} request failed"),
                    e,
                )
            })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(AppError::external_service(format!(
            "UploadThing {path} returned {status}: {body}"
        )))
    }
}

#[async_trait]
impl BlobStore for UploadThingBlobStore {
    fn provider_type(&self) -> &str {
        "uploadthing"
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(self.usage().await.is_ok())
    }

    async fn delete_files(&self, keys: &[String]) -> AppResult<u64> {
        if keys.is_empty() {
            return Ok(0);
        }

        let response = self
            .post("deleteFiles", &DeleteFilesRequest { file_keys: keys })
            .await?;
        let body: DeleteFilesResponse = response.json().await.map_err(|e| {
            AppError::with_source(
                ErrorKind::ExternalService,
                "Malformed UploadThing deleteFiles response",
                e,
            )
        })?;

        if !body.success {
            return Err(AppError::external_service(
                "UploadThing deleteFiles reported failure",
            ));
        }

        debug!(
            requested = keys.len(),
            deleted = body.deleted_count,
            "Deleted blobs from UploadThing"
        );
        Ok(body.deleted_count)
    }

    async fn usage(&self) -> AppResult<UsageInfo> {
        let response = self
            .post("getUsageInfo", &serde_json::json!({}))
            .await?;
        let body: UsageResponse = response.json().await.map_err(|e| {
            AppError::with_source(
                ErrorKind::ExternalService,
                "Malformed UploadThing getUsageInfo response",
                e,
            )
        })?;
        Ok(body.into())
    }
}
