//! Blob store manager: selects the configured provider and wraps every call
//! in the retry policy.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use sharecode_core::config::{BlobProvider, BlobStoreConfig};
use sharecode_core::result::AppResult;
use sharecode_core::traits::blob_store::{BlobStore, UsageInfo};

use crate::providers::{LocalBlobStore, MemoryBlobStore, UploadThingBlobStore};
use crate::retry::RetryPolicy;

/// Blob store front used by the services.
///
/// Deletes are split into batches of at most `batch_size` keys; each batch is
/// retried on its own.
#[derive(Debug, Clone)]
pub struct BlobStoreManager {
    inner: Arc<dyn BlobStore>,
    retry: RetryPolicy,
    batch_size: usize,
}

impl BlobStoreManager {
    /// Build the provider named in configuration.
    pub async fn new(config: &BlobStoreConfig) -> AppResult<Self> {
        let inner: Arc<dyn BlobStore> = match config.provider {
            BlobProvider::UploadThing => {
                info!(base_url = %config.base_url, "Initializing UploadThing blob store");
                Arc::new(UploadThingBlobStore::new(config)?)
            }
            BlobProvider::Local => {
                info!(root = %config.local_root, "Initializing local blob store");
                Arc::new(LocalBlobStore::new(&config.local_root).await?)
            }
            BlobProvider::Memory => {
                info!("Initializing in-memory blob store");
                Arc::new(MemoryBlobStore::default())
            }
        };

        Ok(Self {
            inner,
            retry: RetryPolicy::from_config(config),
            batch_size: config.delete_batch_size.max(1),
        })
    }

    /// Wrap an existing provider (for testing).
    pub fn from_provider(provider: Arc<dyn BlobStore>, retry: RetryPolicy) -> Self {
        Self {
            inner: provider,
            retry,
            batch_size: BlobStoreConfig::default().delete_batch_size,
        }
    }

    /// The retry policy applied to calls.
    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry
    }
}

#[async_trait]
impl BlobStore for BlobStoreManager {
    fn provider_type(&self) -> &str {
        self.inner.provider_type()
    }

    async fn health_check(&self) -> AppResult<bool> {
        self.inner.health_check().await
    }

    async fn delete_files(&self, keys: &[String]) -> AppResult<u64> {
        let mut deleted = 0;
        for batch in keys.chunks(self.batch_size) {
            deleted += self
                .retry
                .run("deleteFiles", || self.inner.delete_files(batch))
                .await?;
        }
        Ok(deleted)
    }

    async fn usage(&self) -> AppResult<UsageInfo> {
        self.retry.run("getUsageInfo", || self.inner.usage()).await
    }
}
