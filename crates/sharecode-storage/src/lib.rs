//! # sharecode-storage
//!
//! Blob store adapters for ShareCode. Files are uploaded by clients straight
//! to the blob store; this crate only deletes keys and reads usage counters.
//! Supports the UploadThing HTTP API, a local directory, and an in-memory
//! store for development and tests.

pub mod manager;
pub mod providers;
pub mod retry;

pub use manager::BlobStoreManager;
pub use retry::RetryPolicy;
