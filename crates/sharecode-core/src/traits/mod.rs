//! Collaborator traits defined in `sharecode-core` and implemented by other crates.

pub mod blob_store;
pub mod clock;

pub use blob_store::{BlobStore, UsageInfo};
pub use clock::{Clock, ManualClock, SystemClock};
