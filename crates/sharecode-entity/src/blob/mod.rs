//! Blob bookkeeping entities.

pub mod pending;

pub use pending::{DeletionReason, NewPendingDeletion, PendingBlobDeletion};
