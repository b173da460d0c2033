//! # sharecode-service
//!
//! Business logic for ShareCode: the share registry and its code
//! generator, the expiration sweeper, the orphan blob reconciler, and the
//! usage reporter.
//!
//! Services follow constructor injection. Every collaborator (store, blob
//! store, clock, code source) is handed in as an `Arc` at construction time.

pub mod share;
pub mod sweep;
pub mod usage;

mod task;

#[cfg(test)]
pub(crate) mod testing;

pub use share::{BlobPurger, CodeSource, GetMode, ShareRegistry, TimeRandomCodeSource};
pub use sweep::{BlobReconciler, ExpirationSweeper, ReconcileReport, SweepReport};
pub use usage::{UsageReport, UsageReporter, format_bytes};
