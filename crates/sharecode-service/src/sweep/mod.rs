//! Background cleanup: removing expired shares and retrying blob deletes.

pub mod expiration;
pub mod reconcile;

pub use expiration::{ExpirationSweeper, SweepReport};
pub use reconcile::{BlobReconciler, ReconcileReport};
