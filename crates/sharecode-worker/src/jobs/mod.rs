//! Built-in job handlers.

pub mod reconcile;
pub mod sweep;

pub use reconcile::ReconcileJobHandler;
pub use sweep::SweepJobHandler;

/// Job type of the expiration sweep.
pub const EXPIRATION_SWEEP: &str = "expiration_sweep";
/// Job type of the blob reconciliation pass.
pub const BLOB_RECONCILE: &str = "blob_reconcile";
