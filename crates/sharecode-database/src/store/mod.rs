//! Store traits implemented by the PostgreSQL repositories and the
//! in-memory backends.

pub mod deletion;
pub mod share;

pub use deletion::BlobDeletionQueue;
pub use share::ShareStore;
