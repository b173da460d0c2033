//! PostgreSQL implementations of the store traits.

pub mod pending_deletion;
pub mod share;

pub use pending_deletion::PendingDeletionRepository;
pub use share::ShareRepository;
