//! In-memory store backends built on `dashmap`.
//!
//! Single-process only. Used by the development profile and by tests.

pub mod deletion;
pub mod share;

pub use deletion::MemoryDeletionQueue;
pub use share::MemoryShareStore;
