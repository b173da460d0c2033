//! # sharecode-core
//!
//! Core crate for ShareCode. Contains the configuration schema, the
//! collaborator traits (blob store, clock), and the unified error system.
//!
//! This crate has **no** internal dependencies on other ShareCode crates.

pub mod config;
pub mod error;
pub mod result;
pub mod traits;

pub use error::AppError;
pub use result::AppResult;
