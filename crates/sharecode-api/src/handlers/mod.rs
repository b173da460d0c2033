//! Request handlers.

pub mod health;
pub mod share;
pub mod sweep;
pub mod usage;
