//! # sharecode-entity
//!
//! Domain entity models for ShareCode. Every struct in this crate represents
//! a database row or a domain value object. Rows that map one-to-one onto a
//! table additionally derive `sqlx::FromRow`.

pub mod blob;
pub mod share;
