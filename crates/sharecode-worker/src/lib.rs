//! Scheduled background work for ShareCode.
//!
//! This crate provides:
//! - A job executor that dispatches a job type to its handler and keeps two
//!   runs of the same job from overlapping
//! - A cron scheduler that triggers the jobs
//! - Job handlers for the expiration sweep and blob reconciliation

pub mod executor;
pub mod jobs;
pub mod scheduler;

pub use executor::{JobExecutionError, JobExecutor, JobHandler};
pub use scheduler::CronScheduler;
