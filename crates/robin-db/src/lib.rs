//! Robin Database — user store implementations.
//!
//! This crate provides:
//! - Redis connection management ([`DbManager`], [`DbConfig`])
//! - [`UserRecordStore`](robin_core::repository::UserRecordStore)
//!   implementations: [`RedisUserStore`](repository::RedisUserStore)
//!   for deployments and [`MemoryUserStore`](repository::MemoryUserStore)
//!   for tests and single-process use
//! - Error types ([`DbError`])

mod connection;
mod error;
pub mod repository;

pub use connection::{DbConfig, DbManager};
pub use error::DbError;
