//! Database-specific error types and conversions.

use robin_core::error::RobinError;

/// Database-layer error type.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Record encoding error: {0}")]
    Encoding(#[from] serde_json::Error),
}

impl From<DbError> for RobinError {
    fn from(err: DbError) -> Self {
        RobinError::Database(err.to_string())
    }
}
