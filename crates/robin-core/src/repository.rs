//! User store contract.
//!
//! The store is an external key-value collaborator keyed by username.
//! Implementations must be safe to call concurrently; no transaction
//! semantics are required.

use std::time::Duration;

use crate::error::RobinResult;
use crate::models::user::UserRecord;

pub trait UserRecordStore: Send + Sync {
    /// Fetch the record for `username`, `None` if absent.
    fn get(
        &self,
        username: &str,
    ) -> impl Future<Output = RobinResult<Option<UserRecord>>> + Send;

    /// Write `record` under `username`, overwriting any existing value.
    /// A zero `ttl` never expires.
    fn put(
        &self,
        username: &str,
        record: &UserRecord,
        ttl: Duration,
    ) -> impl Future<Output = RobinResult<()>> + Send;

    /// Atomically write `record` only if `username` has no value yet.
    /// Returns whether the write happened. A zero `ttl` never expires.
    fn put_if_absent(
        &self,
        username: &str,
        record: &UserRecord,
        ttl: Duration,
    ) -> impl Future<Output = RobinResult<bool>> + Send;

    /// Overwrite the record under `username` only if one exists, keeping
    /// its remaining time to live. Returns whether the write happened.
    fn replace(
        &self,
        username: &str,
        record: &UserRecord,
    ) -> impl Future<Output = RobinResult<bool>> + Send;

    /// Set only the cached `jwt` field of an existing record, leaving
    /// every other field and the time to live as they are. Returns
    /// whether a record was found.
    fn set_cached_token(
        &self,
        username: &str,
        token: &str,
    ) -> impl Future<Output = RobinResult<bool>> + Send;

    /// Remove the record for `username`. Returns whether one existed.
    fn delete(&self, username: &str) -> impl Future<Output = RobinResult<bool>> + Send;
}
