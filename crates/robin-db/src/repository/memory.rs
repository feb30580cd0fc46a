//! In-process implementation of [`UserRecordStore`].
//!
//! Records are kept as the same JSON the Redis store writes, so wire
//! encoding problems show up in tests too.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use robin_core::error::RobinResult;
use robin_core::models::user::UserRecord;
use robin_core::repository::UserRecordStore;
use tokio::sync::RwLock;
use tokio::time::Instant;

use crate::error::DbError;

#[derive(Debug)]
struct Entry {
    json: String,
    expires_at: Option<Instant>,
}

impl Entry {
    /// A TTL too large to represent as a deadline never expires.
    fn new(record: &UserRecord, ttl: Duration) -> Result<Self, DbError> {
        let expires_at = if ttl.is_zero() {
            None
        } else {
            Instant::now().checked_add(ttl)
        };
        Ok(Self {
            json: serde_json::to_string(record)?,
            expires_at,
        })
    }

    fn is_live(&self, now: Instant) -> bool {
        self.expires_at.is_none_or(|at| at > now)
    }
}

/// Cloning shares the underlying map.
#[derive(Debug, Clone, Default)]
pub struct MemoryUserStore {
    entries: Arc<RwLock<HashMap<String, Entry>>>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live records.
    pub async fn len(&self) -> usize {
        let now = Instant::now();
        self.entries
            .read()
            .await
            .values()
            .filter(|e| e.is_live(now))
            .count()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

impl UserRecordStore for MemoryUserStore {
    async fn get(&self, username: &str) -> RobinResult<Option<UserRecord>> {
        let entries = self.entries.read().await;
        match entries.get(username) {
            Some(entry) if entry.is_live(Instant::now()) => {
                Ok(Some(serde_json::from_str(&entry.json).map_err(DbError::from)?))
            }
            _ => Ok(None),
        }
    }

    async fn put(&self, username: &str, record: &UserRecord, ttl: Duration) -> RobinResult<()> {
        let entry = Entry::new(record, ttl)?;
        self.entries.write().await.insert(username.to_string(), entry);
        Ok(())
    }

    async fn put_if_absent(
        &self,
        username: &str,
        record: &UserRecord,
        ttl: Duration,
    ) -> RobinResult<bool> {
        let entry = Entry::new(record, ttl)?;
        let mut entries = self.entries.write().await;
        if entries
            .get(username)
            .is_some_and(|existing| existing.is_live(Instant::now()))
        {
            return Ok(false);
        }
        entries.insert(username.to_string(), entry);
        Ok(true)
    }

    async fn replace(&self, username: &str, record: &UserRecord) -> RobinResult<bool> {
        let json = serde_json::to_string(record).map_err(DbError::from)?;
        let mut entries = self.entries.write().await;
        match entries.get_mut(username) {
            Some(entry) if entry.is_live(Instant::now()) => {
                entry.json = json;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn set_cached_token(&self, username: &str, token: &str) -> RobinResult<bool> {
        let mut entries = self.entries.write().await;
        let Some(entry) = entries
            .get_mut(username)
            .filter(|entry| entry.is_live(Instant::now()))
        else {
            return Ok(false);
        };

        let mut record: UserRecord = serde_json::from_str(&entry.json).map_err(DbError::from)?;
        record.last_issued_token = Some(token.to_string());
        entry.json = serde_json::to_string(&record).map_err(DbError::from)?;
        Ok(true)
    }

    async fn delete(&self, username: &str) -> RobinResult<bool> {
        let removed = self.entries.write().await.remove(username);
        Ok(removed.is_some_and(|entry| entry.is_live(Instant::now())))
    }
}
