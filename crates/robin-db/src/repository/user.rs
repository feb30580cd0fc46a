//! Redis implementation of [`UserRecordStore`].
//!
//! Each user is one string key holding the record as JSON
//! (`{"user":..,"passwd":..,"perms":..,"jwt":..}`).

use std::time::Duration;

use redis::AsyncCommands;
use redis::aio::ConnectionManager;
use robin_core::error::RobinResult;
use robin_core::models::user::UserRecord;
use robin_core::repository::UserRecordStore;

use crate::connection::{DbConfig, DbManager};
use crate::error::DbError;

/// Rewrites the `jwt` field of the JSON record at `KEYS[1]` in place,
/// keeping its TTL. Replies 1 when the key existed, 0 otherwise.
const SET_CACHED_TOKEN_SCRIPT: &str = r#"
local raw = redis.call('GET', KEYS[1])
if not raw then
  return 0
end
local record = cjson.decode(raw)
record['jwt'] = ARGV[1]
redis.call('SET', KEYS[1], cjson.encode(record), 'KEEPTTL')
return 1
"#;

#[derive(Clone)]
pub struct RedisUserStore {
    conn: ConnectionManager,
    key_prefix: String,
}

impl RedisUserStore {
    pub fn new(manager: &DbManager, config: &DbConfig) -> Self {
        Self {
            conn: manager.connection(),
            key_prefix: config.key_prefix.clone(),
        }
    }

    fn key(&self, username: &str) -> String {
        format!("{}{}", self.key_prefix, username)
    }
}

impl UserRecordStore for RedisUserStore {
    async fn get(&self, username: &str) -> RobinResult<Option<UserRecord>> {
        let mut conn = self.conn.clone();
        let raw: Option<String> = conn.get(self.key(username)).await.map_err(DbError::from)?;

        match raw {
            Some(json) => Ok(Some(serde_json::from_str(&json).map_err(DbError::from)?)),
            None => Ok(None),
        }
    }

    async fn put(&self, username: &str, record: &UserRecord, ttl: Duration) -> RobinResult<()> {
        let json = serde_json::to_string(record).map_err(DbError::from)?;
        let mut conn = self.conn.clone();
        let key = self.key(username);

        let result: redis::RedisResult<()> = if ttl.is_zero() {
            conn.set(key, json).await
        } else {
            conn.set_ex(key, json, ttl_secs(ttl)).await
        };
        result.map_err(DbError::from)?;
        Ok(())
    }

    async fn put_if_absent(
        &self,
        username: &str,
        record: &UserRecord,
        ttl: Duration,
    ) -> RobinResult<bool> {
        let json = serde_json::to_string(record).map_err(DbError::from)?;
        let mut conn = self.conn.clone();

        let mut cmd = redis::cmd("SET");
        cmd.arg(self.key(username)).arg(json).arg("NX");
        if !ttl.is_zero() {
            cmd.arg("EX").arg(ttl_secs(ttl));
        }

        // `SET .. NX` replies OK when written and nil when the key exists.
        let reply: Option<String> = cmd.query_async(&mut conn).await.map_err(DbError::from)?;
        Ok(reply.is_some())
    }

    async fn replace(&self, username: &str, record: &UserRecord) -> RobinResult<bool> {
        let json = serde_json::to_string(record).map_err(DbError::from)?;
        let mut conn = self.conn.clone();

        let reply: Option<String> = redis::cmd("SET")
            .arg(self.key(username))
            .arg(json)
            .arg("XX")
            .arg("KEEPTTL")
            .query_async(&mut conn)
            .await
            .map_err(DbError::from)?;
        Ok(reply.is_some())
    }

    async fn set_cached_token(&self, username: &str, token: &str) -> RobinResult<bool> {
        let mut conn = self.conn.clone();

        let found: i64 = redis::cmd("EVAL")
            .arg(SET_CACHED_TOKEN_SCRIPT)
            .arg(1)
            .arg(self.key(username))
            .arg(token)
            .query_async(&mut conn)
            .await
            .map_err(DbError::from)?;
        Ok(found == 1)
    }

    async fn delete(&self, username: &str) -> RobinResult<bool> {
        let mut conn = self.conn.clone();
        let removed: i64 = conn.del(self.key(username)).await.map_err(DbError::from)?;
        Ok(removed > 0)
    }
}

/// Redis expiries are whole seconds; round sub-second TTLs up so they
/// never become "no expiry".
fn ttl_secs(ttl: Duration) -> u64 {
    let secs = ttl.as_secs();
    if ttl.subsec_nanos() > 0 {
        secs.saturating_add(1)
    } else {
        secs
    }
}
