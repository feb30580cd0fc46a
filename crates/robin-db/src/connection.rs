//! Redis connection management.

use redis::aio::ConnectionManager;
use serde::Deserialize;
use tracing::info;

use crate::error::DbError;

/// Configuration for connecting to the Redis user store.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DbConfig {
    /// Connection URL (e.g., `redis://127.0.0.1:6379/0`).
    pub url: String,
    /// Prefix prepended to every username key.
    pub key_prefix: String,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            url: "redis://127.0.0.1:6379".into(),
            key_prefix: String::new(),
        }
    }
}

/// Manages a reconnecting connection to Redis.
#[derive(Clone)]
pub struct DbManager {
    conn: ConnectionManager,
}

impl DbManager {
    /// Open a client for `config.url` and establish the managed
    /// connection.
    pub async fn connect(config: &DbConfig) -> Result<Self, DbError> {
        info!(url = %redacted(&config.url), "Connecting to Redis");

        let client = redis::Client::open(config.url.as_str())?;
        let conn = client.get_connection_manager().await?;

        info!("Successfully connected to Redis");

        Ok(Self { conn })
    }

    /// Returns a handle to the managed connection. Handles are cheap
    /// clones of one multiplexed connection.
    pub fn connection(&self) -> ConnectionManager {
        self.conn.clone()
    }
}

/// Strip credentials from a connection URL for logging.
fn redacted(url: &str) -> String {
    match (url.split_once("://"), url.rsplit_once('@')) {
        (Some((scheme, _)), Some((_, host))) => format!("{scheme}://***@{host}"),
        _ => url.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn redacts_credentials() {
        assert_eq!(
            redacted("redis://user:pw@cache:6379/0"),
            "redis://***@cache:6379/0"
        );
        assert_eq!(redacted("redis://cache:6379"), "redis://cache:6379");
    }
}
