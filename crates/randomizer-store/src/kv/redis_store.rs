//! Redis-backed key-value store.

use async_trait::async_trait;
use randomizer_core::{DomainError, KeyValueStore, RepoResult};
use serde_json::Value;

use crate::pool::{RedisPool, RedisPoolError};

/// Namespace of every key this service writes
const KEY_PREFIX: &str = "randomizer:";

impl From<RedisPoolError> for DomainError {
    fn from(err: RedisPoolError) -> Self {
        DomainError::Store(err.to_string())
    }
}

/// Stores each blob as a JSON string under a prefixed key
#[derive(Debug, Clone)]
pub struct RedisKeyValueStore {
    pool: RedisPool,
}

impl RedisKeyValueStore {
    #[must_use]
    pub fn new(pool: RedisPool) -> Self {
        Self { pool }
    }

    fn key(key: &str) -> String {
        format!("{KEY_PREFIX}{key}")
    }
}

#[async_trait]
impl KeyValueStore for RedisKeyValueStore {
    async fn get_value(&self, key: &str) -> RepoResult<Option<Value>> {
        let Some(raw) = self.pool.read(&Self::key(key)).await? else {
            return Ok(None);
        };
        serde_json::from_str(&raw)
            .map(Some)
            .map_err(|e| DomainError::Store(format!("stored value under {key} is not JSON: {e}")))
    }

    async fn set_value(&self, key: &str, value: &Value) -> RepoResult<()> {
        self.pool.write(&Self::key(key), &value.to_string()).await?;
        tracing::debug!(key = %key, "Stored blob in Redis");
        Ok(())
    }
}
