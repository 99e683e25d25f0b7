//! Redis connection pool using deadpool-redis.

use deadpool_redis::{Config, Connection, Pool, PoolError, Runtime};
use randomizer_common::RedisConfig;
use redis::AsyncCommands;

#[derive(Debug, thiserror::Error)]
pub enum RedisPoolError {
    #[error("Invalid Redis pool settings: {0}")]
    Build(String),

    #[error("No Redis connection available: {0}")]
    Checkout(#[from] PoolError),

    #[error("Redis command failed: {0}")]
    Command(#[from] redis::RedisError),
}

pub type RedisResult<T> = Result<T, RedisPoolError>;

/// Pooled connections to the Redis instance holding the settings blob
#[derive(Clone)]
pub struct RedisPool {
    pool: Pool,
}

impl std::fmt::Debug for RedisPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let status = self.pool.status();
        f.debug_struct("RedisPool")
            .field("size", &status.size)
            .field("available", &status.available)
            .finish()
    }
}

impl RedisPool {
    pub fn from_config(config: &RedisConfig) -> RedisResult<Self> {
        let pool = Config::from_url(&config.url)
            .builder()
            .map_err(|e| RedisPoolError::Build(e.to_string()))?
            .max_size(config.max_connections as usize)
            .runtime(Runtime::Tokio1)
            .build()
            .map_err(|e| RedisPoolError::Build(e.to_string()))?;

        tracing::info!(
            host = %redacted_host(&config.url),
            max_connections = config.max_connections,
            "Redis pool created"
        );
        Ok(Self { pool })
    }

    async fn connection(&self) -> RedisResult<Connection> {
        Ok(self.pool.get().await?)
    }

    /// Round trip used by readiness checks
    pub async fn ping(&self) -> RedisResult<()> {
        let mut conn = self.connection().await?;
        redis::cmd("PING").query_async::<String>(&mut conn).await?;
        Ok(())
    }

    pub async fn read(&self, key: &str) -> RedisResult<Option<String>> {
        let mut conn = self.connection().await?;
        Ok(conn.get(key).await?)
    }

    /// Replace the value without expiry
    pub async fn write(&self, key: &str, value: &str) -> RedisResult<()> {
        let mut conn = self.connection().await?;
        conn.set::<_, _, ()>(key, value).await?;
        Ok(())
    }
}

/// Host part of a Redis URL, credentials dropped
fn redacted_host(url: &str) -> &str {
    url.rsplit('@').next().unwrap_or(url)
}
