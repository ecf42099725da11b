use crate::error::{BillingError, Result};
use crate::traits::cache::Cache;
use async_trait::async_trait;
use redis::RedisResult;
use redis::aio::MultiplexedConnection;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

/// Redis cache implementation
///
/// Holds one multiplexed connection that is cloned per call; the connection
/// is safe to share across concurrent requests. Health follows the outcome
/// of the most recent command.
#[derive(Clone)]
pub struct RedisCache {
    conn: MultiplexedConnection,
    default_ttl: Duration,
    healthy: Arc<AtomicBool>,
}

impl RedisCache {
    /// Connect to Redis and verify the connection with a PING
    pub async fn connect(url: &str, default_ttl: Duration) -> Result<Self> {
        let client = redis::Client::open(url)
            .map_err(|e| BillingError::cache(format!("Failed to create Redis client: {}", e)))?;

        let mut conn = client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| BillingError::cache(format!("Failed to connect to Redis: {}", e)))?;

        redis::cmd("PING")
            .query_async::<String>(&mut conn)
            .await
            .map_err(|e| BillingError::cache(format!("Redis PING failed: {}", e)))?;

        Ok(Self {
            conn,
            default_ttl,
            healthy: Arc::new(AtomicBool::new(true)),
        })
    }
}

/// Record a command's outcome on the health flag and map its error
fn tracked<T>(healthy: &AtomicBool, command: &str, result: RedisResult<T>) -> Result<T> {
    healthy.store(result.is_ok(), Ordering::Relaxed);
    result.map_err(|e| BillingError::cache(format!("Redis {} failed: {}", command, e)))
}

#[async_trait]
impl Cache for RedisCache {
    async fn get_bytes(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let mut conn = self.conn.clone();

        let result = redis::cmd("GET")
            .arg(key)
            .query_async::<Option<Vec<u8>>>(&mut conn)
            .await;
        tracked(&self.healthy, "GET", result)
    }

    async fn set_bytes(&self, key: &str, value: Vec<u8>, ttl: Option<Duration>) -> Result<()> {
        let mut conn = self.conn.clone();
        // SETEX rejects a zero TTL
        let ttl_secs = ttl.unwrap_or(self.default_ttl).as_secs().max(1);

        let result = redis::cmd("SETEX")
            .arg(key)
            .arg(ttl_secs)
            .arg(value)
            .query_async::<()>(&mut conn)
            .await;
        tracked(&self.healthy, "SETEX", result)
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let mut conn = self.conn.clone();

        let result = redis::cmd("DEL").arg(key).query_async::<()>(&mut conn).await;
        tracked(&self.healthy, "DEL", result)
    }

    async fn clear(&self) -> Result<()> {
        let mut conn = self.conn.clone();

        let result = redis::cmd("FLUSHDB").query_async::<()>(&mut conn).await;
        tracked(&self.healthy, "FLUSHDB", result)
    }

    fn is_healthy(&self) -> bool {
        self.healthy.load(Ordering::Relaxed)
    }
}
