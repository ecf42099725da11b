//! Caching abstractions with multiple backend implementations.
//!
//! Provides in-memory caching by default, with optional Redis support
//! via the `cache-redis` feature. Repositories never talk to a backend
//! directly; they go through [`CacheAside`], which absorbs every cache
//! failure.

mod aside;
mod config;
mod in_memory;
mod key;
mod noop;

#[cfg(feature = "cache-redis")]
mod redis;

pub use aside::{CacheAside, DEFAULT_CACHE_TIMEOUT, invalidate, read_through};
pub use config::{CacheBackend, CacheConfig};
pub use in_memory::InMemoryCache;
pub use key::generate_key;
pub use noop::NoOpCache;

#[cfg(feature = "cache-redis")]
pub use redis::RedisCache;

use crate::error::Result;
use crate::traits::cache::Cache;
use std::sync::Arc;

/// Build the configured cache backend
///
/// Returns `Ok(None)` when Redis is selected but unreachable: the service
/// keeps running without a cache rather than failing to start.
pub async fn cache_from_config(config: &CacheConfig) -> Result<Option<Arc<dyn Cache>>> {
    match config.backend {
        CacheBackend::InMemory => {
            tracing::info!(max_entries = config.max_entries, ttl_secs = config.default_ttl_seconds, "using in-memory cache");
            Ok(Some(Arc::new(InMemoryCache::with_ttl(config.max_entries, config.ttl()))))
        }
        CacheBackend::NoOp => {
            tracing::info!("caching disabled");
            Ok(Some(Arc::new(NoOpCache)))
        }
        #[cfg(feature = "cache-redis")]
        CacheBackend::Redis => {
            let Some(url) = config.redis_url.as_deref() else {
                return Err(crate::error::BillingError::config("REDIS_URL is required for the redis cache backend"));
            };
            match RedisCache::connect(url, config.ttl()).await {
                Ok(cache) => {
                    tracing::info!("connected to redis cache");
                    Ok(Some(Arc::new(cache)))
                }
                Err(e) => {
                    tracing::warn!(error = %e, "failed to connect to redis, continuing without cache");
                    Ok(None)
                }
            }
        }
    }
}
