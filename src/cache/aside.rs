//! Cache-aside read path and best-effort invalidation.
//!
//! The store is the source of truth; the cache only saves latency. Any cache
//! failure here is logged and absorbed, so callers observe exactly the
//! store's results and the store's errors.
//!
//! Concurrent misses on the same key each run their own fetch. There is no
//! per-key de-duplication.

use crate::error::Result;
use crate::store::within_deadline;
use crate::traits::cache::{Cache, CacheExt};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

/// Deadline for a single cache call
pub const DEFAULT_CACHE_TIMEOUT: Duration = Duration::from_secs(10);

/// Read `key` from the cache, falling back to `fetch` and repopulating on success
///
/// 1. A hit returns the cached value without calling `fetch`.
/// 2. A miss, a backend error, or an undecodable entry falls through to `fetch`.
/// 3. A failed `fetch` is returned as-is and the cache is left untouched.
/// 4. A successful `fetch` is written back best-effort.
pub async fn read_through<T, F, Fut>(
    cache: Option<&dyn Cache>,
    key: &str,
    ttl: Duration,
    fetch: F,
) -> Result<T>
where
    T: Serialize + DeserializeOwned + Send + Sync,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    read_through_within(cache, key, ttl, DEFAULT_CACHE_TIMEOUT, fetch).await
}

async fn read_through_within<T, F, Fut>(
    cache: Option<&dyn Cache>,
    key: &str,
    ttl: Duration,
    timeout: Duration,
    fetch: F,
) -> Result<T>
where
    T: Serialize + DeserializeOwned + Send + Sync,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    if let Some(cache) = cache {
        match within_deadline(timeout, cache.get::<T>(key)).await {
            Ok(Some(value)) => {
                tracing::debug!(key = %key, "cache hit");
                return Ok(value);
            }
            Ok(None) => tracing::debug!(key = %key, "cache miss"),
            Err(e) => tracing::warn!(key = %key, error = %e, "cache read failed, falling back to store"),
        }
    }

    let value = fetch().await?;

    if let Some(cache) = cache {
        if let Err(e) = within_deadline(timeout, cache.set(key, &value, Some(ttl))).await {
            tracing::warn!(key = %key, error = %e, "failed to populate cache");
        }
    }

    Ok(value)
}

/// Delete every key, continuing past individual failures
///
/// A no-op when no cache is configured.
pub async fn invalidate<I, K>(cache: Option<&dyn Cache>, keys: I)
where
    I: IntoIterator<Item = K>,
    K: AsRef<str>,
{
    invalidate_within(cache, DEFAULT_CACHE_TIMEOUT, keys).await
}

async fn invalidate_within<I, K>(cache: Option<&dyn Cache>, timeout: Duration, keys: I)
where
    I: IntoIterator<Item = K>,
    K: AsRef<str>,
{
    let Some(cache) = cache else {
        return;
    };

    for key in keys {
        let key = key.as_ref();
        match within_deadline(timeout, cache.delete(key)).await {
            Ok(()) => tracing::debug!(key = %key, "cache entry invalidated"),
            Err(e) => tracing::warn!(key = %key, error = %e, "cache invalidation failed"),
        }
    }
}

/// Shared handle the repositories use for cache-aside access
///
/// Wraps an optional cache, the TTL applied to repopulated entries, and the
/// deadline applied to each cache call.
#[derive(Clone)]
pub struct CacheAside {
    cache: Option<Arc<dyn Cache>>,
    ttl: Duration,
    timeout: Duration,
}

impl CacheAside {
    pub fn new(cache: Option<Arc<dyn Cache>>, ttl: Duration) -> Self {
        Self {
            cache,
            ttl,
            timeout: DEFAULT_CACHE_TIMEOUT,
        }
    }

    /// Handle with no cache: every read goes to the store
    pub fn disabled() -> Self {
        Self::new(None, Duration::from_secs(3600))
    }

    /// Set the deadline applied to each cache call
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn is_enabled(&self) -> bool {
        self.cache.is_some()
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn cache(&self) -> Option<&Arc<dyn Cache>> {
        self.cache.as_ref()
    }

    /// See [`read_through`]
    pub async fn read_through<T, F, Fut>(&self, key: &str, fetch: F) -> Result<T>
    where
        T: Serialize + DeserializeOwned + Send + Sync,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        read_through_within(self.cache.as_deref(), key, self.ttl, self.timeout, fetch).await
    }

    /// See [`invalidate`]
    pub async fn invalidate<I, K>(&self, keys: I)
    where
        I: IntoIterator<Item = K>,
        K: AsRef<str>,
    {
        invalidate_within(self.cache.as_deref(), self.timeout, keys).await
    }

    /// Drop every cached entry; failures are logged
    pub async fn clear(&self) {
        if let Some(cache) = &self.cache {
            if let Err(e) = within_deadline(self.timeout, cache.clear()).await {
                tracing::warn!(error = %e, "cache clear failed");
            }
        }
    }
}

impl std::fmt::Debug for CacheAside {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheAside")
            .field("enabled", &self.is_enabled())
            .field("ttl", &self.ttl)
            .field("timeout", &self.timeout)
            .finish()
    }
}
