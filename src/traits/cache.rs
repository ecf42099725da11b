//! Cache trait for key-value storage
//!
//! This trait abstracts caching backends, allowing the repositories to run
//! against moka, Redis, or nothing at all without changing their read paths.

use crate::error::{BillingError, Result};
use async_trait::async_trait;
use std::time::Duration;

/// Cache trait for key-value storage with optional TTL
///
/// A missing or expired key is reported as `Ok(None)`, never as an error, so
/// callers can tell a genuine miss apart from a transport failure.
///
/// Note: This trait uses type-erased serialization to be object-safe.
/// Use the helper methods on [`CacheExt`] which handle serialization internally.
#[async_trait]
pub trait Cache: Send + Sync {
    /// Get a value from the cache as JSON bytes
    ///
    /// Returns `Ok(None)` if the key doesn't exist or has expired.
    async fn get_bytes(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Set a value in the cache with optional TTL
    ///
    /// If `ttl` is `None` the backend's default TTL applies.
    async fn set_bytes(&self, key: &str, value: Vec<u8>, ttl: Option<Duration>) -> Result<()>;

    /// Delete a value from the cache
    ///
    /// Deleting a key that does not exist is not an error.
    async fn delete(&self, key: &str) -> Result<()>;

    /// Clear all values from the cache
    async fn clear(&self) -> Result<()>;

    /// Check if the cache backend is healthy
    fn is_healthy(&self) -> bool;
}

/// Helper trait for type-safe cache operations
///
/// Values are stored as JSON. A value that is present but cannot be decoded
/// into `T` surfaces as [`BillingError::Cache`], distinct from a miss.
#[async_trait]
pub trait CacheExt: Cache {
    /// Get a value from the cache
    async fn get<T>(&self, key: &str) -> Result<Option<T>>
    where
        T: serde::de::DeserializeOwned + Send,
    {
        match self.get_bytes(key).await? {
            Some(bytes) => serde_json::from_slice(&bytes)
                .map(Some)
                .map_err(|e| BillingError::cache(format!("Failed to deserialize '{}': {}", key, e))),
            None => Ok(None),
        }
    }

    /// Set a value in the cache
    async fn set<T>(&self, key: &str, value: &T, ttl: Option<Duration>) -> Result<()>
    where
        T: serde::Serialize + Send + Sync,
    {
        let bytes = serde_json::to_vec(value)
            .map_err(|e| BillingError::cache(format!("Failed to serialize '{}': {}", key, e)))?;
        self.set_bytes(key, bytes, ttl).await
    }
}

// Blanket implementation - all Cache implementations (including trait objects) get CacheExt
impl<C: Cache + ?Sized> CacheExt for C {}
