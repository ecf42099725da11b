//! In-memory cache backed by moka
//!
//! Bounded, concurrent, and honours a per-entry TTL so repository entries
//! expire passively after the configured hour.

use crate::error::Result;
use crate::traits::cache::Cache;
use async_trait::async_trait;
use moka::Expiry;
use moka::future::Cache as MokaCache;
use std::time::{Duration, Instant};

/// TTL used when `set_bytes` is called without one
const DEFAULT_TTL: Duration = Duration::from_secs(3600);

#[derive(Clone)]
struct Entry {
    value: Vec<u8>,
    ttl: Option<Duration>,
}

struct EntryExpiry {
    default_ttl: Duration,
}

impl Expiry<String, Entry> for EntryExpiry {
    fn expire_after_create(&self, _key: &String, entry: &Entry, _created_at: Instant) -> Option<Duration> {
        Some(entry.ttl.unwrap_or(self.default_ttl))
    }

    // Reads never extend an entry's lifetime.
    fn expire_after_read(
        &self,
        _key: &String,
        _entry: &Entry,
        _read_at: Instant,
        remaining: Option<Duration>,
        _last_modified_at: Instant,
    ) -> Option<Duration> {
        remaining
    }

    // Overwrites restart the clock.
    fn expire_after_update(
        &self,
        _key: &String,
        entry: &Entry,
        _updated_at: Instant,
        _remaining: Option<Duration>,
    ) -> Option<Duration> {
        Some(entry.ttl.unwrap_or(self.default_ttl))
    }
}

/// In-memory cache implementation backed by moka
///
/// # Example
///
/// ```rust,ignore
/// use resale_billing::cache::InMemoryCache;
/// use resale_billing::traits::cache::CacheExt;
///
/// let cache = InMemoryCache::new(10_000);
/// cache.set("client:42", &client, Some(Duration::from_secs(3600))).await?;
/// let cached: Option<Client> = cache.get("client:42").await?;
/// ```
#[derive(Clone)]
pub struct InMemoryCache {
    inner: MokaCache<String, Entry>,
}

impl InMemoryCache {
    /// Create a cache holding at most `max_entries` entries
    pub fn new(max_entries: u64) -> Self {
        Self::with_ttl(max_entries, DEFAULT_TTL)
    }

    /// Create a cache with a custom default TTL
    pub fn with_ttl(max_entries: u64, default_ttl: Duration) -> Self {
        let inner = MokaCache::builder()
            .max_capacity(max_entries)
            .expire_after(EntryExpiry { default_ttl })
            .build();

        Self { inner }
    }

    /// Run pending maintenance tasks (eviction, expiration)
    pub async fn run_pending_tasks(&self) {
        self.inner.run_pending_tasks().await;
    }

    /// Get the current number of entries in the cache
    pub fn entry_count(&self) -> u64 {
        self.inner.entry_count()
    }

    /// Whether a key is currently cached
    pub fn contains_key(&self, key: &str) -> bool {
        self.inner.contains_key(key)
    }
}

#[async_trait]
impl Cache for InMemoryCache {
    async fn get_bytes(&self, key: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.inner.get(key).await.map(|entry| entry.value))
    }

    async fn set_bytes(&self, key: &str, value: Vec<u8>, ttl: Option<Duration>) -> Result<()> {
        self.inner.insert(key.to_string(), Entry { value, ttl }).await;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.inner.remove(key).await;
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        self.inner.invalidate_all();
        self.inner.run_pending_tasks().await;
        Ok(())
    }

    fn is_healthy(&self) -> bool {
        true
    }
}

impl Default for InMemoryCache {
    fn default() -> Self {
        Self::new(10_000)
    }
}
