use crate::utils::{get_env_with_prefix, parse_env_with_prefix};
use serde::{Deserialize, Serialize};

/// Cache backend type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheBackend {
    /// In-memory cache (default)
    #[default]
    InMemory,
    /// Redis cache (requires cache-redis feature)
    #[cfg(feature = "cache-redis")]
    Redis,
    /// Caching disabled; every read goes to the store
    NoOp,
}

/// Cache configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CacheConfig {
    /// Cache backend type
    #[serde(default)]
    pub backend: CacheBackend,

    /// Redis connection URL (only used for Redis backend)
    #[serde(default)]
    pub redis_url: Option<String>,

    /// TTL applied to repository entries (in seconds)
    #[serde(default = "default_ttl_seconds")]
    pub default_ttl_seconds: u64,

    /// Maximum number of entries for in-memory cache
    #[serde(default = "default_max_entries")]
    pub max_entries: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            backend: CacheBackend::default(),
            redis_url: None,
            default_ttl_seconds: default_ttl_seconds(),
            max_entries: default_max_entries(),
        }
    }
}

impl CacheConfig {
    /// Load cache configuration from environment variables
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(backend) = get_env_with_prefix("CACHE_BACKEND") {
            config.backend = match backend.to_lowercase().as_str() {
                "redis" => {
                    #[cfg(feature = "cache-redis")]
                    {
                        CacheBackend::Redis
                    }
                    #[cfg(not(feature = "cache-redis"))]
                    {
                        tracing::warn!("Redis cache requested but cache-redis feature not enabled, using in-memory");
                        CacheBackend::InMemory
                    }
                }
                "noop" | "none" | "disabled" => CacheBackend::NoOp,
                _ => CacheBackend::InMemory,
            };
        }

        if let Some(url) = get_env_with_prefix("REDIS_URL") {
            config.redis_url = Some(url);
        }

        if let Some(seconds) = parse_env_with_prefix("CACHE_TTL_SECONDS") {
            config.default_ttl_seconds = seconds;
        }

        if let Some(entries) = parse_env_with_prefix("CACHE_MAX_ENTRIES") {
            config.max_entries = entries;
        }

        config
    }

    /// TTL for repository entries
    pub fn ttl(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.default_ttl_seconds)
    }
}

fn default_ttl_seconds() -> u64 {
    3600 // 1 hour
}

fn default_max_entries() -> u64 {
    10_000
}
