use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::cache::CacheConfig;
use crate::error::{BillingError, Result};
use crate::jobs::SchedulerConfig;
use crate::notifications::NotifierConfig;
use crate::utils::{get_env_with_prefix, parse_env_with_prefix};

/// Main configuration for the billing service
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub scheduler: SchedulerConfig,
    #[serde(default)]
    pub notifications: NotifierConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_json")]
    pub json: bool,
}

/// Document store settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StoreConfig {
    /// Deadline for each store call (in seconds)
    #[serde(default = "default_store_timeout_seconds")]
    pub timeout_seconds: u64,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: default_json(),
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: default_store_timeout_seconds(),
        }
    }
}

impl StoreConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_json() -> bool {
    false
}

fn default_store_timeout_seconds() -> u64 {
    10
}

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Builder for Config with environment variable support
#[must_use = "builder does nothing until you call build()"]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.config.logging.level = level.into();
        self
    }

    pub fn with_json_logging(mut self, enabled: bool) -> Self {
        self.config.logging.json = enabled;
        self
    }

    pub fn with_cache(mut self, cache: CacheConfig) -> Self {
        self.config.cache = cache;
        self
    }

    pub fn with_store_timeout(mut self, timeout: Duration) -> Self {
        self.config.store.timeout_seconds = timeout.as_secs();
        self
    }

    pub fn with_scheduler(mut self, scheduler: SchedulerConfig) -> Self {
        self.config.scheduler = scheduler;
        self
    }

    pub fn with_notifications(mut self, notifications: NotifierConfig) -> Self {
        self.config.notifications = notifications;
        self
    }

    /// Load configuration from environment variables with BILLING_ prefix
    ///
    /// Each section reads its own variables; see `CacheConfig::from_env`,
    /// `SchedulerConfig::from_env` and `NotifierConfig::from_env`.
    pub fn from_env(mut self) -> Self {
        if let Some(level) = get_env_with_prefix("LOG_LEVEL") {
            self.config.logging.level = level;
        }
        if let Some(json) = get_env_with_prefix("LOG_JSON") {
            self.config.logging.json = json.parse().unwrap_or(false);
        }
        if let Some(seconds) = parse_env_with_prefix("STORE_TIMEOUT_SECONDS") {
            self.config.store.timeout_seconds = seconds;
        }

        self.config.cache = CacheConfig::from_env();
        self.config.scheduler = SchedulerConfig::from_env();
        self.config.notifications = NotifierConfig::from_env();
        self
    }

    /// Validate and return the configuration
    pub fn build(self) -> Result<Config> {
        let config = self.config;

        let level = config.logging.level.to_lowercase();
        if !LOG_LEVELS.contains(&level.as_str()) {
            return Err(BillingError::config(format!(
                "unknown log level '{}', expected one of {}",
                config.logging.level,
                LOG_LEVELS.join(", ")
            )));
        }
        if config.store.timeout_seconds == 0 {
            return Err(BillingError::config("store timeout must be at least one second"));
        }
        if config.cache.default_ttl_seconds == 0 {
            return Err(BillingError::config("cache TTL must be at least one second"));
        }

        config.scheduler.validate()?;
        config.notifications.validate()?;

        Ok(config)
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_build() {
        let config = ConfigBuilder::new().build().unwrap();
        assert_eq!(config.logging.level, "info");
        assert!(!config.logging.json);
        assert_eq!(config.store.timeout(), Duration::from_secs(10));
        assert_eq!(config.scheduler.reminder_hour, 17);
    }

    #[test]
    fn test_builder_overrides() {
        let config = ConfigBuilder::new()
            .with_log_level("debug")
            .with_json_logging(true)
            .with_store_timeout(Duration::from_secs(3))
            .build()
            .unwrap();

        assert_eq!(config.logging.level, "debug");
        assert!(config.logging.json);
        assert_eq!(config.store.timeout_seconds, 3);
    }

    #[test]
    fn test_build_rejects_invalid_values() {
        let err = ConfigBuilder::new().with_log_level("loud").build().unwrap_err();
        assert_eq!(err.code(), "config_error");

        assert!(ConfigBuilder::new()
            .with_store_timeout(Duration::from_millis(10))
            .build()
            .is_err());

        let scheduler = SchedulerConfig {
            billing_cycle_days: vec![0],
            ..Default::default()
        };
        assert!(ConfigBuilder::new().with_scheduler(scheduler).build().is_err());
    }

    #[test]
    fn test_deserialize_partial_document() {
        let config: Config = serde_json::from_str(r#"{"logging": {"level": "warn"}}"#).unwrap();
        assert_eq!(config.logging.level, "warn");
        assert_eq!(config.store.timeout_seconds, 10);
        assert_eq!(config.scheduler.billing_cycle_days, vec![13, 25]);
    }
}
