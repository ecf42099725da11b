use std::sync::Arc;
use std::time::Duration;

use chrono::FixedOffset;

use crate::billing::{BillingCycleUpdater, PaymentProcessor, ReminderDispatcher};
use crate::cache::{cache_from_config, CacheAside, DEFAULT_CACHE_TIMEOUT};
use crate::config::Config;
use crate::error::{BillingError, Result};
use crate::notifications::{notifier_from_config, ConsoleNotifier, DEFAULT_REMINDER_MESSAGE};
use crate::repository::{ClientRepository, PaymentRepository, PriceConfigurationRepository};
use crate::store::{DeadlineStore, DEFAULT_STORE_TIMEOUT};
use crate::traits::cache::Cache;
use crate::traits::clock::{local_day, offset_from_hours, Clock, SystemClock};
use crate::traits::notifier::Notifier;
use crate::traits::store::DocumentStore;

const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(3600);

/// Shared state handed to scheduled jobs and callers
///
/// Holds the repositories, the billing services built on top of them, the
/// notifier and the clock. Cloning is cheap; every clone shares the same
/// store and cache.
#[derive(Clone)]
pub struct BillingContext {
    clients: ClientRepository,
    payments: PaymentRepository,
    prices: PriceConfigurationRepository,
    processor: PaymentProcessor,
    reminders: ReminderDispatcher,
    billing_cycle: BillingCycleUpdater,
    notifier: Arc<dyn Notifier>,
    clock: Arc<dyn Clock>,
    cache: CacheAside,
    utc_offset: FixedOffset,
}

impl BillingContext {
    /// Builder pattern for constructing BillingContext
    pub fn builder() -> BillingContextBuilder {
        BillingContextBuilder::new()
    }

    /// Wire a context from configuration and a store
    ///
    /// The cache and notifier are created from their config sections. An
    /// unreachable Redis leaves caching disabled rather than failing startup.
    pub async fn from_config(config: &Config, store: Arc<dyn DocumentStore>) -> Result<Self> {
        let cache = cache_from_config(&config.cache).await?;
        let notifier = notifier_from_config(&config.notifications)?;

        let mut builder = Self::builder()
            .with_store(store)
            .with_store_timeout(config.store.timeout())
            .with_cache_ttl(config.cache.ttl())
            .with_notifier(notifier)
            .with_reminder_message(config.notifications.reminder_message.clone())
            .with_utc_offset(config.scheduler.offset()?);
        if let Some(cache) = cache {
            builder = builder.with_cache(cache);
        }
        builder.build()
    }

    pub fn clients(&self) -> &ClientRepository {
        &self.clients
    }

    pub fn payments(&self) -> &PaymentRepository {
        &self.payments
    }

    pub fn prices(&self) -> &PriceConfigurationRepository {
        &self.prices
    }

    pub fn processor(&self) -> &PaymentProcessor {
        &self.processor
    }

    pub fn reminders(&self) -> &ReminderDispatcher {
        &self.reminders
    }

    pub fn billing_cycle(&self) -> &BillingCycleUpdater {
        &self.billing_cycle
    }

    pub fn notifier(&self) -> &Arc<dyn Notifier> {
        &self.notifier
    }

    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    pub fn cache(&self) -> &CacheAside {
        &self.cache
    }

    pub fn utc_offset(&self) -> FixedOffset {
        self.utc_offset
    }

    /// Today's day of the month in the configured offset
    pub fn today(&self) -> u8 {
        local_day(self.clock.as_ref(), self.utc_offset)
    }
}

/// Builder for BillingContext
///
/// Only the store is required. Without a cache every read goes to the
/// store; without a notifier reminders are logged to the console.
#[must_use = "builder does nothing until you call build()"]
pub struct BillingContextBuilder {
    store: Option<Arc<dyn DocumentStore>>,
    store_timeout: Duration,
    cache: Option<Arc<dyn Cache>>,
    cache_ttl: Duration,
    cache_timeout: Duration,
    notifier: Option<Arc<dyn Notifier>>,
    clock: Option<Arc<dyn Clock>>,
    reminder_message: String,
    utc_offset: Option<FixedOffset>,
}

impl BillingContextBuilder {
    pub fn new() -> Self {
        Self {
            store: None,
            store_timeout: DEFAULT_STORE_TIMEOUT,
            cache: None,
            cache_ttl: DEFAULT_CACHE_TTL,
            cache_timeout: DEFAULT_CACHE_TIMEOUT,
            notifier: None,
            clock: None,
            reminder_message: DEFAULT_REMINDER_MESSAGE.to_string(),
            utc_offset: None,
        }
    }

    pub fn with_store(mut self, store: Arc<dyn DocumentStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Deadline applied to every store call
    pub fn with_store_timeout(mut self, timeout: Duration) -> Self {
        self.store_timeout = timeout;
        self
    }

    pub fn with_cache(mut self, cache: Arc<dyn Cache>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }

    pub fn with_cache_timeout(mut self, timeout: Duration) -> Self {
        self.cache_timeout = timeout;
        self
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    pub fn with_reminder_message(mut self, message: impl Into<String>) -> Self {
        self.reminder_message = message.into();
        self
    }

    pub fn with_utc_offset(mut self, offset: FixedOffset) -> Self {
        self.utc_offset = Some(offset);
        self
    }

    pub fn build(self) -> Result<BillingContext> {
        let store = self
            .store
            .ok_or_else(|| BillingError::config("a document store is required"))?;
        let store: Arc<dyn DocumentStore> = Arc::new(DeadlineStore::new(store, self.store_timeout));

        let utc_offset = match self.utc_offset {
            Some(offset) => offset,
            None => offset_from_hours(-5).ok_or_else(|| BillingError::internal("invalid default offset"))?,
        };
        let clock = self.clock.unwrap_or_else(|| Arc::new(SystemClock));
        let notifier = self.notifier.unwrap_or_else(|| Arc::new(ConsoleNotifier::new()));
        let cache = CacheAside::new(self.cache, self.cache_ttl).with_timeout(self.cache_timeout);

        let clients = ClientRepository::new(store.clone(), cache.clone()).with_clock(clock.clone());
        let payments = PaymentRepository::new(store.clone(), cache.clone()).with_clock(clock.clone());
        let prices = PriceConfigurationRepository::new(store, cache.clone()).with_clock(clock.clone());

        Ok(BillingContext {
            processor: PaymentProcessor::new(payments.clone(), clients.clone()),
            reminders: ReminderDispatcher::new(clients.clone(), notifier.clone(), self.reminder_message),
            billing_cycle: BillingCycleUpdater::new(clients.clone()),
            clients,
            payments,
            prices,
            notifier,
            clock,
            cache,
            utc_offset,
        })
    }
}

impl Default for BillingContextBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::InMemoryCache;
    use crate::store::InMemoryDocumentStore;
    use crate::testing::{FixedClock, RecordingNotifier, TestClient};
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_build_requires_store() {
        let err = BillingContext::builder().build().err().unwrap();
        assert_eq!(err.code(), "config_error");
    }

    #[tokio::test]
    async fn test_repositories_share_store_and_cache() {
        let cache = Arc::new(InMemoryCache::new(100));
        let ctx = BillingContext::builder()
            .with_store(Arc::new(InMemoryDocumentStore::new()))
            .with_cache(cache.clone())
            .build()
            .unwrap();
        assert!(ctx.cache().is_enabled());

        let client = ctx.clients().create(TestClient::new().build()).await.unwrap();
        let payment = ctx.processor().record(client.id_str(), rust_decimal::Decimal::ONE).await.unwrap();
        ctx.processor().complete(payment.id.as_deref().unwrap()).await.unwrap();

        assert!(ctx.clients().get_by_id(client.id_str()).await.unwrap().is_active());
    }

    #[tokio::test]
    async fn test_today_uses_clock_and_offset() {
        // 02:00 UTC on the 14th is 21:00 on the 13th in Bogota
        let clock = Arc::new(FixedClock::new(Utc.with_ymd_and_hms(2024, 5, 14, 2, 0, 0).unwrap()));
        let ctx = BillingContext::builder()
            .with_store(Arc::new(InMemoryDocumentStore::new()))
            .with_clock(clock)
            .with_notifier(Arc::new(RecordingNotifier::new()))
            .build()
            .unwrap();

        assert_eq!(ctx.today(), 13);
        assert_eq!(ctx.utc_offset().local_minus_utc(), -5 * 3600);
    }

    #[tokio::test]
    async fn test_from_config_defaults_to_console_and_memory_cache() {
        let config = crate::config::ConfigBuilder::new().build().unwrap();
        let ctx = BillingContext::from_config(&config, Arc::new(InMemoryDocumentStore::new()))
            .await
            .unwrap();

        assert!(ctx.cache().is_enabled());
        assert!(ctx.notifier().is_healthy());
        assert_eq!(ctx.reminders().message(), DEFAULT_REMINDER_MESSAGE);
    }
}
