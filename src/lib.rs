//! Resale billing - client billing and payment reminders for a subscription reseller
//!
//! Tracks clients who share a reseller's subscription, the payments they
//! make, and each reseller's monthly price. Two recurring jobs keep the
//! roster honest: a twice-monthly status update flips clients whose due day
//! is approaching to inactive, and a daily run reminds inactive clients
//! inside their payment window.
//!
//! # Features
//!
//! - **Repositories**: clients, payments, and price configurations over a
//!   pluggable document store, with cache-aside reads
//! - **Caching**: in-memory (moka) or Redis, with invalidation after writes
//! - **Payments**: processing -> completed/rejected lifecycle; completion
//!   reactivates the client
//! - **Reminders**: console, Telegram, or WhatsApp via Twilio
//! - **Scheduling**: wall-clock jobs in a fixed UTC offset (Bogota by default)
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use resale_billing::{BillingContext, ConfigBuilder, InMemoryDocumentStore};
//! use resale_billing::jobs::{Scheduler, SchedulerHandle, builtin_registry};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> resale_billing::Result<()> {
//!     let config = ConfigBuilder::new().from_env().build()?;
//!     resale_billing::init_tracing_with_config(&config);
//!
//!     let ctx = BillingContext::from_config(&config, Arc::new(InMemoryDocumentStore::new())).await?;
//!     let registry = builtin_registry(&config.scheduler).await?;
//!     let (scheduler, shutdown_rx) = Scheduler::new(Arc::new(registry), Arc::new(ctx));
//!     let handle = SchedulerHandle::spawn(scheduler, shutdown_rx);
//!
//!     tokio::signal::ctrl_c().await.ok();
//!     handle.shutdown().await;
//!     Ok(())
//! }
//! ```

mod app;
pub mod billing;
pub mod cache;
mod config;
mod error;
pub mod jobs;
pub mod models;
pub mod notifications;
pub mod repository;
pub mod store;
pub mod testing;
pub mod traits;
pub mod utils;
pub mod validation;

// Re-exports for public API
pub use app::{BillingContext, BillingContextBuilder};
pub use billing::{BillingCycleUpdater, PaymentProcessor, ReminderDispatcher, ReminderReport, StatusUpdateReport};
pub use cache::{CacheAside, CacheBackend, CacheConfig, InMemoryCache, NoOpCache};
#[cfg(feature = "cache-redis")]
pub use cache::RedisCache;
pub use config::{Config, ConfigBuilder, LoggingConfig, StoreConfig};
pub use error::{BillingError, Result};
pub use jobs::{JobRegistry, Schedule, Scheduler, SchedulerConfig, SchedulerHandle};
pub use models::{Client, ClientStatus, ClientUpdate, NewClient, Payment, PaymentStatus, PriceConfiguration};
pub use notifications::{NotifierBackend, NotifierConfig};
pub use repository::{ClientRepository, PaymentRepository, PriceConfigurationRepository};
pub use store::{DeadlineStore, Filter, InMemoryDocumentStore, Patch};
pub use traits::cache::{Cache, CacheExt};
pub use traits::clock::{Clock, SystemClock};
pub use traits::job::ScheduledJob;
pub use traits::notifier::{Notifier, Recipient};
pub use traits::store::{Document, DocumentStore};

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize tracing/logging with sensible defaults
///
/// # Environment Variables
///
/// - `RUST_LOG`: Set log level (e.g., "info", "debug", "resale_billing=debug")
/// - `BILLING_LOG_JSON`: Set to "true" for JSON formatted logs
pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let json_logs = std::env::var("BILLING_LOG_JSON")
        .map(|v| v.parse::<bool>().unwrap_or(false))
        .unwrap_or(false);

    if json_logs {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}

/// Initialize tracing with a custom configuration
///
/// `RUST_LOG`, when set, still wins over `config.logging.level`.
pub fn init_tracing_with_config(config: &Config) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    if config.logging.json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}
