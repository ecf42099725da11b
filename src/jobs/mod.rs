//! Scheduled billing jobs
//!
//! This module provides wall-clock schedules, a registry of named jobs, and
//! a scheduler loop that fires them in a fixed UTC offset. Two jobs ship
//! built in: the daily reminder run and the twice-monthly status update.
//!
//! # Example
//!
//! ```rust,ignore
//! use resale_billing::jobs::{builtin_registry, Scheduler, SchedulerHandle};
//!
//! let registry = builtin_registry(&config.scheduler).await?;
//! let (scheduler, shutdown_rx) = Scheduler::new(Arc::new(registry), Arc::new(ctx));
//! let handle = SchedulerHandle::spawn(scheduler, shutdown_rx);
//! // ...
//! handle.shutdown().await;
//! ```

mod builtin;
mod config;
mod registry;
mod schedule;
mod scheduler;

pub use builtin::{BillingCycleJob, DailyReminderJob, builtin_registry};
pub use config::SchedulerConfig;
pub use registry::JobRegistry;
pub use schedule::Schedule;
pub use scheduler::{Scheduler, SchedulerHandle};
