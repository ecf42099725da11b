//! Billing rules: the payment lifecycle, the twice-monthly status engine and
//! reminder dispatch.
//!
//! # Example
//!
//! ```rust,ignore
//! use resale_billing::billing::{BillingCycleUpdater, ReminderDispatcher};
//!
//! // On the 13th, clients due 15..=20 become inactive
//! let report = BillingCycleUpdater::new(clients.clone()).run(13).await?;
//!
//! // Every day, inactive clients inside their window get a reminder
//! let report = ReminderDispatcher::new(clients, notifier, message).run(17).await?;
//! println!("sent {}, failed {}", report.sent.len(), report.failed.len());
//! ```

mod processor;
mod reminders;
mod status;

pub use processor::PaymentProcessor;
pub use reminders::{FailedReminder, REMINDER_GRACE_DAYS, ReminderDispatcher, ReminderReport, is_due, select_due};
pub use status::{BillingCycleUpdater, StatusUpdateReport, deactivation_window, select_for_deactivation};
