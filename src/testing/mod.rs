//! Testing utilities for the billing backend
//!
//! Test doubles for the ports the jobs and repositories depend on:
//! - [`FailingCache`]: a cache whose every call fails, to prove cache
//!   outages only cost latency
//! - [`RecordingNotifier`]: captures reminders instead of sending them
//! - [`FixedClock`]: pins "now" so day-of-month logic is deterministic
//!
//! # Example
//!
//! ```rust,ignore
//! use resale_billing::testing::{FixedClock, RecordingNotifier};
//!
//! let clock = FixedClock::on_day(2024, 5, 17);
//! let notifier = RecordingNotifier::new();
//! // ... run the daily reminder job
//! assert_eq!(notifier.sent().len(), 1);
//! ```

mod doubles;
mod fixtures;

pub use doubles::{FailingCache, FixedClock, RecordingNotifier, SentReminder};
pub use fixtures::{TestClient, fake};
