//! Scheduled job trait
//!
//! A scheduled job is a named unit of work with a wall-clock schedule. The
//! scheduler hands it the calendar day it fired for, in the configured
//! timezone.

use crate::app::BillingContext;
use crate::error::Result;
use crate::jobs::Schedule;
use async_trait::async_trait;

/// A recurring job driven by the scheduler
#[async_trait]
pub trait ScheduledJob: Send + Sync {
    /// Unique name for this job (e.g. "daily_reminder")
    fn name(&self) -> &str;

    /// When the job fires, in the scheduler's offset
    fn schedule(&self) -> &Schedule;

    /// Execute the job for calendar day `day` (1-31)
    ///
    /// The context provides the repositories, notifier, and clock.
    async fn run(&self, ctx: &BillingContext, day: u8) -> Result<()>;
}
