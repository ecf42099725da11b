//! The two recurring billing jobs

use crate::app::BillingContext;
use crate::error::Result;
use crate::jobs::{JobRegistry, Schedule, SchedulerConfig};
use crate::traits::job::ScheduledJob;
use async_trait::async_trait;
use std::sync::Arc;

/// Daily reminder run: messages inactive clients inside their payment window
pub struct DailyReminderJob {
    schedule: Schedule,
}

impl DailyReminderJob {
    pub const NAME: &'static str = "daily_reminder";

    pub fn new(hour: u32, minute: u32) -> Result<Self> {
        Ok(Self {
            schedule: Schedule::daily(hour, minute)?,
        })
    }

    pub fn from_config(config: &SchedulerConfig) -> Result<Self> {
        Self::new(config.reminder_hour, config.reminder_minute)
    }
}

#[async_trait]
impl ScheduledJob for DailyReminderJob {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn schedule(&self) -> &Schedule {
        &self.schedule
    }

    async fn run(&self, ctx: &BillingContext, day: u8) -> Result<()> {
        let report = ctx.reminders().run(day).await?;
        if !report.failed.is_empty() {
            tracing::warn!(day, failed = report.failed.len(), "some reminders were not delivered");
        }
        Ok(())
    }
}

/// Twice-monthly status update deactivating clients whose due day is near
pub struct BillingCycleJob {
    schedule: Schedule,
}

impl BillingCycleJob {
    pub const NAME: &'static str = "billing_cycle_update";

    pub fn new(days: Vec<u32>, hour: u32) -> Result<Self> {
        Ok(Self {
            schedule: Schedule::monthly_on(days, hour, 0)?,
        })
    }

    pub fn from_config(config: &SchedulerConfig) -> Result<Self> {
        Self::new(config.billing_cycle_days.clone(), config.billing_cycle_hour)
    }
}

#[async_trait]
impl ScheduledJob for BillingCycleJob {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn schedule(&self) -> &Schedule {
        &self.schedule
    }

    async fn run(&self, ctx: &BillingContext, day: u8) -> Result<()> {
        ctx.billing_cycle().run(day).await?;
        Ok(())
    }
}

/// Registry holding both billing jobs, scheduled per `config`
pub async fn builtin_registry(config: &SchedulerConfig) -> Result<JobRegistry> {
    let registry = JobRegistry::new();
    registry.register(Arc::new(DailyReminderJob::from_config(config)?)).await;
    registry.register(Arc::new(BillingCycleJob::from_config(config)?)).await;
    Ok(registry)
}
