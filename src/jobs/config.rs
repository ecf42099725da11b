//! Configuration for the billing scheduler

use crate::error::{BillingError, Result};
use crate::traits::clock::offset_from_hours;
use crate::utils::get_env_with_prefix;
use crate::validation::validate_day_of_month;
use chrono::FixedOffset;
use serde::{Deserialize, Serialize};

/// When the built-in jobs fire
///
/// All times are wall-clock in the fixed `utc_offset_hours` offset. The
/// default is America/Bogota (UTC-5), which has no daylight saving.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct SchedulerConfig {
    /// Run the scheduler loop at all
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    #[serde(default = "default_utc_offset_hours")]
    pub utc_offset_hours: i32,

    /// Hour of the daily reminder run
    #[serde(default = "default_reminder_hour")]
    pub reminder_hour: u32,

    #[serde(default)]
    pub reminder_minute: u32,

    /// Days of the month the status update runs on
    #[serde(default = "default_billing_cycle_days")]
    pub billing_cycle_days: Vec<u32>,

    #[serde(default)]
    pub billing_cycle_hour: u32,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            utc_offset_hours: default_utc_offset_hours(),
            reminder_hour: default_reminder_hour(),
            reminder_minute: 0,
            billing_cycle_days: default_billing_cycle_days(),
            billing_cycle_hour: 0,
        }
    }
}

impl SchedulerConfig {
    /// Load scheduler configuration from environment variables
    ///
    /// `BILLING_CYCLE_DAYS` is a comma-separated list, e.g. "13,25".
    /// Unparseable values keep their defaults.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(enabled) = get_env_with_prefix("SCHEDULER_ENABLED") {
            config.enabled = enabled.parse().unwrap_or(true);
        }

        if let Some(offset) = get_env_with_prefix("SCHEDULER_UTC_OFFSET_HOURS") {
            if let Ok(o) = offset.parse() {
                config.utc_offset_hours = o;
            }
        }

        if let Some(hour) = get_env_with_prefix("REMINDER_HOUR") {
            if let Ok(h) = hour.parse() {
                config.reminder_hour = h;
            }
        }

        if let Some(minute) = get_env_with_prefix("REMINDER_MINUTE") {
            if let Ok(m) = minute.parse() {
                config.reminder_minute = m;
            }
        }

        if let Some(days) = get_env_with_prefix("BILLING_CYCLE_DAYS") {
            let parsed: std::result::Result<Vec<u32>, _> =
                days.split(',').map(|d| d.trim().parse::<u32>()).collect();
            if let Ok(d) = parsed {
                config.billing_cycle_days = d;
            }
        }

        if let Some(hour) = get_env_with_prefix("BILLING_CYCLE_HOUR") {
            if let Ok(h) = hour.parse() {
                config.billing_cycle_hour = h;
            }
        }

        config
    }

    /// The scheduler's timezone as a fixed offset
    pub fn offset(&self) -> Result<FixedOffset> {
        offset_from_hours(self.utc_offset_hours).ok_or_else(|| {
            BillingError::config(format!(
                "utc_offset_hours must be between -23 and 23, got {}",
                self.utc_offset_hours
            ))
        })
    }

    pub fn validate(&self) -> Result<()> {
        self.offset()?;

        if self.reminder_hour > 23 || self.billing_cycle_hour > 23 {
            return Err(BillingError::config("scheduler hours must be between 0 and 23"));
        }
        if self.reminder_minute > 59 {
            return Err(BillingError::config("reminder_minute must be between 0 and 59"));
        }
        if self.billing_cycle_days.is_empty() {
            return Err(BillingError::config("billing_cycle_days must name at least one day"));
        }
        for day in &self.billing_cycle_days {
            let valid = u8::try_from(*day).is_ok_and(|d| validate_day_of_month(d).is_ok());
            if !valid {
                return Err(BillingError::config(format!("{} is not a day of the month", day)));
            }
        }

        Ok(())
    }
}

fn default_enabled() -> bool {
    true
}

fn default_utc_offset_hours() -> i32 {
    -5
}

fn default_reminder_hour() -> u32 {
    17
}

fn default_billing_cycle_days() -> Vec<u32> {
    vec![13, 25]
}
