//! Billing-cycle status engine
//!
//! Twice a month clients whose due day is coming up are flipped to inactive
//! until they pay again:
//!
//! | run day | due days deactivated |
//! |---------|----------------------|
//! | 13      | 15..=20              |
//! | 25      | 28..=30              |
//!
//! Any other day is a no-op.

use crate::error::Result;
use crate::models::Client;
use crate::repository::ClientRepository;
use std::ops::RangeInclusive;

/// Due-day range to deactivate when the cycle runs on `day`, if any
pub fn deactivation_window(day: u8) -> Option<RangeInclusive<u8>> {
    match day {
        13 => Some(15..=20),
        25 => Some(28..=30),
        _ => None,
    }
}

/// Clients in `roster` that a run on `day` would deactivate
pub fn select_for_deactivation(day: u8, roster: &[Client]) -> Vec<&Client> {
    let Some(window) = deactivation_window(day) else {
        return Vec::new();
    };
    roster.iter().filter(|c| window.contains(&c.day_to_pay)).collect()
}

/// Outcome of one billing-cycle run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusUpdateReport {
    pub day: u8,
    /// Range applied, `None` on a no-op day
    pub window: Option<RangeInclusive<u8>>,
    /// Ids of clients the batch write matched
    pub deactivated: Vec<String>,
}

impl StatusUpdateReport {
    pub fn is_noop(&self) -> bool {
        self.window.is_none()
    }
}

/// Applies the status engine to the client store
#[derive(Clone)]
pub struct BillingCycleUpdater {
    clients: ClientRepository,
}

impl BillingCycleUpdater {
    pub fn new(clients: ClientRepository) -> Self {
        Self { clients }
    }

    /// Run the engine for calendar day `day`
    ///
    /// The write is one set-based update; the affected clients' cache
    /// entries are invalidated by the repository afterwards.
    pub async fn run(&self, day: u8) -> Result<StatusUpdateReport> {
        let Some(window) = deactivation_window(day) else {
            tracing::debug!(day, "not a billing-cycle day, nothing to update");
            return Ok(StatusUpdateReport {
                day,
                ..Default::default()
            });
        };

        tracing::info!(
            day,
            from_day = *window.start(),
            to_day = *window.end(),
            "updating client status for upcoming due days"
        );
        let affected = self.clients.deactivate_due_range(window.clone()).await?;

        let report = StatusUpdateReport {
            day,
            window: Some(window),
            deactivated: affected.iter().map(|c| c.id_str().to_string()).collect(),
        };
        tracing::info!(day, count = report.deactivated.len(), "billing-cycle update finished");
        Ok(report)
    }
}
