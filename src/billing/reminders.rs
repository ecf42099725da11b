//! Reminder selection and dispatch
//!
//! A client is due for a reminder on `day` when
//! `day_to_pay <= day <= day_to_pay + 4`: a five-day window opening on the
//! due day. The window does not wrap into the next month.

use crate::error::Result;
use crate::models::{Client, ClientStatus};
use crate::repository::ClientRepository;
use crate::traits::notifier::{Notifier, Recipient};
use std::sync::Arc;

/// Days after the due day that still get a reminder
pub const REMINDER_GRACE_DAYS: u8 = 4;

/// Whether a client due on `day_to_pay` should be reminded on `day`
pub fn is_due(day_to_pay: u8, day: u8) -> bool {
    day_to_pay <= day && u16::from(day) <= u16::from(day_to_pay) + u16::from(REMINDER_GRACE_DAYS)
}

/// Inactive clients in `roster` whose reminder window contains `day`
pub fn select_due(day: u8, roster: &[Client]) -> Vec<&Client> {
    roster
        .iter()
        .filter(|c| c.status == ClientStatus::Inactive && is_due(c.day_to_pay, day))
        .collect()
}

/// A reminder that could not be delivered
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedReminder {
    pub client_id: String,
    pub error: String,
}

/// Outcome of one dispatch run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReminderReport {
    pub day: u8,
    /// Inactive clients looked at
    pub considered: usize,
    /// Ids of clients reminded successfully
    pub sent: Vec<String>,
    pub failed: Vec<FailedReminder>,
}

/// Sends the reminder message to every inactive client inside its window
///
/// Delivery is sequential. A failure for one client is logged and recorded
/// in the report; the remaining clients are still attempted. There is no
/// retry.
#[derive(Clone)]
pub struct ReminderDispatcher {
    clients: ClientRepository,
    notifier: Arc<dyn Notifier>,
    message: String,
}

impl ReminderDispatcher {
    pub fn new(clients: ClientRepository, notifier: Arc<dyn Notifier>, message: impl Into<String>) -> Self {
        Self {
            clients,
            notifier,
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Remind every due client for calendar day `day`
    ///
    /// Only reading the roster can fail the run; delivery failures cannot.
    pub async fn run(&self, day: u8) -> Result<ReminderReport> {
        let roster = self.clients.list_by_status(ClientStatus::Inactive).await?;
        let due = select_due(day, &roster);

        let mut report = ReminderReport {
            day,
            considered: roster.len(),
            ..Default::default()
        };

        for client in due {
            let recipient = Recipient::from_client(client);
            tracing::debug!(client_id = %recipient.client_id, day_to_pay = client.day_to_pay, "sending reminder");

            match self.notifier.send_reminder(&recipient, &self.message).await {
                Ok(()) => report.sent.push(recipient.client_id),
                Err(e) => {
                    tracing::warn!(client_id = %recipient.client_id, error = %e, "failed to send reminder");
                    report.failed.push(FailedReminder {
                        client_id: recipient.client_id,
                        error: e.to_string(),
                    });
                }
            }
        }

        tracing::info!(
            day,
            considered = report.considered,
            sent = report.sent.len(),
            failed = report.failed.len(),
            "payment reminders dispatched"
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NewClient;
    use chrono::Utc;

    fn client(day_to_pay: u8, status: ClientStatus) -> Client {
        let mut c = Client::new(NewClient::new("u1", "Ana", "573001234567", day_to_pay), Utc::now());
        c.status = status;
        c
    }

    #[test]
    fn test_window_is_due_day_plus_four() {
        assert!(is_due(15, 17));
        assert!(!is_due(10, 17));
        assert!(is_due(15, 15));
        assert!(is_due(15, 19));
        assert!(!is_due(15, 20));
        assert!(!is_due(15, 14));
    }

    #[test]
    fn test_window_does_not_wrap_month_end() {
        assert!(is_due(30, 31));
        assert!(!is_due(30, 1));
    }

    #[test]
    fn test_select_due_skips_active_clients() {
        let roster = vec![
            client(15, ClientStatus::Inactive),
            client(15, ClientStatus::Active),
            client(10, ClientStatus::Inactive),
        ];
        let due = select_due(17, &roster);
        assert_eq!(due.len(), 1);
        assert_eq!(due[0].status, ClientStatus::Inactive);
        assert_eq!(due[0].day_to_pay, 15);
    }
}
