//! Console notifier for development
//!
//! Logs reminders instead of delivering them. Phone numbers are masked in
//! the output; only the last four digits are shown.

use crate::error::Result;
use crate::traits::notifier::{Notifier, Recipient};
use async_trait::async_trait;

/// A notifier that logs reminders through `tracing`
///
/// # Example
///
/// ```rust,ignore
/// use resale_billing::notifications::ConsoleNotifier;
/// use resale_billing::traits::notifier::{Notifier, Recipient};
///
/// let notifier = ConsoleNotifier::new();
/// let recipient = Recipient::new("c1", "Ana").phone("573001234567");
/// notifier.send_reminder(&recipient, "Hola").await?; // logged, not sent
/// ```
#[derive(Debug, Clone, Default)]
pub struct ConsoleNotifier;

impl ConsoleNotifier {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Notifier for ConsoleNotifier {
    async fn send_reminder(&self, recipient: &Recipient, message: &str) -> Result<()> {
        recipient.validate()?;

        tracing::info!(
            client_id = %recipient.client_id,
            name = %recipient.name,
            phone = %mask(recipient.phone.as_deref().unwrap_or("")),
            message = %message,
            "reminder (console)"
        );
        Ok(())
    }

    fn is_healthy(&self) -> bool {
        true
    }
}

fn mask(phone: &str) -> String {
    let visible = phone.len().saturating_sub(4);
    phone
        .char_indices()
        .map(|(i, c)| if i < visible { '*' } else { c })
        .collect()
}
