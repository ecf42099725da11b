//! Notifier trait for sending payment reminders
//!
//! This trait abstracts the outbound messaging transport, allowing the
//! reminder dispatcher to run against Telegram, WhatsApp via Twilio, or
//! console output for development.

use crate::error::{BillingError, Result};
use crate::models::Client;
use async_trait::async_trait;

/// Who a reminder goes to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recipient {
    /// Identifier of the client being reminded
    pub client_id: String,
    /// Display name, used by transports that personalise the message
    pub name: String,
    /// Phone number in international format, digits only (e.g. "573001234567")
    pub phone: Option<String>,
    /// Chat identifier for chat-based transports
    pub chat_id: Option<String>,
}

impl Recipient {
    pub fn new(client_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            name: name.into(),
            phone: None,
            chat_id: None,
        }
    }

    /// Set the phone number; a leading `+` and spaces are stripped
    pub fn phone(mut self, phone: impl AsRef<str>) -> Self {
        let digits: String = phone.as_ref().chars().filter(|c| c.is_ascii_digit()).collect();
        self.phone = Some(digits);
        self
    }

    pub fn chat_id(mut self, chat_id: impl Into<String>) -> Self {
        self.chat_id = Some(chat_id.into());
        self
    }

    /// Build a recipient from a stored client
    pub fn from_client(client: &Client) -> Self {
        Self::new(client.id.clone().unwrap_or_default(), client.name.clone()).phone(&client.phone)
    }

    /// Ensure the recipient can be addressed at all
    pub fn validate(&self) -> Result<()> {
        let has_phone = self.phone.as_deref().is_some_and(|p| !p.is_empty());
        let has_chat = self.chat_id.as_deref().is_some_and(|c| !c.is_empty());
        if !has_phone && !has_chat {
            return Err(BillingError::validation(format!(
                "recipient '{}' has neither a phone number nor a chat id",
                self.client_id
            )));
        }
        Ok(())
    }
}

/// Notifier trait for delivering reminders
///
/// Implementations may perform network I/O and must be treated as slow and
/// fallible: the dispatcher logs a failure for one recipient and moves on.
///
/// # Example
///
/// ```rust,ignore
/// use resale_billing::traits::notifier::{Notifier, Recipient};
/// use resale_billing::Result;
/// use async_trait::async_trait;
///
/// struct SmsNotifier;
///
/// #[async_trait]
/// impl Notifier for SmsNotifier {
///     async fn send_reminder(&self, recipient: &Recipient, message: &str) -> Result<()> {
///         // Send via your preferred gateway
///         Ok(())
///     }
///
///     fn is_healthy(&self) -> bool {
///         true
///     }
/// }
/// ```
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Send `message` to `recipient`
    async fn send_reminder(&self, recipient: &Recipient, message: &str) -> Result<()>;

    /// Check if the transport is healthy/configured
    fn is_healthy(&self) -> bool;
}
