//! Reminder delivery
//!
//! This module provides reminder transports with multiple backend options:
//! - `ConsoleNotifier` - Logs reminders (for development)
//! - `TelegramNotifier` - Telegram Bot API `sendMessage`
//! - `TwilioWhatsAppNotifier` - WhatsApp through Twilio
//!
//! # Example
//!
//! ```rust,ignore
//! use resale_billing::notifications::{NotifierConfig, notifier_from_config};
//!
//! let notifier = notifier_from_config(&NotifierConfig::from_env())?;
//! ```

mod config;
mod console;
mod telegram;
mod twilio;

pub use config::{DEFAULT_REMINDER_MESSAGE, NotifierBackend, NotifierConfig};
pub use console::ConsoleNotifier;
pub use telegram::TelegramNotifier;
pub use twilio::TwilioWhatsAppNotifier;

// Re-export the port for convenience
pub use crate::traits::notifier::{Notifier, Recipient};

use crate::error::{BillingError, Result};
use std::sync::Arc;

/// Build the configured notifier
///
/// Fails with a configuration error when the selected backend is missing
/// credentials.
pub fn notifier_from_config(config: &NotifierConfig) -> Result<Arc<dyn Notifier>> {
    config.validate()?;

    let notifier: Arc<dyn Notifier> = match config.backend {
        NotifierBackend::Console => Arc::new(ConsoleNotifier::new()),
        NotifierBackend::Telegram => {
            let (Some(token), Some(chat_id)) = (&config.telegram_bot_token, &config.telegram_chat_id) else {
                return Err(BillingError::config("Telegram notifier is missing credentials"));
            };
            Arc::new(TelegramNotifier::new(token.clone(), chat_id.clone(), config.timeout()))
        }
        NotifierBackend::Twilio => {
            let (Some(sid), Some(token), Some(from)) = (
                &config.twilio_account_sid,
                &config.twilio_auth_token,
                &config.twilio_from_whatsapp,
            ) else {
                return Err(BillingError::config("Twilio notifier is missing credentials"));
            };
            Arc::new(TwilioWhatsAppNotifier::new(sid.clone(), token.clone(), from.clone(), config.timeout()))
        }
    };

    tracing::info!(backend = ?config.backend, "notifier configured");
    Ok(notifier)
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::SecretString;

    #[test]
    fn test_console_by_default() {
        let notifier = notifier_from_config(&NotifierConfig::default()).unwrap();
        assert!(notifier.is_healthy());
    }

    #[test]
    fn test_missing_credentials_fail_fast() {
        let config = NotifierConfig {
            backend: NotifierBackend::Telegram,
            ..Default::default()
        };
        assert_eq!(notifier_from_config(&config).err().map(|e| e.code()), Some("config_error"));
    }

    #[test]
    fn test_telegram_from_config() {
        let config = NotifierConfig {
            backend: NotifierBackend::Telegram,
            telegram_bot_token: Some(SecretString::from("123:abc".to_string())),
            telegram_chat_id: Some("42".into()),
            ..Default::default()
        };
        assert!(notifier_from_config(&config).unwrap().is_healthy());
    }
}
