//! Configuration for reminder delivery

use crate::error::{BillingError, Result};
use crate::utils::{get_env_with_prefix, parse_env_with_prefix};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default reminder text sent to clients inside their payment window
pub const DEFAULT_REMINDER_MESSAGE: &str =
    "Hola, te recuerdo el compromiso que tienes con YouTube Premium. ¡Quédate al día con tu pago! 😉";

/// Notification transport
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NotifierBackend {
    /// Log reminders instead of sending them (default)
    #[default]
    Console,
    /// Telegram Bot API
    Telegram,
    /// WhatsApp through the Twilio Messages API
    Twilio,
}

/// Notifier configuration
///
/// Tokens are never (de)serialized; they are only read from the environment
/// or set in code.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct NotifierConfig {
    #[serde(default)]
    pub backend: NotifierBackend,

    #[serde(skip)]
    pub telegram_bot_token: Option<SecretString>,

    /// Chat that receives every Telegram reminder
    #[serde(default)]
    pub telegram_chat_id: Option<String>,

    #[serde(default)]
    pub twilio_account_sid: Option<String>,

    #[serde(skip)]
    pub twilio_auth_token: Option<SecretString>,

    /// Sender, e.g. "whatsapp:+14155238886"
    #[serde(default)]
    pub twilio_from_whatsapp: Option<String>,

    #[serde(default = "default_reminder_message")]
    pub reminder_message: String,

    /// Per-request timeout for outbound calls (in seconds)
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

impl Default for NotifierConfig {
    fn default() -> Self {
        Self {
            backend: NotifierBackend::default(),
            telegram_bot_token: None,
            telegram_chat_id: None,
            twilio_account_sid: None,
            twilio_auth_token: None,
            twilio_from_whatsapp: None,
            reminder_message: default_reminder_message(),
            timeout_seconds: default_timeout_seconds(),
        }
    }
}

impl NotifierConfig {
    /// Load notifier configuration from environment variables
    ///
    /// When `NOTIFIER_BACKEND` is unset, Twilio is chosen if its credentials
    /// are present, then Telegram, then the console.
    pub fn from_env() -> Self {
        let mut config = Self {
            telegram_bot_token: get_env_with_prefix("TELEGRAM_BOT_TOKEN").map(SecretString::from),
            telegram_chat_id: get_env_with_prefix("TELEGRAM_CHAT_ID"),
            twilio_account_sid: get_env_with_prefix("TWILIO_ACCOUNT_SID"),
            twilio_auth_token: get_env_with_prefix("TWILIO_AUTH_TOKEN").map(SecretString::from),
            twilio_from_whatsapp: get_env_with_prefix("TWILIO_FROM_WHATSAPP"),
            ..Self::default()
        };

        config.backend = match get_env_with_prefix("NOTIFIER_BACKEND") {
            Some(backend) => match backend.to_lowercase().as_str() {
                "telegram" => NotifierBackend::Telegram,
                "twilio" | "whatsapp" => NotifierBackend::Twilio,
                "console" => NotifierBackend::Console,
                other => {
                    tracing::warn!(backend = %other, "unknown notifier backend, using console");
                    NotifierBackend::Console
                }
            },
            None if config.twilio_account_sid.is_some() && config.twilio_auth_token.is_some() => {
                NotifierBackend::Twilio
            }
            None if config.telegram_bot_token.is_some() => NotifierBackend::Telegram,
            None => NotifierBackend::Console,
        };

        if let Some(message) = get_env_with_prefix("REMINDER_MESSAGE") {
            config.reminder_message = message;
        }

        if let Some(seconds) = parse_env_with_prefix("NOTIFIER_TIMEOUT_SECONDS") {
            config.timeout_seconds = seconds;
        }

        config
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    /// Check that the selected backend has everything it needs
    pub fn validate(&self) -> Result<()> {
        if self.timeout_seconds == 0 {
            return Err(BillingError::config("notifier timeout must be greater than zero"));
        }
        if self.reminder_message.trim().is_empty() {
            return Err(BillingError::config("reminder message cannot be empty"));
        }

        match self.backend {
            NotifierBackend::Console => Ok(()),
            NotifierBackend::Telegram => {
                require(self.telegram_bot_token.is_some(), "TELEGRAM_BOT_TOKEN")?;
                require(self.telegram_chat_id.is_some(), "TELEGRAM_CHAT_ID")
            }
            NotifierBackend::Twilio => {
                require(self.twilio_account_sid.is_some(), "TWILIO_ACCOUNT_SID")?;
                require(self.twilio_auth_token.is_some(), "TWILIO_AUTH_TOKEN")?;
                require(self.twilio_from_whatsapp.is_some(), "TWILIO_FROM_WHATSAPP")
            }
        }
    }
}

fn require(present: bool, name: &str) -> Result<()> {
    if present {
        Ok(())
    } else {
        Err(BillingError::config(format!("{} is required for the selected notifier", name)))
    }
}

fn default_reminder_message() -> String {
    DEFAULT_REMINDER_MESSAGE.to_string()
}

fn default_timeout_seconds() -> u64 {
    10
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_console_needs_nothing() {
        assert!(NotifierConfig::default().validate().is_ok());
    }

    #[test]
    fn test_twilio_requires_credentials() {
        let mut config = NotifierConfig {
            backend: NotifierBackend::Twilio,
            twilio_account_sid: Some("AC123".into()),
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("TWILIO_AUTH_TOKEN"));

        config.twilio_auth_token = Some(SecretString::from("token".to_string()));
        config.twilio_from_whatsapp = Some("whatsapp:+14155238886".into());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_debug_output_hides_tokens() {
        let config = NotifierConfig {
            telegram_bot_token: Some(SecretString::from("super-secret".to_string())),
            ..Default::default()
        };
        assert!(!format!("{:?}", config).contains("super-secret"));
    }

    #[test]
    fn test_deserialize_ignores_tokens() {
        let config: NotifierConfig =
            serde_json::from_str(r#"{"backend": "telegram", "telegram_chat_id": "42"}"#).unwrap();
        assert_eq!(config.backend, NotifierBackend::Telegram);
        assert!(config.telegram_bot_token.is_none());
        assert_eq!(config.timeout_seconds, 10);
    }
}
