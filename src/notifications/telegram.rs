//! Telegram Bot API notifier

use crate::error::{BillingError, Result};
use crate::traits::notifier::{Notifier, Recipient};
use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use std::time::Duration;

const DEFAULT_API_BASE: &str = "https://api.telegram.org";

/// Sends reminders through a Telegram bot's `sendMessage` method
///
/// Messages go to the recipient's own chat id when it has one, otherwise to
/// the configured default chat.
#[derive(Clone, Debug)]
pub struct TelegramNotifier {
    client: reqwest::Client,
    bot_token: SecretString,
    default_chat_id: String,
    api_base: String,
}

impl TelegramNotifier {
    pub fn new(bot_token: impl Into<SecretString>, default_chat_id: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client: build_client(timeout),
            bot_token: bot_token.into(),
            default_chat_id: default_chat_id.into(),
            api_base: DEFAULT_API_BASE.to_string(),
        }
    }

    /// Point at a different API host (e.g. a local Bot API server)
    #[must_use]
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    fn build_request(&self, recipient: &Recipient, message: &str) -> Result<reqwest::Request> {
        let chat_id = recipient
            .chat_id
            .as_deref()
            .filter(|c| !c.is_empty())
            .unwrap_or(&self.default_chat_id);
        if chat_id.is_empty() {
            return Err(BillingError::notification(format!(
                "no Telegram chat id for client {}",
                recipient.client_id
            )));
        }

        let url = format!("{}/bot{}/sendMessage", self.api_base, self.bot_token.expose_secret());
        self.client
            .get(url)
            .query(&[("chat_id", chat_id), ("text", message)])
            .build()
            .map_err(|e| BillingError::notification(format!("failed to build Telegram request: {}", e)))
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn send_reminder(&self, recipient: &Recipient, message: &str) -> Result<()> {
        let request = self.build_request(recipient, message)?;
        let response = self.client.execute(request).await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(BillingError::notification(format!(
                "Telegram API returned status {}: {}",
                status, body
            )));
        }

        tracing::info!(client_id = %recipient.client_id, "Telegram reminder sent");
        Ok(())
    }

    fn is_healthy(&self) -> bool {
        !self.bot_token.expose_secret().is_empty()
    }
}

fn build_client(timeout: Duration) -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(timeout)
        .user_agent("resale-billing")
        .build()
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn notifier(chat: &str) -> TelegramNotifier {
        TelegramNotifier::new("123:abc".to_string(), chat, Duration::from_secs(10))
    }

    #[test]
    fn test_request_targets_send_message_with_query() {
        let recipient = Recipient::new("c1", "Ana").phone("573001234567");
        let request = notifier("999").build_request(&recipient, "Hola ¿ya pagaste?").unwrap();

        assert_eq!(request.method(), reqwest::Method::GET);
        let url = request.url();
        assert_eq!(url.host_str(), Some("api.telegram.org"));
        assert_eq!(url.path(), "/bot123:abc/sendMessage");

        let query: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert!(query.contains(&("chat_id".to_string(), "999".to_string())));
        assert!(query.contains(&("text".to_string(), "Hola ¿ya pagaste?".to_string())));
    }

    #[test]
    fn test_recipient_chat_id_wins() {
        let recipient = Recipient::new("c1", "Ana").chat_id("42");
        let request = notifier("999").build_request(&recipient, "hi").unwrap();
        assert!(request.url().query().unwrap_or_default().contains("chat_id=42"));
    }

    #[test]
    fn test_no_chat_anywhere_is_an_error() {
        let err = notifier("").build_request(&Recipient::new("c1", "Ana"), "hi").unwrap_err();
        assert_eq!(err.code(), "notification_failure");
    }

    #[test]
    fn test_api_base_override() {
        let n = notifier("999").with_api_base("http://localhost:8081/");
        let request = n.build_request(&Recipient::new("c1", "Ana"), "hi").unwrap();
        assert_eq!(request.url().host_str(), Some("localhost"));
        assert_eq!(request.url().port(), Some(8081));
    }
}
