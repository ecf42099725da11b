//! WhatsApp reminders through the Twilio Messages API

use crate::error::{BillingError, Result};
use crate::traits::notifier::{Notifier, Recipient};
use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use std::time::Duration;

const DEFAULT_API_BASE: &str = "https://api.twilio.com";

/// Sends reminders as WhatsApp messages via Twilio
///
/// The recipient's phone must be in international format without symbols,
/// e.g. "573001234567"; it is sent as `whatsapp:+573001234567`.
#[derive(Clone, Debug)]
pub struct TwilioWhatsAppNotifier {
    client: reqwest::Client,
    account_sid: String,
    auth_token: SecretString,
    from_whatsapp: String,
    api_base: String,
}

impl TwilioWhatsAppNotifier {
    pub fn new(
        account_sid: impl Into<String>,
        auth_token: impl Into<SecretString>,
        from_whatsapp: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(timeout)
                .user_agent("resale-billing")
                .build()
                .unwrap_or_default(),
            account_sid: account_sid.into(),
            auth_token: auth_token.into(),
            from_whatsapp: from_whatsapp.into(),
            api_base: DEFAULT_API_BASE.to_string(),
        }
    }

    #[must_use]
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    fn build_request(&self, recipient: &Recipient, message: &str) -> Result<reqwest::Request> {
        let Some(phone) = recipient.phone.as_deref().filter(|p| !p.is_empty()) else {
            return Err(BillingError::notification(format!(
                "client {} has no phone number",
                recipient.client_id
            )));
        };

        let url = format!("{}/2010-04-01/Accounts/{}/Messages.json", self.api_base, self.account_sid);
        let to = format!("whatsapp:+{}", phone);

        self.client
            .post(url)
            .basic_auth(&self.account_sid, Some(self.auth_token.expose_secret()))
            .form(&[("To", to.as_str()), ("From", self.from_whatsapp.as_str()), ("Body", message)])
            .build()
            .map_err(|e| BillingError::notification(format!("failed to build Twilio request: {}", e)))
    }
}

#[async_trait]
impl Notifier for TwilioWhatsAppNotifier {
    async fn send_reminder(&self, recipient: &Recipient, message: &str) -> Result<()> {
        let request = self.build_request(recipient, message)?;
        let response = self.client.execute(request).await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(BillingError::notification(format!(
                "Twilio API error, status {}: {}",
                status, body
            )));
        }

        // Twilio answers with the created message resource
        let sid = serde_json::from_str::<serde_json::Value>(&body)
            .ok()
            .and_then(|v| v.get("sid").and_then(|s| s.as_str()).map(str::to_string))
            .unwrap_or_default();
        tracing::info!(client_id = %recipient.client_id, message_sid = %sid, "WhatsApp reminder sent");
        Ok(())
    }

    fn is_healthy(&self) -> bool {
        !self.account_sid.is_empty() && !self.auth_token.expose_secret().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn notifier() -> TwilioWhatsAppNotifier {
        TwilioWhatsAppNotifier::new(
            "AC123",
            "token".to_string(),
            "whatsapp:+14155238886",
            Duration::from_secs(10),
        )
    }

    #[test]
    fn test_request_is_form_post_with_basic_auth() {
        let recipient = Recipient::new("c1", "Ana").phone("573001234567");
        let request = notifier().build_request(&recipient, "Hola").unwrap();

        assert_eq!(request.method(), reqwest::Method::POST);
        assert_eq!(request.url().path(), "/2010-04-01/Accounts/AC123/Messages.json");
        assert!(request.headers().contains_key(reqwest::header::AUTHORIZATION));
        assert_eq!(
            request.headers()[reqwest::header::CONTENT_TYPE],
            "application/x-www-form-urlencoded"
        );

        let body = request.body().and_then(|b| b.as_bytes()).unwrap();
        let body = std::str::from_utf8(body).unwrap();
        assert!(body.contains("To=whatsapp%3A%2B573001234567"));
        assert!(body.contains("From=whatsapp%3A%2B14155238886"));
        assert!(body.contains("Body=Hola"));
    }

    #[test]
    fn test_recipient_without_phone_is_rejected() {
        let err = notifier()
            .build_request(&Recipient::new("c1", "Ana").chat_id("42"), "Hola")
            .unwrap_err();
        assert_eq!(err.code(), "notification_failure");
    }
}
