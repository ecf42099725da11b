//! Client entity and its inputs

use crate::store::Patch;
use crate::validation::{validate_name, validate_phone};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use validator::Validate;

/// Whether a client's subscription is currently paid up
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClientStatus {
    Active,
    Inactive,
}

impl ClientStatus {
    pub const ALL: [ClientStatus; 2] = [ClientStatus::Active, ClientStatus::Inactive];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Inactive => "inactive",
        }
    }
}

impl fmt::Display for ClientStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A subscriber owned by a reseller (`user_id`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Client {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub user_id: String,
    pub name: String,
    #[serde(rename = "cell_phone")]
    pub phone: String,
    /// Day of the month the subscription is due, 1-31
    pub day_to_pay: u8,
    pub status: ClientStatus,
    /// `None` until the first completed payment
    #[serde(default)]
    pub last_payment_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Client {
    /// A new client starts inactive and has never paid
    pub fn new(input: NewClient, now: DateTime<Utc>) -> Self {
        Self {
            id: None,
            user_id: input.user_id,
            name: input.name.trim().to_string(),
            phone: input.phone,
            day_to_pay: input.day_to_pay,
            status: ClientStatus::Inactive,
            last_payment_date: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == ClientStatus::Active
    }

    /// Identifier, or an empty string for an unsaved client
    pub fn id_str(&self) -> &str {
        self.id.as_deref().unwrap_or_default()
    }
}

/// Input for creating a client
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct NewClient {
    #[validate(length(min = 1, message = "owner is required"))]
    pub user_id: String,
    #[validate(custom(function = "validate_name"))]
    pub name: String,
    #[validate(custom(function = "validate_phone"))]
    pub phone: String,
    #[validate(range(min = 1, max = 31))]
    pub day_to_pay: u8,
}

impl NewClient {
    pub fn new(user_id: impl Into<String>, name: impl Into<String>, phone: impl Into<String>, day_to_pay: u8) -> Self {
        Self {
            user_id: user_id.into(),
            name: name.into(),
            phone: phone.into(),
            day_to_pay,
        }
    }
}

/// Partial update of a client; `None` fields are left unchanged
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct ClientUpdate {
    #[validate(custom(function = "validate_name"))]
    pub name: Option<String>,
    #[validate(custom(function = "validate_phone"))]
    pub phone: Option<String>,
    #[validate(range(min = 1, max = 31))]
    pub day_to_pay: Option<u8>,
    pub status: Option<ClientStatus>,
}

impl ClientUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.phone.is_none() && self.day_to_pay.is_none() && self.status.is_none()
    }

    /// Translate into a store patch, stamping `updated_at`
    pub fn to_patch(&self, now: DateTime<Utc>) -> Patch {
        let mut patch = Patch::new();
        if let Some(name) = &self.name {
            patch = patch.set("name", name.trim());
        }
        if let Some(phone) = &self.phone {
            patch = patch.set("cell_phone", phone);
        }
        if let Some(day) = self.day_to_pay {
            patch = patch.set("day_to_pay", day);
        }
        if let Some(status) = self.status {
            patch = patch.set("status", status);
        }
        patch.set("updated_at", now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_new_client_is_inactive_and_unpaid() {
        let client = Client::new(NewClient::new("u1", " Ana ", "573001234567", 15), now());
        assert_eq!(client.status, ClientStatus::Inactive);
        assert!(client.last_payment_date.is_none());
        assert_eq!(client.name, "Ana");
        assert_eq!(client.created_at, client.updated_at);
    }

    #[test]
    fn test_new_client_validation() {
        assert!(NewClient::new("u1", "Ana", "573001234567", 15).validate().is_ok());
        assert!(NewClient::new("u1", "Ana", "573001234567", 0).validate().is_err());
        assert!(NewClient::new("u1", "Ana", "573001234567", 32).validate().is_err());
        assert!(NewClient::new("u1", "", "573001234567", 10).validate().is_err());
        assert!(NewClient::new("u1", "   ", "573001234567", 10).validate().is_err());
        assert!(NewClient::new("u1", "Ana", "not a phone", 10).validate().is_err());
        assert!(NewClient::new("", "Ana", "573001234567", 10).validate().is_err());
    }

    #[test]
    fn test_update_validation_skips_absent_fields() {
        assert!(ClientUpdate::default().validate().is_ok());

        let bad = ClientUpdate {
            day_to_pay: Some(40),
            ..Default::default()
        };
        assert!(bad.validate().is_err());
    }

    #[test]
    fn test_update_rejects_blank_name() {
        let blank = ClientUpdate {
            name: Some("  ".into()),
            ..Default::default()
        };
        assert!(blank.validate().is_err());

        let padded = ClientUpdate {
            name: Some(" Ana ".into()),
            ..Default::default()
        };
        assert!(padded.validate().is_ok());
        assert_eq!(padded.to_patch(now()).fields()["name"], "Ana");
    }

    #[test]
    fn test_update_patch_uses_stored_field_names() {
        let update = ClientUpdate {
            phone: Some("573009998877".into()),
            status: Some(ClientStatus::Active),
            ..Default::default()
        };
        let patch = update.to_patch(now());

        assert_eq!(patch.fields()["cell_phone"], "573009998877");
        assert_eq!(patch.fields()["status"], "active");
        assert!(patch.fields().contains_key("updated_at"));
        assert!(!patch.fields().contains_key("name"));
    }

    #[test]
    fn test_stored_shape() {
        let mut client = Client::new(NewClient::new("u1", "Ana", "573001234567", 15), now());
        client.id = Some("c1".into());
        let doc = serde_json::to_value(&client).unwrap();

        assert_eq!(doc["_id"], "c1");
        assert_eq!(doc["cell_phone"], "573001234567");
        assert_eq!(doc["status"], "inactive");
        assert_eq!(doc["day_to_pay"], 15);
    }
}
