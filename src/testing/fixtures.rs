//! Test fixtures for generating client input
//!
//! This module provides helpers for creating test data in a consistent way.

use crate::models::NewClient;
use uuid::Uuid;

/// Helper functions for generating fake test data
pub mod fake {
    use super::*;

    /// Generate a fake owner id
    pub fn user_id() -> String {
        Uuid::new_v4().simple().to_string()
    }

    /// Generate a fake name
    pub fn name() -> String {
        format!("Test Client {}", &Uuid::new_v4().simple().to_string()[..8])
    }

    /// Generate a fake Colombian mobile number, digits only
    pub fn phone() -> String {
        format!("57300{:07}", fastrand::u32(0..9_999_999))
    }

    /// Generate a random billing day
    pub fn day_to_pay() -> u8 {
        fastrand::u8(1..=31)
    }
}

/// Builder for client input with generated defaults
#[derive(Debug, Clone)]
pub struct TestClient {
    user_id: Option<String>,
    name: Option<String>,
    phone: Option<String>,
    day_to_pay: Option<u8>,
}

impl Default for TestClient {
    fn default() -> Self {
        Self::new()
    }
}

impl TestClient {
    pub fn new() -> Self {
        Self {
            user_id: None,
            name: None,
            phone: None,
            day_to_pay: None,
        }
    }

    pub fn owned_by(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }

    pub fn due_on(mut self, day: u8) -> Self {
        self.day_to_pay = Some(day);
        self
    }

    /// Build the input, generating any value not set
    pub fn build(self) -> NewClient {
        NewClient::new(
            self.user_id.unwrap_or_else(fake::user_id),
            self.name.unwrap_or_else(fake::name),
            self.phone.unwrap_or_else(fake::phone),
            self.day_to_pay.unwrap_or_else(fake::day_to_pay),
        )
    }
}
