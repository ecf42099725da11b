//! Per-reseller subscription price

use crate::error::Result;
use crate::models::payment::validate_amount;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// The subscription price a reseller charges; at most one per owner
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceConfiguration {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub user_id: String,
    #[serde(with = "rust_decimal::serde::str")]
    pub amount: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PriceConfiguration {
    pub fn new(user_id: impl Into<String>, amount: Decimal, now: DateTime<Utc>) -> Result<Self> {
        validate_amount(amount)?;
        Ok(Self {
            id: None,
            user_id: user_id.into(),
            amount,
            created_at: now,
            updated_at: now,
        })
    }
}
