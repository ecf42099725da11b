//! Payment entity and its status state machine

use crate::error::{BillingError, Result};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle state of a payment
///
/// `Processing` is the only non-terminal state. Once a payment is completed
/// or rejected it never moves again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Processing,
    Completed,
    Rejected,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Processing => "processing",
            Self::Completed => "completed",
            Self::Rejected => "rejected",
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Processing)
    }

    /// Whether `next` is reachable from `self` in one step
    pub fn can_transition_to(&self, next: PaymentStatus) -> bool {
        matches!(
            (self, next),
            (Self::Processing, Self::Completed) | (Self::Processing, Self::Rejected)
        )
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single payment made by a client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    /// Assigned by the store on insert
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(with = "rust_decimal::serde::str")]
    pub amount: Decimal,
    pub payment_date: DateTime<Utc>,
    pub client_id: String,
    pub status: PaymentStatus,
    /// Rejection reason; empty unless `status` is `Rejected`
    #[serde(default)]
    pub error: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Payment {
    /// Create a payment in `Processing`, dated `now`
    pub fn new(client_id: impl Into<String>, amount: Decimal, now: DateTime<Utc>) -> Self {
        Self {
            id: None,
            amount,
            payment_date: now,
            client_id: client_id.into(),
            status: PaymentStatus::Processing,
            error: String::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Check that moving to `next` is allowed from the current status
    pub fn validate_transition(&self, next: PaymentStatus) -> Result<()> {
        if self.status.can_transition_to(next) {
            Ok(())
        } else {
            Err(BillingError::InvalidTransition {
                from: self.status.to_string(),
                to: next.to_string(),
            })
        }
    }

    /// Move to `next`, recording `error_message` when rejecting
    ///
    /// The message is discarded for any other target so that `error` is
    /// non-empty exactly when the payment is rejected. A rejection must carry
    /// a reason.
    pub fn set_status(&mut self, next: PaymentStatus, error_message: &str, now: DateTime<Utc>) -> Result<()> {
        self.validate_transition(next)?;

        let error = match next {
            PaymentStatus::Rejected => {
                let reason = error_message.trim();
                if reason.is_empty() {
                    return Err(BillingError::validation("a rejected payment needs a reason"));
                }
                reason.to_string()
            }
            _ => String::new(),
        };

        self.status = next;
        self.error = error;
        self.updated_at = now;
        Ok(())
    }

    pub fn is_completed(&self) -> bool {
        self.status == PaymentStatus::Completed
    }
}

/// Reject zero and negative amounts
pub fn validate_amount(amount: Decimal) -> Result<()> {
    if amount <= Decimal::ZERO {
        return Err(BillingError::validation(format!("amount must be positive, got {}", amount)));
    }
    Ok(())
}
