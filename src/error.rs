use std::collections::HashMap;

/// The main error type for the billing backend
///
/// Cache failures are represented here so that cache backends can report
/// them, but the cache-aside layer absorbs them: callers of the repositories
/// only ever see store, validation, and state-machine errors.
#[derive(Debug, thiserror::Error)]
pub enum BillingError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Invalid state transition: cannot move payment from {from} to {to}")]
    InvalidTransition { from: String, to: String },

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Cache error: {0}")]
    Cache(String),

    #[error("Store error: {0}")]
    Store(String),

    #[error("Deadline exceeded after {0:?}")]
    Timeout(std::time::Duration),

    #[error("Notification failed: {0}")]
    Notification(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl BillingError {
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn cache(msg: impl Into<String>) -> Self {
        Self::Cache(msg.into())
    }

    pub fn store(msg: impl Into<String>) -> Self {
        Self::Store(msg.into())
    }

    pub fn notification(msg: impl Into<String>) -> Self {
        Self::Notification(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    pub fn is_invalid_transition(&self) -> bool {
        matches!(self, Self::InvalidTransition { .. })
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Stable machine-readable code for logs and API layers
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "not_found",
            Self::Validation(_) => "validation_error",
            Self::InvalidTransition { .. } => "invalid_transition",
            Self::Conflict(_) => "conflict",
            Self::Cache(_) => "cache_error",
            Self::Store(_) => "store_error",
            Self::Timeout(_) => "timeout",
            Self::Notification(_) => "notification_failure",
            Self::Config(_) => "config_error",
            Self::Internal(_) => "internal_error",
        }
    }
}

/// Result type alias for billing operations
pub type Result<T> = std::result::Result<T, BillingError>;

// Common error type conversions

impl From<serde_json::Error> for BillingError {
    fn from(err: serde_json::Error) -> Self {
        BillingError::Internal(format!("JSON serialization error: {}", err))
    }
}

impl From<reqwest::Error> for BillingError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            BillingError::Notification(format!("Request timed out: {}", err))
        } else if err.is_connect() {
            BillingError::Notification(format!("Connection error: {}", err))
        } else if let Some(status) = err.status() {
            BillingError::Notification(format!("Upstream returned {}: {}", status, err))
        } else {
            BillingError::Notification(format!("Request error: {}", err))
        }
    }
}

impl From<validator::ValidationErrors> for BillingError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut fields: HashMap<String, Vec<String>> = HashMap::new();
        for (field, errs) in errors.field_errors() {
            let messages = errs
                .iter()
                .map(|e| {
                    e.message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| e.code.to_string())
                })
                .collect();
            fields.insert(field.to_string(), messages);
        }

        let mut parts: Vec<String> = fields
            .into_iter()
            .map(|(field, messages)| format!("{}: {}", field, messages.join(", ")))
            .collect();
        parts.sort();

        BillingError::Validation(parts.join("; "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[derive(Validate)]
    struct Sample {
        #[validate(range(min = 1, max = 31))]
        day: u8,
    }

    #[test]
    fn test_validation_errors_name_the_field() {
        let err: BillingError = Sample { day: 0 }.validate().unwrap_err().into();
        assert!(err.is_validation());
        assert!(err.to_string().contains("day"));
    }

    #[test]
    fn test_invalid_transition_message() {
        let err = BillingError::InvalidTransition {
            from: "completed".to_string(),
            to: "rejected".to_string(),
        };
        assert!(err.is_invalid_transition());
        assert_eq!(err.code(), "invalid_transition");
        assert!(err.to_string().contains("completed"));
    }

    #[test]
    fn test_serde_error_is_internal() {
        let err: BillingError = serde_json::from_str::<u32>("nope").unwrap_err().into();
        assert_eq!(err.code(), "internal_error");
    }
}
