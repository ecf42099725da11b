//! Custom validators for client input
//!
//! These validators extend the `validator` crate with the rules the
//! repositories enforce before any store call.

use std::borrow::Cow;
use validator::ValidationError;

/// Validates that a string is a phone number in international format
///
/// Spaces, dashes and parentheses are ignored. What remains must be 7 to 15
/// digits, optionally preceded by `+`. Numbers are stored without a country
/// prefix symbol, e.g. `573001234567`.
///
/// # Example
///
/// ```rust,no_run
/// use resale_billing::validation::validate_phone;
/// use validator::Validate;
///
/// #[derive(Validate)]
/// struct Request {
///     #[validate(custom(function = "validate_phone"))]
///     phone: String,
/// }
/// ```
pub fn validate_phone(phone: &str) -> Result<(), ValidationError> {
    let cleaned: String = phone
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '-' && *c != '(' && *c != ')')
        .collect();
    let digits = cleaned.strip_prefix('+').unwrap_or(&cleaned);

    if (7..=15).contains(&digits.len()) && digits.chars().all(|c| c.is_ascii_digit()) {
        return Ok(());
    }

    let mut err = ValidationError::new("phone");
    err.message = Some(Cow::Borrowed(
        "must be a phone number with 7 to 15 digits, optionally prefixed with '+'",
    ));
    Err(err)
}

/// Validates a display name: not blank once trimmed, at most 100 characters
pub fn validate_name(name: &str) -> Result<(), ValidationError> {
    let trimmed = name.trim();
    if !trimmed.is_empty() && trimmed.chars().count() <= 100 {
        return Ok(());
    }

    let mut err = ValidationError::new("name");
    err.message = Some(Cow::Borrowed("must not be blank and at most 100 characters"));
    Err(err)
}

/// Validates a billing day of the month
pub fn validate_day_of_month(day: u8) -> Result<(), ValidationError> {
    if (1..=31).contains(&day) {
        return Ok(());
    }

    let mut err = ValidationError::new("day_of_month");
    err.message = Some(Cow::Borrowed("must be between 1 and 31"));
    Err(err)
}
