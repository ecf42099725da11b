//! Input validation support
//!
//! Entity inputs derive `validator::Validate`; the custom rules here cover
//! what the built-in validators do not.
//!
//! # Example
//!
//! ```rust
//! use resale_billing::models::NewClient;
//! use validator::Validate;
//!
//! let input = NewClient::new("owner-1", "Ana", "+57 300 123 4567", 15);
//! assert!(input.validate().is_ok());
//! ```

mod validators;

pub use validators::{validate_day_of_month, validate_name, validate_phone};
pub use validator;
