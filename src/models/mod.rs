//! Domain entities as they are stored in the document store

mod client;
mod payment;
mod price_configuration;

pub use client::{Client, ClientStatus, ClientUpdate, NewClient};
pub use payment::{Payment, PaymentStatus, validate_amount};
pub use price_configuration::PriceConfiguration;
