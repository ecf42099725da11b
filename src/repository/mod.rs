//! Repositories: the document store behind a cache-aside read path
//!
//! Each repository owns its cache keys. Reads go through
//! [`CacheAside::read_through`](crate::cache::CacheAside::read_through);
//! writes hit the store first and only then invalidate every key the write
//! could have changed. A crash between the two leaves a stale entry bounded
//! by the TTL, never a phantom write.

mod client;
pub mod keys;
mod payment;
mod price_configuration;

pub use client::{CLIENTS, ClientRepository};
pub use payment::{PAYMENTS, PaymentRepository};
pub use price_configuration::{PRICE_CONFIGURATIONS, PriceConfigurationRepository};

use crate::error::{BillingError, Result};
use crate::store::Filter;
use crate::traits::store::{Document, ID_FIELD};
use serde::de::DeserializeOwned;

/// Filter selecting a document by identifier
pub(crate) fn by_id(id: &str) -> Filter {
    Filter::eq(ID_FIELD, id)
}

/// Decode a stored document into an entity
pub(crate) fn decode<T: DeserializeOwned>(collection: &str, doc: Document) -> Result<T> {
    serde_json::from_value(doc)
        .map_err(|e| BillingError::store(format!("malformed document in '{}': {}", collection, e)))
}

pub(crate) fn decode_all<T: DeserializeOwned>(collection: &str, docs: Vec<Document>) -> Result<Vec<T>> {
    docs.into_iter().map(|doc| decode(collection, doc)).collect()
}

/// Replace a store-level not-found with one naming the entity
pub(crate) fn name_not_found(err: BillingError, what: impl FnOnce() -> String) -> BillingError {
    if err.is_not_found() {
        BillingError::not_found(what())
    } else {
        err
    }
}
