//! Document store trait
//!
//! The store is the system of record. Repositories talk to it through this
//! trait with JSON documents, so a MongoDB driver, a SQL JSONB table, or the
//! bundled in-memory store can sit behind the same calls.

use crate::error::Result;
use crate::store::{Filter, Patch};
use async_trait::async_trait;
use serde_json::Value;

/// A stored document. Identifiers live under the `_id` field.
pub type Document = Value;

/// Field name holding a document's identifier
pub const ID_FIELD: &str = "_id";

/// CRUD contract consumed by every repository
///
/// Implementations must be safe for concurrent use; repositories share one
/// long-lived instance across all in-flight requests.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Return every document in `collection` matching `filter`
    async fn find_all(&self, collection: &str, filter: &Filter) -> Result<Vec<Document>>;

    /// Return the first matching document, or `BillingError::NotFound`
    async fn find_one(&self, collection: &str, filter: &Filter) -> Result<Document>;

    /// Insert a document and return the identifier the store assigned
    async fn insert_one(&self, collection: &str, document: Document) -> Result<String>;

    /// Apply `patch` to the first matching document, returning the matched count (0 or 1)
    async fn update_one(&self, collection: &str, filter: &Filter, patch: &Patch) -> Result<u64>;

    /// Apply `patch` to every matching document, returning the matched count
    async fn update_many(&self, collection: &str, filter: &Filter, patch: &Patch) -> Result<u64>;

    /// Delete the first matching document, returning the deleted count (0 or 1)
    async fn delete_one(&self, collection: &str, filter: &Filter) -> Result<u64>;

    /// Check if the store backend is healthy
    fn is_healthy(&self) -> bool {
        true
    }
}

// Shared handles are stores too, so decorators like `DeadlineStore` can wrap
// an `Arc<dyn DocumentStore>`.
#[async_trait]
impl<S: DocumentStore + ?Sized> DocumentStore for std::sync::Arc<S> {
    async fn find_all(&self, collection: &str, filter: &Filter) -> Result<Vec<Document>> {
        (**self).find_all(collection, filter).await
    }

    async fn find_one(&self, collection: &str, filter: &Filter) -> Result<Document> {
        (**self).find_one(collection, filter).await
    }

    async fn insert_one(&self, collection: &str, document: Document) -> Result<String> {
        (**self).insert_one(collection, document).await
    }

    async fn update_one(&self, collection: &str, filter: &Filter, patch: &Patch) -> Result<u64> {
        (**self).update_one(collection, filter, patch).await
    }

    async fn update_many(&self, collection: &str, filter: &Filter, patch: &Patch) -> Result<u64> {
        (**self).update_many(collection, filter, patch).await
    }

    async fn delete_one(&self, collection: &str, filter: &Filter) -> Result<u64> {
        (**self).delete_one(collection, filter).await
    }

    fn is_healthy(&self) -> bool {
        (**self).is_healthy()
    }
}
