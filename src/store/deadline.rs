//! Per-call deadline for document store operations.

use crate::error::{BillingError, Result};
use crate::store::{Filter, Patch};
use crate::traits::store::{Document, DocumentStore};
use async_trait::async_trait;
use std::future::Future;
use std::time::Duration;

/// Default deadline applied to each store call
pub const DEFAULT_STORE_TIMEOUT: Duration = Duration::from_secs(10);

/// Run `operation`, failing with `BillingError::Timeout` once `limit` elapses
///
/// The in-flight operation is dropped on timeout. Nothing is retried and
/// nothing already written is rolled back.
pub async fn within_deadline<T, Fut>(limit: Duration, operation: Fut) -> Result<T>
where
    Fut: Future<Output = Result<T>>,
{
    match tokio::time::timeout(limit, operation).await {
        Ok(result) => result,
        Err(_elapsed) => Err(BillingError::Timeout(limit)),
    }
}

/// Decorator bounding every call on the wrapped store by a fixed deadline
///
/// # Example
///
/// ```rust,ignore
/// let store = DeadlineStore::new(InMemoryDocumentStore::new(), Duration::from_secs(10));
/// ```
#[derive(Clone)]
pub struct DeadlineStore<S> {
    inner: S,
    timeout: Duration,
}

impl<S: DocumentStore> DeadlineStore<S> {
    pub fn new(inner: S, timeout: Duration) -> Self {
        Self { inner, timeout }
    }

    pub fn with_default_timeout(inner: S) -> Self {
        Self::new(inner, DEFAULT_STORE_TIMEOUT)
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }
}

#[async_trait]
impl<S: DocumentStore> DocumentStore for DeadlineStore<S> {
    async fn find_all(&self, collection: &str, filter: &Filter) -> Result<Vec<Document>> {
        within_deadline(self.timeout, self.inner.find_all(collection, filter)).await
    }

    async fn find_one(&self, collection: &str, filter: &Filter) -> Result<Document> {
        within_deadline(self.timeout, self.inner.find_one(collection, filter)).await
    }

    async fn insert_one(&self, collection: &str, document: Document) -> Result<String> {
        within_deadline(self.timeout, self.inner.insert_one(collection, document)).await
    }

    async fn update_one(&self, collection: &str, filter: &Filter, patch: &Patch) -> Result<u64> {
        within_deadline(self.timeout, self.inner.update_one(collection, filter, patch)).await
    }

    async fn update_many(&self, collection: &str, filter: &Filter, patch: &Patch) -> Result<u64> {
        within_deadline(self.timeout, self.inner.update_many(collection, filter, patch)).await
    }

    async fn delete_one(&self, collection: &str, filter: &Filter) -> Result<u64> {
        within_deadline(self.timeout, self.inner.delete_one(collection, filter)).await
    }

    fn is_healthy(&self) -> bool {
        self.inner.is_healthy()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryDocumentStore;
    use serde_json::json;

    struct SlowStore;

    #[async_trait]
    impl DocumentStore for SlowStore {
        async fn find_all(&self, _collection: &str, _filter: &Filter) -> Result<Vec<Document>> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(Vec::new())
        }

        async fn find_one(&self, collection: &str, _filter: &Filter) -> Result<Document> {
            Err(BillingError::not_found(collection))
        }

        async fn insert_one(&self, _collection: &str, _document: Document) -> Result<String> {
            Ok("id".to_string())
        }

        async fn update_one(&self, _c: &str, _f: &Filter, _p: &Patch) -> Result<u64> {
            Ok(0)
        }

        async fn update_many(&self, _c: &str, _f: &Filter, _p: &Patch) -> Result<u64> {
            Ok(0)
        }

        async fn delete_one(&self, _c: &str, _f: &Filter) -> Result<u64> {
            Ok(0)
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_call_times_out() {
        let store = DeadlineStore::new(SlowStore, Duration::from_millis(50));
        let err = store.find_all("clients", &Filter::all()).await.unwrap_err();
        assert!(matches!(err, BillingError::Timeout(d) if d == Duration::from_millis(50)));
    }

    #[tokio::test]
    async fn test_fast_call_passes_through() {
        let store = DeadlineStore::with_default_timeout(InMemoryDocumentStore::new());
        store.insert_one("clients", json!({"name": "Ana"})).await.unwrap();
        let docs = store.find_all("clients", &Filter::all()).await.unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(store.timeout(), DEFAULT_STORE_TIMEOUT);
    }
}
