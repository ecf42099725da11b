//! In-process document store.
//!
//! Backs tests and single-node deployments. Collections are created lazily
//! and documents keep insertion order, which makes `find_all` results stable.

use crate::error::{BillingError, Result};
use crate::store::{Filter, Patch};
use crate::traits::store::{Document, DocumentStore, ID_FIELD};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// In-memory document store
///
/// Wraps data in Arc for cheap cloning; clones share the same collections.
#[derive(Clone, Default)]
pub struct InMemoryDocumentStore {
    collections: Arc<RwLock<HashMap<String, Vec<Document>>>>,
}

impl InMemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of documents in a collection
    pub async fn count(&self, collection: &str) -> usize {
        self.collections
            .read()
            .await
            .get(collection)
            .map_or(0, Vec::len)
    }
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn find_all(&self, collection: &str, filter: &Filter) -> Result<Vec<Document>> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(collection)
            .map(|docs| docs.iter().filter(|d| filter.matches(d)).cloned().collect())
            .unwrap_or_default())
    }

    async fn find_one(&self, collection: &str, filter: &Filter) -> Result<Document> {
        let collections = self.collections.read().await;
        collections
            .get(collection)
            .and_then(|docs| docs.iter().find(|d| filter.matches(d)).cloned())
            .ok_or_else(|| BillingError::not_found(format!("no matching document in '{}'", collection)))
    }

    async fn insert_one(&self, collection: &str, mut document: Document) -> Result<String> {
        let Value::Object(map) = &mut document else {
            return Err(BillingError::store(format!(
                "documents inserted into '{}' must be JSON objects",
                collection
            )));
        };

        let id = uuid::Uuid::new_v4().simple().to_string();
        map.insert(ID_FIELD.to_string(), Value::String(id.clone()));

        let mut collections = self.collections.write().await;
        collections
            .entry(collection.to_string())
            .or_default()
            .push(document);

        Ok(id)
    }

    async fn update_one(&self, collection: &str, filter: &Filter, patch: &Patch) -> Result<u64> {
        let mut collections = self.collections.write().await;
        let Some(doc) = collections
            .get_mut(collection)
            .and_then(|docs| docs.iter_mut().find(|d| filter.matches(d)))
        else {
            return Ok(0);
        };
        patch.apply(doc);
        Ok(1)
    }

    async fn update_many(&self, collection: &str, filter: &Filter, patch: &Patch) -> Result<u64> {
        let mut collections = self.collections.write().await;
        let mut matched = 0;
        if let Some(docs) = collections.get_mut(collection) {
            for doc in docs.iter_mut().filter(|d| filter.matches(d)) {
                patch.apply(doc);
                matched += 1;
            }
        }
        Ok(matched)
    }

    async fn delete_one(&self, collection: &str, filter: &Filter) -> Result<u64> {
        let mut collections = self.collections.write().await;
        let Some(docs) = collections.get_mut(collection) else {
            return Ok(0);
        };
        match docs.iter().position(|d| filter.matches(d)) {
            Some(index) => {
                docs.remove(index);
                Ok(1)
            }
            None => Ok(0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_insert_assigns_id() {
        let store = InMemoryDocumentStore::new();
        let id = store.insert_one("clients", json!({"name": "Ana"})).await.unwrap();
        assert!(!id.is_empty());

        let doc = store
            .find_one("clients", &Filter::eq(ID_FIELD, id.clone()))
            .await
            .unwrap();
        assert_eq!(doc["name"], "Ana");
        assert_eq!(doc[ID_FIELD], id.as_str());
    }

    #[tokio::test]
    async fn test_insert_rejects_non_objects() {
        let store = InMemoryDocumentStore::new();
        let err = store.insert_one("clients", json!([1, 2])).await.unwrap_err();
        assert_eq!(err.code(), "store_error");
    }

    #[tokio::test]
    async fn test_find_one_not_found() {
        let store = InMemoryDocumentStore::new();
        let err = store.find_one("clients", &Filter::all()).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_update_many_counts_matches() {
        let store = InMemoryDocumentStore::new();
        for day in [10, 15, 18, 28] {
            store
                .insert_one("clients", json!({"day_to_pay": day, "status": "active"}))
                .await
                .unwrap();
        }

        let matched = store
            .update_many(
                "clients",
                &Filter::any_of("day_to_pay", 15..=20),
                &Patch::new().set("status", "inactive"),
            )
            .await
            .unwrap();
        assert_eq!(matched, 2);

        let inactive = store
            .find_all("clients", &Filter::eq("status", "inactive"))
            .await
            .unwrap();
        assert_eq!(inactive.len(), 2);
    }

    #[tokio::test]
    async fn test_update_one_and_delete_one() {
        let store = InMemoryDocumentStore::new();
        let id = store.insert_one("payments", json!({"status": "processing"})).await.unwrap();
        let by_id = Filter::eq(ID_FIELD, id);

        let matched = store
            .update_one("payments", &by_id, &Patch::new().set("status", "completed"))
            .await
            .unwrap();
        assert_eq!(matched, 1);
        assert_eq!(store.find_one("payments", &by_id).await.unwrap()["status"], "completed");

        assert_eq!(store.delete_one("payments", &by_id).await.unwrap(), 1);
        assert_eq!(store.delete_one("payments", &by_id).await.unwrap(), 0);
        assert_eq!(store.count("payments").await, 0);
    }
}
