use crate::cache::CacheAside;
use crate::error::{BillingError, Result};
use crate::models::{Client, ClientStatus, ClientUpdate, NewClient};
use crate::repository::{by_id, decode, decode_all, keys, name_not_found};
use crate::store::{Filter, Patch};
use crate::traits::clock::{Clock, SystemClock};
use crate::traits::store::DocumentStore;
use chrono::{DateTime, Utc};
use std::ops::RangeInclusive;
use std::sync::Arc;
use validator::Validate;

/// Collection holding clients
pub const CLIENTS: &str = "clients";

/// Cache-aside access to clients
#[derive(Clone)]
pub struct ClientRepository {
    store: Arc<dyn DocumentStore>,
    cache: CacheAside,
    clock: Arc<dyn Clock>,
}

impl ClientRepository {
    pub fn new(store: Arc<dyn DocumentStore>, cache: CacheAside) -> Self {
        Self {
            store,
            cache,
            clock: Arc::new(SystemClock),
        }
    }

    /// Use `clock` for `created_at`/`updated_at` stamps
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Validate and insert a new client; it starts inactive
    pub async fn create(&self, input: NewClient) -> Result<Client> {
        input.validate()?;

        let mut client = Client::new(input, self.clock.now());
        let id = self.store.insert_one(CLIENTS, serde_json::to_value(&client)?).await?;

        self.cache.invalidate(keys::client_write(&id, &client.user_id)).await;
        tracing::info!(client_id = %id, user_id = %client.user_id, "client created");

        client.id = Some(id);
        Ok(client)
    }

    pub async fn get_by_id(&self, id: &str) -> Result<Client> {
        self.cache
            .read_through(&keys::client(id), || self.load(id))
            .await
    }

    /// All clients owned by `user_id`
    pub async fn list_by_user(&self, user_id: &str) -> Result<Vec<Client>> {
        self.cache
            .read_through(&keys::clients_by_user(user_id), || async {
                let docs = self.store.find_all(CLIENTS, &Filter::eq("user_id", user_id)).await?;
                decode_all(CLIENTS, docs)
            })
            .await
    }

    /// All clients in `status`, across owners
    pub async fn list_by_status(&self, status: ClientStatus) -> Result<Vec<Client>> {
        self.cache
            .read_through(&keys::clients_by_status(status), || async {
                let docs = self.store.find_all(CLIENTS, &Filter::eq("status", status.as_str())).await?;
                decode_all(CLIENTS, docs)
            })
            .await
    }

    /// Apply a partial update and return the stored result
    pub async fn update(&self, id: &str, update: ClientUpdate) -> Result<Client> {
        update.validate()?;
        if update.is_empty() {
            return Err(BillingError::validation("update has no fields to change"));
        }

        let current = self.load(id).await?;
        let matched = self
            .store
            .update_one(CLIENTS, &by_id(id), &update.to_patch(self.clock.now()))
            .await?;
        if matched == 0 {
            return Err(BillingError::not_found(format!("client {}", id)));
        }

        self.invalidate_client(id, &current.user_id).await;
        if let Some(status) = update.status {
            tracing::info!(client_id = %id, from = %current.status, to = %status, "client status changed");
        }

        self.load(id).await
    }

    /// Record a completed payment: stamp `last_payment_date` and activate
    pub async fn mark_paid(&self, id: &str, paid_at: DateTime<Utc>) -> Result<Client> {
        let current = self.load(id).await?;
        let patch = Patch::new()
            .set("last_payment_date", paid_at)
            .set("status", ClientStatus::Active)
            .set("updated_at", self.clock.now());

        let matched = self.store.update_one(CLIENTS, &by_id(id), &patch).await?;
        if matched == 0 {
            return Err(BillingError::not_found(format!("client {}", id)));
        }

        self.invalidate_client(id, &current.user_id).await;
        tracing::info!(client_id = %id, paid_at = %paid_at, "client marked as paid");

        self.load(id).await
    }

    pub async fn delete(&self, id: &str) -> Result<()> {
        let current = self.load(id).await?;
        let deleted = self.store.delete_one(CLIENTS, &by_id(id)).await?;
        if deleted == 0 {
            return Err(BillingError::not_found(format!("client {}", id)));
        }

        self.invalidate_client(id, &current.user_id).await;
        tracing::info!(client_id = %id, "client deleted");
        Ok(())
    }

    /// Set every client due within `days` to inactive in one batch write
    ///
    /// Returns the clients the write matched, read back after the update.
    /// The batch is not transactional: a cancelled call may leave a prefix
    /// of the matching clients updated.
    pub async fn deactivate_due_range(&self, days: RangeInclusive<u8>) -> Result<Vec<Client>> {
        let filter = Filter::any_of("day_to_pay", days.clone());
        let patch = Patch::new()
            .set("status", ClientStatus::Inactive)
            .set("updated_at", self.clock.now());

        let matched = self.store.update_many(CLIENTS, &filter, &patch).await?;

        let affected: Vec<Client> = decode_all(CLIENTS, self.store.find_all(CLIENTS, &filter).await?)?;
        let stale: Vec<String> = affected
            .iter()
            .flat_map(|c| keys::client_write(c.id_str(), &c.user_id))
            .chain(ClientStatus::ALL.into_iter().map(keys::clients_by_status))
            .collect();
        self.cache.invalidate(stale).await;

        tracing::info!(
            from_day = *days.start(),
            to_day = *days.end(),
            matched,
            "deactivated clients in due-day range"
        );
        Ok(affected)
    }

    /// Read straight from the store, bypassing the cache
    async fn load(&self, id: &str) -> Result<Client> {
        let doc = self
            .store
            .find_one(CLIENTS, &by_id(id))
            .await
            .map_err(|e| name_not_found(e, || format!("client {}", id)))?;
        decode(CLIENTS, doc)
    }

    async fn invalidate_client(&self, id: &str, user_id: &str) {
        self.cache.invalidate(keys::client_write(id, user_id)).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::InMemoryCache;
    use crate::store::InMemoryDocumentStore;
    use crate::testing::{FixedClock, TestClient};
    use crate::traits::cache::{Cache, CacheExt};
    use std::time::Duration;

    struct Fixture {
        repo: ClientRepository,
        cache: Arc<InMemoryCache>,
        store: InMemoryDocumentStore,
    }

    fn fixture() -> Fixture {
        let store = InMemoryDocumentStore::new();
        let cache = Arc::new(InMemoryCache::new(100));
        let aside = CacheAside::new(Some(cache.clone() as Arc<dyn Cache>), Duration::from_secs(3600));
        let repo = ClientRepository::new(Arc::new(store.clone()), aside)
            .with_clock(Arc::new(FixedClock::on_day(2024, 5, 13)));
        Fixture { repo, cache, store }
    }

    #[tokio::test]
    async fn test_create_starts_inactive() {
        let f = fixture();
        let client = f.repo.create(TestClient::new().due_on(15).build()).await.unwrap();

        assert!(client.id.is_some());
        assert_eq!(client.status, ClientStatus::Inactive);
        assert!(client.last_payment_date.is_none());
        assert_eq!(f.store.count(CLIENTS).await, 1);
    }

    #[tokio::test]
    async fn test_create_rejects_invalid_input_before_store() {
        let f = fixture();
        let err = f.repo.create(TestClient::new().due_on(0).build()).await.unwrap_err();

        assert!(err.is_validation());
        assert_eq!(f.store.count(CLIENTS).await, 0);
    }

    #[tokio::test]
    async fn test_blank_names_are_rejected_before_store() {
        let f = fixture();
        let err = f.repo.create(TestClient::new().with_name("   ").build()).await.unwrap_err();
        assert!(err.is_validation());
        assert_eq!(f.store.count(CLIENTS).await, 0);

        let client = f.repo.create(TestClient::new().with_name("Ana").build()).await.unwrap();
        let update = ClientUpdate {
            name: Some("\t ".to_string()),
            ..Default::default()
        };
        let err = f.repo.update(client.id_str(), update).await.unwrap_err();
        assert!(err.is_validation());
        assert_eq!(f.repo.get_by_id(client.id_str()).await.unwrap().name, "Ana");
    }

    #[tokio::test]
    async fn test_get_by_id_populates_cache() {
        let f = fixture();
        let client = f.repo.create(TestClient::new().build()).await.unwrap();
        let id = client.id_str().to_string();

        let loaded = f.repo.get_by_id(&id).await.unwrap();
        assert_eq!(loaded, client);

        let cached: Option<Client> = f.cache.get(&keys::client(&id)).await.unwrap();
        assert_eq!(cached, Some(client));
    }

    #[tokio::test]
    async fn test_get_missing_client_is_not_found() {
        let f = fixture();
        let err = f.repo.get_by_id("nope").await.unwrap_err();
        assert!(err.is_not_found());
        assert!(!f.cache.contains_key("client:nope"));
    }

    #[tokio::test]
    async fn test_create_invalidates_owner_list() {
        let f = fixture();
        f.repo.create(TestClient::new().owned_by("u1").build()).await.unwrap();
        assert_eq!(f.repo.list_by_user("u1").await.unwrap().len(), 1);

        f.repo.create(TestClient::new().owned_by("u1").build()).await.unwrap();
        assert_eq!(f.repo.list_by_user("u1").await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_update_invalidates_entity_and_status_lists() {
        let f = fixture();
        let client = f.repo.create(TestClient::new().build()).await.unwrap();
        let id = client.id_str().to_string();

        // warm every cached view of the client
        f.repo.get_by_id(&id).await.unwrap();
        assert_eq!(f.repo.list_by_status(ClientStatus::Inactive).await.unwrap().len(), 1);
        assert!(f.repo.list_by_status(ClientStatus::Active).await.unwrap().is_empty());

        let update = ClientUpdate {
            status: Some(ClientStatus::Active),
            ..Default::default()
        };
        let updated = f.repo.update(&id, update).await.unwrap();

        assert_eq!(updated.status, ClientStatus::Active);
        assert_eq!(f.repo.get_by_id(&id).await.unwrap().status, ClientStatus::Active);
        assert!(f.repo.list_by_status(ClientStatus::Inactive).await.unwrap().is_empty());
        assert_eq!(f.repo.list_by_status(ClientStatus::Active).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_empty_update_is_rejected() {
        let f = fixture();
        let client = f.repo.create(TestClient::new().build()).await.unwrap();
        let err = f.repo.update(client.id_str(), ClientUpdate::default()).await.unwrap_err();
        assert!(err.is_validation());
    }

    #[tokio::test]
    async fn test_mark_paid_activates_and_stamps_date() {
        let f = fixture();
        let client = f.repo.create(TestClient::new().build()).await.unwrap();
        let paid_at = FixedClock::on_day(2024, 5, 10).now();

        let paid = f.repo.mark_paid(client.id_str(), paid_at).await.unwrap();
        assert_eq!(paid.status, ClientStatus::Active);
        assert_eq!(paid.last_payment_date, Some(paid_at));
    }

    #[tokio::test]
    async fn test_delete_then_get_is_not_found() {
        let f = fixture();
        let client = f.repo.create(TestClient::new().owned_by("u1").build()).await.unwrap();
        let id = client.id_str().to_string();
        f.repo.get_by_id(&id).await.unwrap();

        f.repo.delete(&id).await.unwrap();

        assert!(f.repo.get_by_id(&id).await.unwrap_err().is_not_found());
        assert!(f.repo.list_by_user("u1").await.unwrap().is_empty());
        assert!(f.repo.delete(&id).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_deactivate_due_range_only_touches_range() {
        let f = fixture();
        let mut ids = Vec::new();
        for day in [14, 15, 20, 21] {
            let c = f.repo.create(TestClient::new().due_on(day).build()).await.unwrap();
            f.repo.mark_paid(c.id_str(), f.repo.clock.now()).await.unwrap();
            ids.push(c.id_str().to_string());
        }

        let affected = f.repo.deactivate_due_range(15..=20).await.unwrap();

        assert_eq!(affected.len(), 2);
        let statuses: Vec<ClientStatus> = {
            let mut out = Vec::new();
            for id in &ids {
                out.push(f.repo.get_by_id(id).await.unwrap().status);
            }
            out
        };
        assert_eq!(
            statuses,
            vec![ClientStatus::Active, ClientStatus::Inactive, ClientStatus::Inactive, ClientStatus::Active]
        );
    }

    #[tokio::test]
    async fn test_deactivate_refreshes_cached_views() {
        let f = fixture();
        let c = f.repo.create(TestClient::new().due_on(16).build()).await.unwrap();
        f.repo.mark_paid(c.id_str(), f.repo.clock.now()).await.unwrap();

        // cache the active view
        assert!(f.repo.get_by_id(c.id_str()).await.unwrap().is_active());
        assert_eq!(f.repo.list_by_status(ClientStatus::Active).await.unwrap().len(), 1);

        f.repo.deactivate_due_range(15..=20).await.unwrap();

        assert!(!f.repo.get_by_id(c.id_str()).await.unwrap().is_active());
        assert!(f.repo.list_by_status(ClientStatus::Active).await.unwrap().is_empty());
        assert_eq!(f.repo.list_by_status(ClientStatus::Inactive).await.unwrap().len(), 1);
    }
}
