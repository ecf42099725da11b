use crate::cache::CacheAside;
use crate::error::{BillingError, Result};
use crate::models::{PriceConfiguration, validate_amount};
use crate::repository::{decode, keys, name_not_found};
use crate::store::{Filter, Patch};
use crate::traits::clock::{Clock, SystemClock};
use crate::traits::store::DocumentStore;
use rust_decimal::Decimal;
use std::sync::Arc;

/// Collection holding price configurations
pub const PRICE_CONFIGURATIONS: &str = "price_configurations";

/// Cache-aside access to the per-owner subscription price
///
/// Configurations are addressed by owner, not by document id: an owner has
/// at most one.
#[derive(Clone)]
pub struct PriceConfigurationRepository {
    store: Arc<dyn DocumentStore>,
    cache: CacheAside,
    clock: Arc<dyn Clock>,
}

impl PriceConfigurationRepository {
    pub fn new(store: Arc<dyn DocumentStore>, cache: CacheAside) -> Self {
        Self {
            store,
            cache,
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Create the owner's configuration; fails with `Conflict` if one exists
    pub async fn create(&self, user_id: &str, amount: Decimal) -> Result<PriceConfiguration> {
        let mut config = PriceConfiguration::new(user_id, amount, self.clock.now())?;

        let existing = self.store.find_all(PRICE_CONFIGURATIONS, &by_owner(user_id)).await?;
        if !existing.is_empty() {
            return Err(BillingError::conflict(format!(
                "price configuration already exists for user {}",
                user_id
            )));
        }

        let id = self
            .store
            .insert_one(PRICE_CONFIGURATIONS, serde_json::to_value(&config)?)
            .await?;
        self.cache.invalidate([keys::price_config(user_id)]).await;
        tracing::info!(user_id = %user_id, amount = %amount, "price configuration created");

        config.id = Some(id);
        Ok(config)
    }

    pub async fn get_by_user(&self, user_id: &str) -> Result<PriceConfiguration> {
        self.cache
            .read_through(&keys::price_config(user_id), || self.load(user_id))
            .await
    }

    /// Change the owner's price
    pub async fn update(&self, user_id: &str, amount: Decimal) -> Result<PriceConfiguration> {
        validate_amount(amount)?;

        let patch = Patch::new().set("amount", amount).set("updated_at", self.clock.now());
        if self.store.update_one(PRICE_CONFIGURATIONS, &by_owner(user_id), &patch).await? == 0 {
            return Err(not_found(user_id));
        }

        self.cache.invalidate([keys::price_config(user_id)]).await;
        tracing::info!(user_id = %user_id, amount = %amount, "price configuration updated");

        self.load(user_id).await
    }

    pub async fn delete(&self, user_id: &str) -> Result<()> {
        if self.store.delete_one(PRICE_CONFIGURATIONS, &by_owner(user_id)).await? == 0 {
            return Err(not_found(user_id));
        }

        self.cache.invalidate([keys::price_config(user_id)]).await;
        tracing::info!(user_id = %user_id, "price configuration deleted");
        Ok(())
    }

    async fn load(&self, user_id: &str) -> Result<PriceConfiguration> {
        let doc = self
            .store
            .find_one(PRICE_CONFIGURATIONS, &by_owner(user_id))
            .await
            .map_err(|e| name_not_found(e, || format!("price configuration for user {}", user_id)))?;
        decode(PRICE_CONFIGURATIONS, doc)
    }
}

fn by_owner(user_id: &str) -> Filter {
    Filter::eq("user_id", user_id)
}

fn not_found(user_id: &str) -> BillingError {
    BillingError::not_found(format!("price configuration for user {}", user_id))
}
