use crate::cache::CacheAside;
use crate::error::{BillingError, Result};
use crate::models::{Payment, PaymentStatus, validate_amount};
use crate::repository::{by_id, decode, decode_all, keys, name_not_found};
use crate::store::{Filter, Patch};
use crate::traits::clock::{Clock, SystemClock};
use crate::traits::store::DocumentStore;
use rust_decimal::Decimal;
use std::sync::Arc;

/// Collection holding payments
pub const PAYMENTS: &str = "payments";

/// Cache-aside access to payments
///
/// Status changes go through [`Payment::set_status`] and are written with a
/// conditional update on the current status, so two racing transitions on
/// the same payment cannot both succeed.
#[derive(Clone)]
pub struct PaymentRepository {
    store: Arc<dyn DocumentStore>,
    cache: CacheAside,
    clock: Arc<dyn Clock>,
}

impl PaymentRepository {
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

    /// Insert a new payment in `processing`
    pub async fn create(&self, client_id: &str, amount: Decimal) -> Result<Payment> {
        validate_amount(amount)?;
        if client_id.trim().is_empty() {
            return Err(BillingError::validation("payment needs a client id"));
        }

        let mut payment = Payment::new(client_id, amount, self.clock.now());
        let id = self.store.insert_one(PAYMENTS, serde_json::to_value(&payment)?).await?;

        self.cache.invalidate(keys::payment_write(&id, client_id)).await;
        tracing::info!(payment_id = %id, client_id = %client_id, amount = %amount, "payment recorded");

        payment.id = Some(id);
        Ok(payment)
    }

    pub async fn get_by_id(&self, id: &str) -> Result<Payment> {
        self.cache
            .read_through(&keys::payment(id), || self.load(id))
            .await
    }

    pub async fn list_by_client(&self, client_id: &str) -> Result<Vec<Payment>> {
        self.cache
            .read_through(&keys::payments_by_client(client_id), || async {
                let docs = self.store.find_all(PAYMENTS, &Filter::eq("client_id", client_id)).await?;
                decode_all(PAYMENTS, docs)
            })
            .await
    }

    pub async fn list_all(&self) -> Result<Vec<Payment>> {
        self.cache
            .read_through(&keys::payments_all(), || async {
                let docs = self.store.find_all(PAYMENTS, &Filter::all()).await?;
                decode_all(PAYMENTS, docs)
            })
            .await
    }

    /// Move a processing payment to `completed`
    pub async fn complete(&self, id: &str) -> Result<Payment> {
        self.transition(id, PaymentStatus::Completed, "").await
    }

    /// Move a processing payment to `rejected`, recording `reason`
    pub async fn reject(&self, id: &str, reason: &str) -> Result<Payment> {
        self.transition(id, PaymentStatus::Rejected, reason).await
    }

    async fn transition(&self, id: &str, next: PaymentStatus, reason: &str) -> Result<Payment> {
        let mut payment = self.load(id).await?;
        let from = payment.status;
        payment.set_status(next, reason, self.clock.now())?;

        let patch = Patch::new()
            .set("status", payment.status)
            .set("error", &payment.error)
            .set("updated_at", payment.updated_at);
        let filter = by_id(id).and(Filter::eq("status", from.as_str()));

        if self.store.update_one(PAYMENTS, &filter, &patch).await? == 0 {
            // Lost a race with another transition; report against what is stored now
            let current = self.load(id).await?;
            return Err(BillingError::InvalidTransition {
                from: current.status.to_string(),
                to: next.to_string(),
            });
        }

        self.cache.invalidate(keys::payment_write(id, &payment.client_id)).await;
        tracing::info!(payment_id = %id, from = %from, to = %next, "payment status changed");

        Ok(payment)
    }

    /// Read straight from the store, bypassing the cache
    async fn load(&self, id: &str) -> Result<Payment> {
        let doc = self
            .store
            .find_one(PAYMENTS, &by_id(id))
            .await
            .map_err(|e| name_not_found(e, || format!("payment {}", id)))?;
        decode(PAYMENTS, doc)
    }
}
