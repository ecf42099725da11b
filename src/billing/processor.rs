use crate::error::{BillingError, Result};
use crate::models::Payment;
use crate::repository::{ClientRepository, PaymentRepository};
use rust_decimal::Decimal;

/// Drives a payment through its lifecycle and keeps the client in step
///
/// Completing a payment and marking its client paid are two independent
/// writes. If the second fails the payment stays completed and the error is
/// returned; the client catches up on the next successful payment or a
/// manual update.
#[derive(Clone)]
pub struct PaymentProcessor {
    payments: PaymentRepository,
    clients: ClientRepository,
}

impl PaymentProcessor {
    pub fn new(payments: PaymentRepository, clients: ClientRepository) -> Self {
        Self { payments, clients }
    }

    /// Record a new payment for an existing client
    pub async fn record(&self, client_id: &str, amount: Decimal) -> Result<Payment> {
        self.clients.get_by_id(client_id).await?;
        self.payments.create(client_id, amount).await
    }

    /// Complete a processing payment, then mark its client paid
    pub async fn complete(&self, payment_id: &str) -> Result<Payment> {
        let payment = self.payments.complete(payment_id).await?;

        if let Err(e) = self.clients.mark_paid(&payment.client_id, payment.payment_date).await {
            tracing::error!(
                payment_id = %payment_id,
                client_id = %payment.client_id,
                error = %e,
                "payment completed but client could not be marked as paid"
            );
            return Err(e);
        }

        Ok(payment)
    }

    /// Reject a processing payment; `reason` is required
    pub async fn reject(&self, payment_id: &str, reason: &str) -> Result<Payment> {
        if reason.trim().is_empty() {
            return Err(BillingError::validation("a rejection reason is required"));
        }
        self.payments.reject(payment_id, reason).await
    }

    pub fn payments(&self) -> &PaymentRepository {
        &self.payments
    }

    pub fn clients(&self) -> &ClientRepository {
        &self.clients
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::CacheAside;
    use crate::models::{ClientStatus, PaymentStatus};
    use crate::store::InMemoryDocumentStore;
    use crate::testing::TestClient;
    use std::sync::Arc;

    fn processor() -> PaymentProcessor {
        let store = Arc::new(InMemoryDocumentStore::new());
        PaymentProcessor::new(
            PaymentRepository::new(store.clone(), CacheAside::disabled()),
            ClientRepository::new(store, CacheAside::disabled()),
        )
    }

    #[tokio::test]
    async fn test_record_requires_existing_client() {
        let p = processor();
        let err = p.record("ghost", Decimal::ONE).await.unwrap_err();
        assert!(err.is_not_found());
        assert!(p.payments().list_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_complete_activates_client() {
        let p = processor();
        let client = p.clients().create(TestClient::new().build()).await.unwrap();
        let payment = p.record(client.id_str(), Decimal::new(15_000, 0)).await.unwrap();

        let completed = p.complete(payment.id.as_deref().unwrap()).await.unwrap();

        assert_eq!(completed.status, PaymentStatus::Completed);
        let client = p.clients().get_by_id(client.id_str()).await.unwrap();
        assert_eq!(client.status, ClientStatus::Active);
        assert_eq!(client.last_payment_date, Some(completed.payment_date));
    }

    #[tokio::test]
    async fn test_complete_keeps_payment_when_client_is_gone() {
        let p = processor();
        let client = p.clients().create(TestClient::new().build()).await.unwrap();
        let payment = p.record(client.id_str(), Decimal::ONE).await.unwrap();
        let payment_id = payment.id.unwrap();
        p.clients().delete(client.id_str()).await.unwrap();

        let err = p.complete(&payment_id).await.unwrap_err();

        assert!(err.is_not_found());
        let stored = p.payments().get_by_id(&payment_id).await.unwrap();
        assert_eq!(stored.status, PaymentStatus::Completed);
    }

    #[tokio::test]
    async fn test_reject_requires_reason() {
        let p = processor();
        let client = p.clients().create(TestClient::new().build()).await.unwrap();
        let payment_id = p.record(client.id_str(), Decimal::ONE).await.unwrap().id.unwrap();

        assert!(p.reject(&payment_id, " ").await.unwrap_err().is_validation());

        let rejected = p.reject(&payment_id, "insufficient funds").await.unwrap();
        assert_eq!(rejected.status, PaymentStatus::Rejected);
        assert_eq!(rejected.error, "insufficient funds");

        let client = p.clients().get_by_id(client.id_str()).await.unwrap();
        assert_eq!(client.status, ClientStatus::Inactive);
    }
}
