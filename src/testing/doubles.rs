use crate::error::{BillingError, Result};
use crate::traits::cache::Cache;
use crate::traits::clock::Clock;
use crate::traits::notifier::{Notifier, Recipient};
use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, RwLock};
use std::time::Duration;

/// Cache backend that fails every call
///
/// Counts attempts so tests can check the cache-aside layer still tried.
#[derive(Debug, Clone, Default)]
pub struct FailingCache {
    gets: Arc<AtomicUsize>,
    sets: Arc<AtomicUsize>,
    deletes: Arc<AtomicUsize>,
}

impl FailingCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_attempts(&self) -> usize {
        self.gets.load(Ordering::SeqCst)
    }

    pub fn set_attempts(&self) -> usize {
        self.sets.load(Ordering::SeqCst)
    }

    pub fn delete_attempts(&self) -> usize {
        self.deletes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Cache for FailingCache {
    async fn get_bytes(&self, _key: &str) -> Result<Option<Vec<u8>>> {
        self.gets.fetch_add(1, Ordering::SeqCst);
        Err(BillingError::cache("connection refused"))
    }

    async fn set_bytes(&self, _key: &str, _value: Vec<u8>, _ttl: Option<Duration>) -> Result<()> {
        self.sets.fetch_add(1, Ordering::SeqCst);
        Err(BillingError::cache("connection refused"))
    }

    async fn delete(&self, _key: &str) -> Result<()> {
        self.deletes.fetch_add(1, Ordering::SeqCst);
        Err(BillingError::cache("connection refused"))
    }

    async fn clear(&self) -> Result<()> {
        Err(BillingError::cache("connection refused"))
    }

    fn is_healthy(&self) -> bool {
        false
    }
}

/// A reminder captured by [`RecordingNotifier`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentReminder {
    pub recipient: Recipient,
    pub message: String,
}

/// Notifier that records reminders in memory
///
/// Recipients registered with [`fail_for`](Self::fail_for) get an error
/// instead, so partial-failure batches can be exercised.
#[derive(Debug, Clone, Default)]
pub struct RecordingNotifier {
    sent: Arc<Mutex<Vec<SentReminder>>>,
    failing: Arc<RwLock<HashSet<String>>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every reminder for `client_id` fail
    pub fn fail_for(&self, client_id: impl Into<String>) {
        if let Ok(mut failing) = self.failing.write() {
            failing.insert(client_id.into());
        }
    }

    /// Reminders delivered so far, in order
    pub fn sent(&self) -> Vec<SentReminder> {
        self.sent.lock().map(|s| s.clone()).unwrap_or_default()
    }

    /// Client ids that received a reminder, in order
    pub fn recipients(&self) -> Vec<String> {
        self.sent().into_iter().map(|r| r.recipient.client_id).collect()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send_reminder(&self, recipient: &Recipient, message: &str) -> Result<()> {
        let fails = self
            .failing
            .read()
            .map(|f| f.contains(&recipient.client_id))
            .unwrap_or(false);
        if fails {
            return Err(BillingError::notification(format!(
                "simulated failure for {}",
                recipient.client_id
            )));
        }

        if let Ok(mut sent) = self.sent.lock() {
            sent.push(SentReminder {
                recipient: recipient.clone(),
                message: message.to_string(),
            });
        }
        Ok(())
    }

    fn is_healthy(&self) -> bool {
        true
    }
}

/// Clock pinned to a settable instant
#[derive(Debug, Clone)]
pub struct FixedClock {
    now: Arc<RwLock<DateTime<Utc>>>,
}

impl FixedClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            now: Arc::new(RwLock::new(now)),
        }
    }

    /// Noon UTC on the given date
    ///
    /// # Panics
    ///
    /// Panics if the date does not exist.
    pub fn on_day(year: i32, month: u32, day: u32) -> Self {
        let now = Utc
            .with_ymd_and_hms(year, month, day, 12, 0, 0)
            .single()
            .unwrap_or_else(|| panic!("invalid date {}-{}-{}", year, month, day));
        Self::new(now)
    }

    pub fn set(&self, now: DateTime<Utc>) {
        if let Ok(mut guard) = self.now.write() {
            *guard = now;
        }
    }

    pub fn advance(&self, by: chrono::Duration) {
        if let Ok(mut guard) = self.now.write() {
            *guard += by;
        }
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.now.read().map(|n| *n).unwrap_or_else(|e| *e.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_recording_notifier_records_and_fails_on_demand() {
        let notifier = RecordingNotifier::new();
        notifier.fail_for("c2");

        let ok = Recipient::new("c1", "Ana").phone("573001234567");
        let bad = Recipient::new("c2", "Luis").phone("573009998877");

        notifier.send_reminder(&ok, "hola").await.unwrap();
        assert!(notifier.send_reminder(&bad, "hola").await.is_err());

        assert_eq!(notifier.recipients(), vec!["c1".to_string()]);
        assert_eq!(notifier.sent()[0].message, "hola");
    }

    #[test]
    fn test_fixed_clock_moves_only_when_told() {
        let clock = FixedClock::on_day(2024, 2, 13);
        let start = clock.now();
        clock.advance(chrono::Duration::days(1));
        assert_eq!(clock.now() - start, chrono::Duration::days(1));
    }
}
