//! Job registry mapping job names to scheduled jobs
//!
//! The scheduler asks the registry which jobs fire next; `run_now` looks a
//! job up by name.

use crate::app::BillingContext;
use crate::error::{BillingError, Result};
use crate::traits::job::ScheduledJob;
use chrono::{DateTime, FixedOffset};
use std::collections::HashMap;
use std::sync::Arc;

/// Registry of the jobs a scheduler drives
///
/// Thread-safe and cheap to clone; clones share the same jobs.
#[derive(Clone)]
pub struct JobRegistry {
    jobs: Arc<tokio::sync::RwLock<HashMap<String, Arc<dyn ScheduledJob>>>>,
}

impl JobRegistry {
    /// Create a new empty job registry
    pub fn new() -> Self {
        Self {
            jobs: Arc::new(tokio::sync::RwLock::new(HashMap::new())),
        }
    }

    /// Register a job under its own name, replacing any job with that name
    pub async fn register(&self, job: Arc<dyn ScheduledJob>) {
        let mut jobs = self.jobs.write().await;
        jobs.insert(job.name().to_string(), job);
    }

    pub async fn get(&self, name: &str) -> Option<Arc<dyn ScheduledJob>> {
        self.jobs.read().await.get(name).cloned()
    }

    /// Run a job by name
    ///
    /// Returns `NotFound` if no job is registered under `name`.
    pub async fn execute(&self, name: &str, ctx: &BillingContext, day: u8) -> Result<()> {
        let job = self
            .get(name)
            .await
            .ok_or_else(|| BillingError::not_found(format!("no job registered as '{}'", name)))?;

        job.run(ctx, day).await
    }

    /// Check if a job is registered
    pub async fn is_registered(&self, name: &str) -> bool {
        self.jobs.read().await.contains_key(name)
    }

    /// All registered job names, sorted
    pub async fn registered_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.jobs.read().await.keys().cloned().collect();
        names.sort();
        names
    }

    /// Earliest fire time after `after` and every job due at that instant
    ///
    /// Jobs are returned in name order so runs sharing a fire time are
    /// deterministic. `None` when the registry is empty.
    pub async fn next_due(
        &self,
        after: DateTime<FixedOffset>,
    ) -> Option<(DateTime<FixedOffset>, Vec<Arc<dyn ScheduledJob>>)> {
        let jobs = self.jobs.read().await;

        let mut upcoming: Vec<(DateTime<FixedOffset>, Arc<dyn ScheduledJob>)> = jobs
            .values()
            .filter_map(|job| job.schedule().next_after(after).map(|at| (at, job.clone())))
            .collect();
        let earliest = upcoming.iter().map(|(at, _)| *at).min()?;

        upcoming.retain(|(at, _)| *at == earliest);
        upcoming.sort_by(|(_, a), (_, b)| a.name().cmp(b.name()));
        Some((earliest, upcoming.into_iter().map(|(_, job)| job).collect()))
    }
}

impl Default for JobRegistry {
    fn default() -> Self {
        Self::new()
    }
}
