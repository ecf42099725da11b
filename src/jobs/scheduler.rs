//! Wall-clock scheduler driving the registered jobs
//!
//! One loop sleeps until the earliest next fire time, runs the jobs due at
//! that instant one after another, and repeats. A failing job is logged and
//! does not stop the loop or the other jobs.

use crate::app::BillingContext;
use crate::error::Result;
use crate::jobs::registry::JobRegistry;
use chrono::{DateTime, Datelike, FixedOffset};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::time::sleep;

/// Runs scheduled jobs until shut down
pub struct Scheduler {
    registry: Arc<JobRegistry>,
    ctx: Arc<BillingContext>,
    shutdown_tx: mpsc::Sender<()>,
}

impl Scheduler {
    /// Create a new scheduler
    ///
    /// Fire times are computed in the context's UTC offset from the
    /// context's clock.
    pub fn new(registry: Arc<JobRegistry>, ctx: Arc<BillingContext>) -> (Self, mpsc::Receiver<()>) {
        let (shutdown_tx, shutdown_rx) = mpsc::channel(1);
        (
            Self {
                registry,
                ctx,
                shutdown_tx,
            },
            shutdown_rx,
        )
    }

    /// Sender that stops the loop when sent to (or dropped with the scheduler)
    pub fn shutdown_handle(&self) -> mpsc::Sender<()> {
        self.shutdown_tx.clone()
    }

    /// Request shutdown of this scheduler
    pub async fn shutdown(&self) {
        let _ = self.shutdown_tx.send(()).await;
    }

    /// Run a job immediately for today's date, outside its schedule
    pub async fn run_now(&self, name: &str) -> Result<()> {
        let day = self.ctx.today();
        tracing::info!(job = %name, day, "running job on demand");
        self.registry.execute(name, &self.ctx, day).await
    }

    /// Start the loop
    ///
    /// This runs until shutdown is requested via the shutdown channel. A job
    /// already running when shutdown arrives is allowed to finish.
    pub async fn start(self, mut shutdown_rx: mpsc::Receiver<()>) {
        let offset = self.ctx.utc_offset();
        let names = self.registry.registered_names().await;
        tracing::info!(
            jobs = ?names,
            utc_offset = %offset,
            "scheduler started"
        );

        // Last fire time handled; never fire the same instant twice even if
        // the clock has not moved past it.
        let mut last_fired: Option<DateTime<FixedOffset>> = None;

        loop {
            let now = self.ctx.clock().now_in(offset);
            let after = match last_fired {
                Some(fired) if fired > now => fired,
                _ => now,
            };

            let Some((fire_at, jobs)) = self.registry.next_due(after).await else {
                tracing::warn!("no jobs registered, waiting for shutdown");
                let _ = shutdown_rx.recv().await;
                break;
            };

            let wait = (fire_at - now).to_std().unwrap_or_default();
            tracing::debug!(
                fire_at = %fire_at,
                wait_secs = wait.as_secs(),
                jobs = jobs.len(),
                "waiting for next run"
            );

            tokio::select! {
                _ = shutdown_rx.recv() => {
                    tracing::info!("shutdown signal received");
                    break;
                }
                _ = sleep(wait) => {}
            }

            // The day the run was scheduled for, not the day we woke up on
            let day = fire_at.day() as u8;
            for job in jobs {
                let started = std::time::Instant::now();
                match job.run(&self.ctx, day).await {
                    Ok(()) => tracing::info!(
                        job = %job.name(),
                        day,
                        elapsed_ms = started.elapsed().as_millis() as u64,
                        "job completed"
                    ),
                    Err(e) => tracing::error!(job = %job.name(), day, error = %e, "job failed"),
                }
            }
            last_fired = Some(fire_at);
        }

        tracing::info!("scheduler stopped");
    }
}

/// Handle to a scheduler running on its own task
pub struct SchedulerHandle {
    shutdown_tx: mpsc::Sender<()>,
    task: tokio::task::JoinHandle<()>,
}

impl SchedulerHandle {
    /// Spawn `scheduler` onto the current runtime
    pub fn spawn(scheduler: Scheduler, shutdown_rx: mpsc::Receiver<()>) -> Self {
        let shutdown_tx = scheduler.shutdown_handle();
        let task = tokio::spawn(async move {
            scheduler.start(shutdown_rx).await;
        });
        Self { shutdown_tx, task }
    }

    /// Stop the loop and wait for any running job to finish
    pub async fn shutdown(self) {
        tracing::info!("shutting down scheduler...");
        let _ = self.shutdown_tx.send(()).await;
        let _ = self.task.await;
    }
}
