//! Detection of generation tasks that stay unfinished for too long.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{TimeDelta, Utc};
use tokio_util::sync::CancellationToken;
use venuecast_core::types::Timestamp;
use venuecast_db::models::generation_task::GenerationTask;

use crate::error::WorkerResult;
use crate::store::{TaskQueue, WatchdogReporter};

// ---------------------------------------------------------------------------
// StuckTaskWatchdog
// ---------------------------------------------------------------------------

/// Periodically hands unfinished tasks older than the maximum generation
/// time to a [`WatchdogReporter`].
pub struct StuckTaskWatchdog {
    tasks: Arc<dyn TaskQueue>,
    reporter: Arc<dyn WatchdogReporter>,
    interval: Duration,
    max_generation: TimeDelta,
}

impl StuckTaskWatchdog {
    pub fn new(
        tasks: Arc<dyn TaskQueue>,
        reporter: Arc<dyn WatchdogReporter>,
        interval: Duration,
        max_generation: TimeDelta,
    ) -> Self {
        Self {
            tasks,
            reporter,
            interval,
            max_generation,
        }
    }

    /// Run the check loop until `cancel` is triggered.
    pub async fn run(&self, cancel: CancellationToken) {
        tracing::info!(
            interval_secs = self.interval.as_secs(),
            max_generation_minutes = self.max_generation.num_minutes(),
            "Stuck task watchdog started"
        );
        let mut interval = tokio::time::interval(self.interval);

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::info!("Stuck task watchdog stopping");
                    break;
                }
                _ = interval.tick() => {
                    match self.check(Utc::now()).await {
                        Ok(0) => tracing::debug!("Watchdog: no stuck tasks"),
                        Ok(stuck) => tracing::info!(stuck, "Watchdog: stuck tasks reported"),
                        Err(e) => tracing::error!(error = %e, "Watchdog: check failed"),
                    }
                }
            }
        }
    }

    /// Report the tasks stuck as of `now`. Returns how many were reported.
    pub async fn check(&self, now: Timestamp) -> WorkerResult<usize> {
        let stuck = self.tasks.stale(now - self.max_generation).await?;
        if !stuck.is_empty() {
            self.reporter.report_stuck(&stuck).await;
        }
        Ok(stuck.len())
    }
}

// ---------------------------------------------------------------------------
// TracingReporter
// ---------------------------------------------------------------------------

/// Reports each stuck task as a warning event.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingReporter;

#[async_trait]
impl WatchdogReporter for TracingReporter {
    async fn report_stuck(&self, tasks: &[GenerationTask]) {
        for task in tasks {
            tracing::warn!(
                task_id = task.id,
                advertisement_id = task.advertisement_id,
                registered_at = %task.registered_at,
                "Playlist generation task is stuck"
            );
        }
    }
}
