//! Demand-driven regeneration.
//!
//! [`DemandDriver`] drains the generation task queue. Tasks are grouped by
//! advertisement; every (venue, date) the advertisement touches from today
//! on is regenerated in its own transaction. A group's tasks are marked
//! finished only when all of its units succeeded, so failed groups are
//! picked up again by the next pass and surface in the watchdog.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::Notify;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use venuecast_core::types::DbId;
use venuecast_db::models::generation_task::GenerationTask;

use crate::error::WorkerResult;
use crate::generator::PlaylistGenerator;
use crate::pass_guard::PassGuard;
use crate::store::{DemandStore, PersistMode, TaskQueue};

/// Counters of one demand pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PassSummary {
    pub groups: usize,
    pub units_succeeded: usize,
    pub units_failed: usize,
    pub tasks_finished: u64,
}

impl PassSummary {
    fn absorb(&mut self, other: PassSummary) {
        self.groups += other.groups;
        self.units_succeeded += other.units_succeeded;
        self.units_failed += other.units_failed;
        self.tasks_finished += other.tasks_finished;
    }
}

/// Tasks of one advertisement, in registration order.
struct TaskGroup {
    advertisement_id: DbId,
    task_ids: Vec<DbId>,
}

// ---------------------------------------------------------------------------
// DemandDriver
// ---------------------------------------------------------------------------

pub struct DemandDriver {
    generator: Arc<PlaylistGenerator>,
    tasks: Arc<dyn TaskQueue>,
    demand: Arc<dyn DemandStore>,
    guard: PassGuard,
    wake: Notify,
    poll_interval: Duration,
    unit_delay: Duration,
    cancel: CancellationToken,
}

impl DemandDriver {
    pub fn new(
        generator: Arc<PlaylistGenerator>,
        tasks: Arc<dyn TaskQueue>,
        demand: Arc<dyn DemandStore>,
        poll_interval: Duration,
        unit_delay: Duration,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            generator,
            tasks,
            demand,
            guard: PassGuard::new(),
            wake: Notify::new(),
            poll_interval,
            unit_delay,
            cancel,
        }
    }

    /// Ask the run loop for a pass without waiting for the next poll.
    pub fn trigger(&self) {
        self.wake.notify_one();
    }

    /// Poll the task queue until the driver's token is cancelled.
    ///
    /// The pass runs alongside the poll and wake sources, so ticks and
    /// triggers that arrive mid-pass reach the guard and collapse into a
    /// single catch-up pass.
    pub async fn run(&self) {
        tracing::info!(
            poll_interval_secs = self.poll_interval.as_secs(),
            "Demand driver started"
        );
        let mut interval = tokio::time::interval(self.poll_interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        // Only polled while `running` is set.
        let pass = self.pass_with_catch_up();
        tokio::pin!(pass);
        let mut running = false;

        loop {
            let requested = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => {
                    tracing::info!("Demand driver cancelled");
                    break;
                }
                result = &mut pass, if running => {
                    running = false;
                    self.guard.finish();
                    self.log_pass(result.map(Some));
                    false
                }
                _ = interval.tick() => true,
                _ = self.wake.notified() => true,
            };

            if !requested {
                continue;
            }
            if self.guard.try_begin() {
                pass.set(self.pass_with_catch_up());
                running = true;
            } else {
                tracing::debug!("Demand pass in progress, catch-up scheduled");
            }
        }

        // Let an interrupted pass stop at its next unit boundary.
        if running {
            let result = pass.await;
            self.guard.finish();
            self.log_pass(result.map(Some));
        }
    }

    /// Run a pass unless one is already in progress.
    ///
    /// A request made during a running pass returns `Ok(None)` at once; the
    /// running pass then performs exactly one catch-up pass.
    pub async fn request_pass(&self) -> WorkerResult<Option<PassSummary>> {
        if !self.guard.try_begin() {
            tracing::debug!("Demand pass in progress, catch-up scheduled");
            return Ok(None);
        }

        let result = self.pass_with_catch_up().await;
        self.guard.finish();
        result.map(Some)
    }

    async fn pass_with_catch_up(&self) -> WorkerResult<PassSummary> {
        let mut summary = self.run_pass().await?;
        if self.guard.take_catch_up() && !self.cancel.is_cancelled() {
            tracing::info!("Demand arrived during the pass, running catch-up");
            summary.absorb(self.run_pass().await?);
        }
        Ok(summary)
    }

    fn log_pass(&self, result: WorkerResult<Option<PassSummary>>) {
        match result {
            Ok(Some(summary)) if summary.groups > 0 => {
                tracing::info!(
                    groups = summary.groups,
                    units_succeeded = summary.units_succeeded,
                    units_failed = summary.units_failed,
                    tasks_finished = summary.tasks_finished,
                    "Demand pass complete"
                );
            }
            Ok(_) => {}
            Err(e) => tracing::error!(error = %e, "Demand pass failed"),
        }
    }

    /// One pass over all unfinished tasks.
    async fn run_pass(&self) -> WorkerResult<PassSummary> {
        let tasks = self.tasks.unfinished().await?;
        let mut summary = PassSummary::default();
        if tasks.is_empty() {
            return Ok(summary);
        }

        let today = Utc::now().date_naive();
        let mut first_unit = true;

        for group in group_by_advertisement(&tasks) {
            summary.groups += 1;
            let advertisement_id = group.advertisement_id;

            let units = match self.demand.affected_units(advertisement_id, today).await {
                Ok(units) => units,
                Err(e) => {
                    tracing::error!(advertisement_id, error = %e, "Failed to resolve affected playlists");
                    continue;
                }
            };
            tracing::debug!(advertisement_id, units = units.len(), "Regenerating for advertisement");

            let mut group_ok = true;
            for (venue_id, date) in units {
                if !first_unit && !self.pause().await {
                    tracing::info!("Demand pass interrupted");
                    return Ok(summary);
                }
                first_unit = false;

                match self
                    .generator
                    .run_unit(venue_id, date, PersistMode::Replace)
                    .await
                {
                    Ok(_) => summary.units_succeeded += 1,
                    Err(e) => {
                        group_ok = false;
                        summary.units_failed += 1;
                        tracing::error!(
                            advertisement_id,
                            venue_id,
                            %date,
                            error = %e,
                            "Demand unit failed"
                        );
                    }
                }
            }

            if !group_ok {
                continue;
            }
            match self.tasks.mark_finished(&group.task_ids).await {
                Ok(finished) => summary.tasks_finished += finished,
                Err(e) => {
                    tracing::error!(advertisement_id, error = %e, "Failed to mark tasks finished");
                }
            }
        }

        Ok(summary)
    }

    /// Sleep the inter-unit delay. Returns `false` when cancelled.
    async fn pause(&self) -> bool {
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => false,
            _ = tokio::time::sleep(self.unit_delay) => true,
        }
    }
}

/// Group tasks by advertisement, keeping the order of first registration.
fn group_by_advertisement(tasks: &[GenerationTask]) -> Vec<TaskGroup> {
    let mut groups: Vec<TaskGroup> = Vec::new();
    let mut index: HashMap<DbId, usize> = HashMap::new();

    for task in tasks {
        let slot = *index.entry(task.advertisement_id).or_insert_with(|| {
            groups.push(TaskGroup {
                advertisement_id: task.advertisement_id,
                task_ids: Vec::new(),
            });
            groups.len() - 1
        });
        groups[slot].task_ids.push(task.id);
    }

    groups
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;

    fn task(id: DbId, advertisement_id: DbId, minute: u32) -> GenerationTask {
        GenerationTask {
            id,
            advertisement_id,
            registered_at: Utc.with_ymd_and_hms(2026, 3, 1, 10, minute, 0).unwrap(),
            is_finished: false,
            finished_at: None,
        }
    }

    #[test]
    fn groups_follow_first_registration() {
        let tasks = vec![task(1, 20, 0), task(2, 10, 1), task(3, 20, 2), task(4, 30, 3)];
        let groups = group_by_advertisement(&tasks);

        let shape: Vec<(DbId, Vec<DbId>)> = groups
            .into_iter()
            .map(|g| (g.advertisement_id, g.task_ids))
            .collect();
        assert_eq!(shape, vec![(20, vec![1, 3]), (10, vec![2]), (30, vec![4])]);
    }
}
