//! Daily pass that fills in tomorrow's missing playlists.
//!
//! [`EmptyDayDriver`] wakes once a day at the configured UTC time, asks for
//! every active venue that has neither a playlist nor pending demand for the
//! next calendar day, and generates those playlists one venue at a time with
//! a fixed pause between venues.

use std::sync::Arc;
use std::time::Duration;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, TimeDelta, Utc};
use tokio_util::sync::CancellationToken;

use crate::error::WorkerResult;
use crate::generator::PlaylistGenerator;
use crate::store::{PersistMode, VenueLookup};

// ---------------------------------------------------------------------------
// EmptyDayDriver
// ---------------------------------------------------------------------------

pub struct EmptyDayDriver {
    generator: Arc<PlaylistGenerator>,
    venues: Arc<dyn VenueLookup>,
    run_at: NaiveTime,
    unit_delay: Duration,
}

impl EmptyDayDriver {
    pub fn new(
        generator: Arc<PlaylistGenerator>,
        venues: Arc<dyn VenueLookup>,
        run_at: NaiveTime,
        unit_delay: Duration,
    ) -> Self {
        Self {
            generator,
            venues,
            run_at,
            unit_delay,
        }
    }

    /// Run the daily loop until `cancel` is triggered.
    pub async fn run(&self, cancel: CancellationToken) {
        tracing::info!(run_at = %self.run_at, "Empty-day driver started");

        loop {
            let wait = until_next_run(Utc::now().naive_utc(), self.run_at);
            tracing::debug!(wait_secs = wait.as_secs(), "Empty-day driver sleeping");

            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::info!("Empty-day driver cancelled");
                    break;
                }
                _ = tokio::time::sleep(wait) => {
                    let Some(target) = Utc::now().date_naive().succ_opt() else {
                        continue;
                    };
                    match self.run_pass(target, &cancel).await {
                        Ok(generated) => {
                            tracing::info!(%target, generated, "Empty-day pass complete");
                        }
                        Err(e) => {
                            tracing::error!(%target, error = %e, "Empty-day pass aborted");
                        }
                    }
                }
            }
        }
    }

    /// Generate the playlist of every candidate venue for `date`.
    ///
    /// Units run sequentially. The first failing unit aborts the pass; units
    /// before it stay committed. Returns the number of units processed.
    pub async fn run_pass(&self, date: NaiveDate, cancel: &CancellationToken) -> WorkerResult<usize> {
        let venue_ids = self.venues.venues_missing_playlist(date).await?;
        if venue_ids.is_empty() {
            tracing::debug!(%date, "No venues missing a playlist");
            return Ok(0);
        }
        tracing::info!(%date, count = venue_ids.len(), "Empty-day pass started");

        let mut processed = 0;
        for (i, &venue_id) in venue_ids.iter().enumerate() {
            if i > 0 && !self.pause(cancel).await {
                tracing::info!(%date, processed, "Empty-day pass interrupted");
                break;
            }

            if let Err(e) = self
                .generator
                .run_unit(venue_id, date, PersistMode::InPlace)
                .await
            {
                tracing::error!(venue_id, %date, error = %e, "Empty-day unit failed");
                return Err(e);
            }
            processed += 1;
        }

        Ok(processed)
    }

    /// Sleep the inter-unit delay. Returns `false` when cancelled.
    async fn pause(&self, cancel: &CancellationToken) -> bool {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => false,
            _ = tokio::time::sleep(self.unit_delay) => true,
        }
    }
}

/// Time from `now` until the next occurrence of `run_at`, both in UTC.
pub fn until_next_run(now: NaiveDateTime, run_at: NaiveTime) -> Duration {
    let mut next = now.date().and_time(run_at);
    if next <= now {
        next += TimeDelta::days(1);
    }
    (next - now).to_std().unwrap_or(Duration::ZERO)
}
