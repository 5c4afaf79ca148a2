//! Collaborator interfaces consumed by generation and the drivers.
//!
//! [`crate::pg_store::PgStore`] implements all of them against PostgreSQL;
//! tests substitute in-memory fakes.

use async_trait::async_trait;
use chrono::NaiveDate;
use venuecast_core::playlist::Playlist;
use venuecast_core::track::{AdvertDemand, MusicTrack};
use venuecast_core::types::{DbId, Timestamp};
use venuecast_core::venue::VenueConfig;
use venuecast_db::models::generation_task::GenerationTask;

use crate::error::WorkerResult;

/// How a freshly generated playlist replaces an earlier one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PersistMode {
    /// Keep the playlist row and swap its entries.
    InPlace,
    /// Delete the earlier playlist and insert the new one in the same
    /// transaction.
    Replace,
}

/// Venue configuration lookups.
#[async_trait]
pub trait VenueLookup: Send + Sync {
    async fn find_venue(&self, venue_id: DbId) -> WorkerResult<Option<VenueConfig>>;

    /// Venues without a playlist and without pending demand on `date`.
    async fn venues_missing_playlist(&self, date: NaiveDate) -> WorkerResult<Vec<DbId>>;
}

/// Ordered music rotation of a venue.
#[async_trait]
pub trait TrackCycleSource: Send + Sync {
    async fn load_for_venue(&self, venue_id: DbId) -> WorkerResult<Vec<MusicTrack>>;
}

/// Advert demand and existing playlists.
#[async_trait]
pub trait DemandStore: Send + Sync {
    /// Valid advertisements with a positive repeat count for (venue, date).
    async fn demand_for(&self, venue_id: DbId, date: NaiveDate)
        -> WorkerResult<Vec<AdvertDemand>>;

    /// The stored playlist of (venue, date) with all of its entries.
    async fn find_playlist(&self, venue_id: DbId, date: NaiveDate)
        -> WorkerResult<Option<Playlist>>;

    /// Every (venue, date) from `from` onwards touched by an advertisement.
    async fn affected_units(
        &self,
        advertisement_id: DbId,
        from: NaiveDate,
    ) -> WorkerResult<Vec<(DbId, NaiveDate)>>;
}

/// Playlist writes. Each call is one atomic unit.
#[async_trait]
pub trait PlaylistStore: Send + Sync {
    /// Store a generated playlist together with its generation log.
    /// Returns the ID the playlist is stored under.
    async fn save_generated(
        &self,
        playlist: &Playlist,
        log: &str,
        mode: PersistMode,
    ) -> WorkerResult<DbId>;

    /// Delete a playlist and all of its entries.
    async fn delete_playlist(&self, playlist_id: DbId) -> WorkerResult<bool>;
}

/// Durable queue of demand-change tasks.
#[async_trait]
pub trait TaskQueue: Send + Sync {
    /// Unfinished tasks, oldest registration first.
    async fn unfinished(&self) -> WorkerResult<Vec<GenerationTask>>;

    /// Unfinished tasks registered before `cutoff`.
    async fn stale(&self, cutoff: Timestamp) -> WorkerResult<Vec<GenerationTask>>;

    async fn mark_finished(&self, task_ids: &[DbId]) -> WorkerResult<u64>;
}

/// Receives tasks that stayed unfinished for too long.
#[async_trait]
pub trait WatchdogReporter: Send + Sync {
    async fn report_stuck(&self, tasks: &[GenerationTask]);
}
