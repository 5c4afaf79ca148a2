//! PostgreSQL implementation of the collaborator interfaces.
//!
//! Every write opens its own transaction at READ COMMITTED and commits only
//! after all of its statements succeeded; dropping the transaction on an
//! error rolls the unit back.

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::{Postgres, Transaction};
use venuecast_core::playlist::Playlist;
use venuecast_core::track::{AdvertDemand, MusicTrack};
use venuecast_core::types::{DbId, Timestamp};
use venuecast_core::venue::VenueConfig;
use venuecast_db::models::generation_task::GenerationTask;
use venuecast_db::repositories::{
    AdvertisementRepo, GenerationTaskRepo, MusicTrackRepo, PlaylistRepo, VenueRepo,
};
use venuecast_db::DbPool;

use crate::error::WorkerResult;
use crate::store::{
    DemandStore, PersistMode, PlaylistStore, TaskQueue, TrackCycleSource, VenueLookup,
};

/// Collaborators backed by a PostgreSQL pool.
#[derive(Clone)]
pub struct PgStore {
    pool: DbPool,
}

impl PgStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    async fn begin(&self) -> Result<Transaction<'static, Postgres>, sqlx::Error> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("SET TRANSACTION ISOLATION LEVEL READ COMMITTED")
            .execute(&mut *tx)
            .await?;
        Ok(tx)
    }
}

// ---------------------------------------------------------------------------
// Reads
// ---------------------------------------------------------------------------

#[async_trait]
impl VenueLookup for PgStore {
    async fn find_venue(&self, venue_id: DbId) -> WorkerResult<Option<VenueConfig>> {
        let venue = VenueRepo::find_by_id(&self.pool, venue_id).await?;
        Ok(venue.map(|v| v.to_config()))
    }

    async fn venues_missing_playlist(&self, date: NaiveDate) -> WorkerResult<Vec<DbId>> {
        Ok(VenueRepo::list_missing_playlist(&self.pool, date).await?)
    }
}

#[async_trait]
impl TrackCycleSource for PgStore {
    async fn load_for_venue(&self, venue_id: DbId) -> WorkerResult<Vec<MusicTrack>> {
        let rows = MusicTrackRepo::list_for_venue(&self.pool, venue_id).await?;
        Ok(rows.iter().map(|r| r.to_track()).collect())
    }
}

#[async_trait]
impl DemandStore for PgStore {
    async fn demand_for(
        &self,
        venue_id: DbId,
        date: NaiveDate,
    ) -> WorkerResult<Vec<AdvertDemand>> {
        let rows = AdvertisementRepo::list_valid_demand(&self.pool, venue_id, date).await?;
        Ok(rows.iter().map(|r| r.to_demand()).collect())
    }

    async fn find_playlist(
        &self,
        venue_id: DbId,
        date: NaiveDate,
    ) -> WorkerResult<Option<Playlist>> {
        Ok(PlaylistRepo::load_aggregate(&self.pool, venue_id, date).await?)
    }

    async fn affected_units(
        &self,
        advertisement_id: DbId,
        from: NaiveDate,
    ) -> WorkerResult<Vec<(DbId, NaiveDate)>> {
        Ok(AdvertisementRepo::list_affected_units(&self.pool, advertisement_id, from).await?)
    }
}

// ---------------------------------------------------------------------------
// Writes
// ---------------------------------------------------------------------------

#[async_trait]
impl PlaylistStore for PgStore {
    async fn save_generated(
        &self,
        playlist: &Playlist,
        log: &str,
        mode: PersistMode,
    ) -> WorkerResult<DbId> {
        let mut tx = self.begin().await?;

        let id = match (mode, playlist.id) {
            (PersistMode::InPlace, Some(id)) => {
                PlaylistRepo::update(&mut *tx, id, playlist).await?;
                id
            }
            (PersistMode::Replace, Some(old_id)) => {
                PlaylistRepo::delete(&mut *tx, old_id).await?;
                PlaylistRepo::insert(&mut *tx, playlist).await?
            }
            (_, None) => PlaylistRepo::insert(&mut *tx, playlist).await?,
        };
        PlaylistRepo::append_log(&mut *tx, playlist.venue_id, playlist.date, Some(id), log)
            .await?;

        tx.commit().await?;
        Ok(id)
    }

    async fn delete_playlist(&self, playlist_id: DbId) -> WorkerResult<bool> {
        let mut tx = self.begin().await?;
        let deleted = PlaylistRepo::delete(&mut *tx, playlist_id).await?;
        tx.commit().await?;
        Ok(deleted)
    }
}

#[async_trait]
impl TaskQueue for PgStore {
    async fn unfinished(&self) -> WorkerResult<Vec<GenerationTask>> {
        Ok(GenerationTaskRepo::list_unfinished(&self.pool).await?)
    }

    async fn stale(&self, cutoff: Timestamp) -> WorkerResult<Vec<GenerationTask>> {
        Ok(GenerationTaskRepo::list_stale(&self.pool, cutoff).await?)
    }

    async fn mark_finished(&self, task_ids: &[DbId]) -> WorkerResult<u64> {
        Ok(GenerationTaskRepo::mark_finished(&self.pool, task_ids).await?)
    }
}
