//! Repository for `music_tracks` and the per-venue assignment tables.

use sqlx::PgPool;
use venuecast_core::types::DbId;

use crate::models::music_track::{CreateMusicTrack, MusicTrack};

/// Column list for `music_tracks` queries.
const COLUMNS: &str = "id, name, duration_secs, is_active, created_at, updated_at";

/// Provides CRUD operations for music tracks.
pub struct MusicTrackRepo;

impl MusicTrackRepo {
    /// Insert a new track, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateMusicTrack) -> Result<MusicTrack, sqlx::Error> {
        let query = format!(
            "INSERT INTO music_tracks (name, duration_secs) VALUES ($1, $2) RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, MusicTrack>(&query)
            .bind(&input.name)
            .bind(input.duration_secs)
            .fetch_one(pool)
            .await
    }

    /// Assign a track to a venue's rotation at `sort_order`.
    pub async fn assign_to_venue(
        pool: &PgPool,
        venue_id: DbId,
        music_track_id: DbId,
        sort_order: i32,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO venue_music_tracks (venue_id, music_track_id, sort_order) \
             VALUES ($1, $2, $3) \
             ON CONFLICT (venue_id, music_track_id) DO UPDATE SET sort_order = $3",
        )
        .bind(venue_id)
        .bind(music_track_id)
        .bind(sort_order)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Exclude a track from a venue's rotation.
    pub async fn ban_for_venue(
        pool: &PgPool,
        venue_id: DbId,
        music_track_id: DbId,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO banned_music_tracks (venue_id, music_track_id) \
             VALUES ($1, $2) ON CONFLICT DO NOTHING",
        )
        .bind(venue_id)
        .bind(music_track_id)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// The ordered rotation for a venue.
    ///
    /// Assigned tracks in `sort_order`; a venue without assignments plays all
    /// active tracks by ID. Banned and inactive tracks are always excluded.
    pub async fn list_for_venue(
        pool: &PgPool,
        venue_id: DbId,
    ) -> Result<Vec<MusicTrack>, sqlx::Error> {
        let tracks = sqlx::query_as::<_, MusicTrack>(
            "SELECT t.id, t.name, t.duration_secs, t.is_active, t.created_at, t.updated_at \
             FROM venue_music_tracks vt \
             JOIN music_tracks t ON t.id = vt.music_track_id \
             WHERE vt.venue_id = $1 AND t.is_active = true \
               AND NOT EXISTS ( \
                   SELECT 1 FROM banned_music_tracks b \
                   WHERE b.venue_id = $1 AND b.music_track_id = t.id \
               ) \
             ORDER BY vt.sort_order, t.id",
        )
        .bind(venue_id)
        .fetch_all(pool)
        .await?;
        if !tracks.is_empty() || Self::has_assignment(pool, venue_id).await? {
            return Ok(tracks);
        }

        let fallback = format!(
            "SELECT {COLUMNS} FROM music_tracks t \
             WHERE t.is_active = true \
               AND NOT EXISTS ( \
                   SELECT 1 FROM banned_music_tracks b \
                   WHERE b.venue_id = $1 AND b.music_track_id = t.id \
               ) \
             ORDER BY t.id"
        );
        sqlx::query_as::<_, MusicTrack>(&fallback)
            .bind(venue_id)
            .fetch_all(pool)
            .await
    }

    async fn has_assignment(pool: &PgPool, venue_id: DbId) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM venue_music_tracks WHERE venue_id = $1)",
        )
        .bind(venue_id)
        .fetch_one(pool)
        .await
    }
}
