//! Repository for `playlists`, their entries and generation logs.
//!
//! Writes take `&mut PgConnection` and are meant to run inside the caller's
//! transaction; a playlist and its entries are always written together.

use chrono::{NaiveDate, NaiveDateTime};
use sqlx::{PgConnection, PgPool};
use venuecast_core::playlist as domain;
use venuecast_core::types::DbId;

use crate::models::playlist::{AdvertEntryRow, MusicEntryRow, Playlist, PlaylistGenerationLog};

/// Column list for `playlists` queries.
const COLUMNS: &str = "\
    id, venue_id, playlist_date, loading, unique_advert_count, total_advert_count, \
    overloaded, created_at, updated_at";

/// Column list for `playlist_generation_logs` queries.
const LOG_COLUMNS: &str = "id, venue_id, playlist_date, playlist_id, body, created_at";

/// Provides persistence for playlist aggregates.
pub struct PlaylistRepo;

impl PlaylistRepo {
    // -----------------------------------------------------------------------
    // Reads
    // -----------------------------------------------------------------------

    /// Find the playlist row of a (venue, date).
    pub async fn find_by_venue_date(
        pool: &PgPool,
        venue_id: DbId,
        date: NaiveDate,
    ) -> Result<Option<Playlist>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM playlists WHERE venue_id = $1 AND playlist_date = $2"
        );
        sqlx::query_as::<_, Playlist>(&query)
            .bind(venue_id)
            .bind(date)
            .fetch_optional(pool)
            .await
    }

    /// Music entries of a playlist ordered by playing time.
    pub async fn list_music_entries(
        pool: &PgPool,
        playlist_id: DbId,
    ) -> Result<Vec<MusicEntryRow>, sqlx::Error> {
        sqlx::query_as::<_, MusicEntryRow>(
            "SELECT e.music_track_id, t.name, t.duration_secs, e.playing_at \
             FROM playlist_music_entries e \
             JOIN music_tracks t ON t.id = e.music_track_id \
             WHERE e.playlist_id = $1 \
             ORDER BY e.playing_at, e.id",
        )
        .bind(playlist_id)
        .fetch_all(pool)
        .await
    }

    /// Advert entries of a playlist ordered by playing time.
    pub async fn list_advert_entries(
        pool: &PgPool,
        playlist_id: DbId,
    ) -> Result<Vec<AdvertEntryRow>, sqlx::Error> {
        sqlx::query_as::<_, AdvertEntryRow>(
            "SELECT e.advertisement_id, a.name, a.duration_secs, a.created_at, e.playing_at \
             FROM playlist_advert_entries e \
             JOIN advertisements a ON a.id = e.advertisement_id \
             WHERE e.playlist_id = $1 \
             ORDER BY e.playing_at, e.id",
        )
        .bind(playlist_id)
        .fetch_all(pool)
        .await
    }

    /// Load the full aggregate (row plus entries) of a (venue, date).
    pub async fn load_aggregate(
        pool: &PgPool,
        venue_id: DbId,
        date: NaiveDate,
    ) -> Result<Option<domain::Playlist>, sqlx::Error> {
        let Some(row) = Self::find_by_venue_date(pool, venue_id, date).await? else {
            return Ok(None);
        };
        let music = Self::list_music_entries(pool, row.id).await?;
        let adverts = Self::list_advert_entries(pool, row.id).await?;

        Ok(Some(domain::Playlist::restore(
            row.id,
            row.venue_id,
            row.playlist_date,
            music.iter().map(MusicEntryRow::to_entry).collect(),
            adverts.iter().map(AdvertEntryRow::to_entry).collect(),
            row.loading,
            row.overloaded,
        )))
    }

    /// Generation logs of a (venue, date), oldest first.
    pub async fn list_logs(
        pool: &PgPool,
        venue_id: DbId,
        date: NaiveDate,
    ) -> Result<Vec<PlaylistGenerationLog>, sqlx::Error> {
        let query = format!(
            "SELECT {LOG_COLUMNS} FROM playlist_generation_logs \
             WHERE venue_id = $1 AND playlist_date = $2 \
             ORDER BY created_at, id"
        );
        sqlx::query_as::<_, PlaylistGenerationLog>(&query)
            .bind(venue_id)
            .bind(date)
            .fetch_all(pool)
            .await
    }

    // -----------------------------------------------------------------------
    // Writes
    // -----------------------------------------------------------------------

    /// Insert a new playlist row with its entries. Returns the new ID.
    pub async fn insert(
        conn: &mut PgConnection,
        playlist: &domain::Playlist,
    ) -> Result<DbId, sqlx::Error> {
        let id: DbId = sqlx::query_scalar(
            "INSERT INTO playlists \
                 (venue_id, playlist_date, loading, unique_advert_count, total_advert_count, overloaded) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING id",
        )
        .bind(playlist.venue_id)
        .bind(playlist.date)
        .bind(playlist.loading)
        .bind(playlist.unique_advert_count)
        .bind(playlist.total_advert_count)
        .bind(playlist.overloaded)
        .fetch_one(&mut *conn)
        .await?;

        Self::insert_entries(conn, id, playlist).await?;
        Ok(id)
    }

    /// Overwrite an existing playlist row and replace all of its entries.
    pub async fn update(
        conn: &mut PgConnection,
        id: DbId,
        playlist: &domain::Playlist,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE playlists \
             SET loading = $2, unique_advert_count = $3, total_advert_count = $4, \
                 overloaded = $5, updated_at = NOW() \
             WHERE id = $1",
        )
        .bind(id)
        .bind(playlist.loading)
        .bind(playlist.unique_advert_count)
        .bind(playlist.total_advert_count)
        .bind(playlist.overloaded)
        .execute(&mut *conn)
        .await?;

        sqlx::query("DELETE FROM playlist_music_entries WHERE playlist_id = $1")
            .bind(id)
            .execute(&mut *conn)
            .await?;
        sqlx::query("DELETE FROM playlist_advert_entries WHERE playlist_id = $1")
            .bind(id)
            .execute(&mut *conn)
            .await?;

        Self::insert_entries(conn, id, playlist).await
    }

    /// Delete a playlist; entries go with it via `ON DELETE CASCADE`.
    ///
    /// Returns `true` if a row was deleted.
    pub async fn delete(conn: &mut PgConnection, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM playlists WHERE id = $1")
            .bind(id)
            .execute(&mut *conn)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Append a generation log for a (venue, date).
    pub async fn append_log(
        conn: &mut PgConnection,
        venue_id: DbId,
        date: NaiveDate,
        playlist_id: Option<DbId>,
        body: &str,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO playlist_generation_logs (venue_id, playlist_date, playlist_id, body) \
             VALUES ($1, $2, $3, $4)",
        )
        .bind(venue_id)
        .bind(date)
        .bind(playlist_id)
        .bind(body)
        .execute(&mut *conn)
        .await?;
        Ok(())
    }

    async fn insert_entries(
        conn: &mut PgConnection,
        playlist_id: DbId,
        playlist: &domain::Playlist,
    ) -> Result<(), sqlx::Error> {
        let (track_ids, track_times): (Vec<DbId>, Vec<NaiveDateTime>) = playlist
            .music()
            .iter()
            .map(|e| (e.track.id, e.playing_at))
            .unzip();
        sqlx::query(
            "INSERT INTO playlist_music_entries (playlist_id, music_track_id, playing_at) \
             SELECT $1, track_id, playing_at \
             FROM UNNEST($2::BIGINT[], $3::TIMESTAMP[]) AS u(track_id, playing_at)",
        )
        .bind(playlist_id)
        .bind(&track_ids)
        .bind(&track_times)
        .execute(&mut *conn)
        .await?;

        let (advert_ids, advert_times): (Vec<DbId>, Vec<NaiveDateTime>) = playlist
            .adverts()
            .iter()
            .map(|e| (e.advertisement.id, e.playing_at))
            .unzip();
        sqlx::query(
            "INSERT INTO playlist_advert_entries (playlist_id, advertisement_id, playing_at) \
             SELECT $1, advertisement_id, playing_at \
             FROM UNNEST($2::BIGINT[], $3::TIMESTAMP[]) AS u(advertisement_id, playing_at)",
        )
        .bind(playlist_id)
        .bind(&advert_ids)
        .bind(&advert_times)
        .execute(&mut *conn)
        .await?;

        Ok(())
    }
}
