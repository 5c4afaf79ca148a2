//! Repository for the `venues` table.

use chrono::NaiveDate;
use sqlx::PgPool;
use venuecast_core::types::DbId;

use crate::models::venue::{CreateVenue, Venue};

/// Column list for `venues` queries.
const COLUMNS: &str = "\
    id, name, begin_time, end_time, free_days, max_advert_block_secs, \
    is_active, created_at, updated_at";

/// Provides CRUD operations for venues.
pub struct VenueRepo;

impl VenueRepo {
    /// Insert a new venue, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateVenue) -> Result<Venue, sqlx::Error> {
        let query = format!(
            "INSERT INTO venues (name, begin_time, end_time, free_days, max_advert_block_secs) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Venue>(&query)
            .bind(&input.name)
            .bind(input.begin_time)
            .bind(input.end_time)
            .bind(&input.free_days)
            .bind(input.max_advert_block_secs)
            .fetch_one(pool)
            .await
    }

    /// Find a venue by its ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Venue>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM venues WHERE id = $1");
        sqlx::query_as::<_, Venue>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// IDs of active venues that have no playlist for `date` and no pending
    /// demand on that date.
    ///
    /// Demand is pending while an unfinished generation task exists for an
    /// advertisement with a demand record on (venue, `date`); those venues are
    /// left to the demand-driven pass.
    pub async fn list_missing_playlist(
        pool: &PgPool,
        date: NaiveDate,
    ) -> Result<Vec<DbId>, sqlx::Error> {
        sqlx::query_scalar::<_, DbId>(
            "SELECT v.id FROM venues v \
             WHERE v.is_active = true \
               AND NOT EXISTS ( \
                   SELECT 1 FROM playlists p \
                   WHERE p.venue_id = v.id AND p.playlist_date = $1 \
               ) \
               AND NOT EXISTS ( \
                   SELECT 1 FROM advert_demands d \
                   JOIN playlist_generation_tasks t \
                     ON t.advertisement_id = d.advertisement_id AND t.is_finished = false \
                   WHERE d.venue_id = v.id AND d.demand_date = $1 \
               ) \
             ORDER BY v.id",
        )
        .bind(date)
        .fetch_all(pool)
        .await
    }
}
