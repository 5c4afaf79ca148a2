//! Repository for `advertisements` and `advert_demands`.

use chrono::NaiveDate;
use sqlx::PgPool;
use venuecast_core::types::DbId;

use crate::models::advertisement::{
    AdvertDemandRecord, Advertisement, CreateAdvertisement, UpsertAdvertDemand,
    ValidAdvertDemand,
};

/// Column list for `advertisements` queries.
const COLUMNS: &str = "\
    id, name, duration_secs, valid_from, valid_until, created_at, updated_at";

/// Column list for `advert_demands` queries.
const DEMAND_COLUMNS: &str = "\
    id, advertisement_id, venue_id, demand_date, repeat_count, created_at";

/// Provides CRUD operations for advertisements and their demand.
pub struct AdvertisementRepo;

impl AdvertisementRepo {
    /// Insert a new advertisement, returning the created row.
    pub async fn create(
        pool: &PgPool,
        input: &CreateAdvertisement,
    ) -> Result<Advertisement, sqlx::Error> {
        let query = format!(
            "INSERT INTO advertisements (name, duration_secs, valid_from, valid_until) \
             VALUES ($1, $2, $3, $4) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Advertisement>(&query)
            .bind(&input.name)
            .bind(input.duration_secs)
            .bind(input.valid_from)
            .bind(input.valid_until)
            .fetch_one(pool)
            .await
    }

    /// Set the repeat count of an advertisement on one (venue, date).
    pub async fn upsert_demand(
        pool: &PgPool,
        input: &UpsertAdvertDemand,
    ) -> Result<AdvertDemandRecord, sqlx::Error> {
        let query = format!(
            "INSERT INTO advert_demands (advertisement_id, venue_id, demand_date, repeat_count) \
             VALUES ($1, $2, $3, $4) \
             ON CONFLICT ON CONSTRAINT uq_advert_demands_advert_venue_date \
             DO UPDATE SET repeat_count = EXCLUDED.repeat_count \
             RETURNING {DEMAND_COLUMNS}"
        );
        sqlx::query_as::<_, AdvertDemandRecord>(&query)
            .bind(input.advertisement_id)
            .bind(input.venue_id)
            .bind(input.demand_date)
            .bind(input.repeat_count)
            .fetch_one(pool)
            .await
    }

    /// Advertisements valid on `date` with a positive demand for the venue,
    /// ordered by creation time then ID.
    pub async fn list_valid_demand(
        pool: &PgPool,
        venue_id: DbId,
        date: NaiveDate,
    ) -> Result<Vec<ValidAdvertDemand>, sqlx::Error> {
        sqlx::query_as::<_, ValidAdvertDemand>(
            "SELECT a.id AS advertisement_id, a.name, a.duration_secs, a.created_at, \
                    d.repeat_count \
             FROM advert_demands d \
             JOIN advertisements a ON a.id = d.advertisement_id \
             WHERE d.venue_id = $1 AND d.demand_date = $2 AND d.repeat_count > 0 \
               AND a.valid_from <= $2 \
               AND (a.valid_until IS NULL OR a.valid_until >= $2) \
             ORDER BY a.created_at, a.id",
        )
        .bind(venue_id)
        .bind(date)
        .fetch_all(pool)
        .await
    }

    /// Every (venue, date) from `from` onwards whose playlist an advertisement
    /// touches: dates it has demand on, and dates whose playlist already
    /// carries it.
    pub async fn list_affected_units(
        pool: &PgPool,
        advertisement_id: DbId,
        from: NaiveDate,
    ) -> Result<Vec<(DbId, NaiveDate)>, sqlx::Error> {
        sqlx::query_as::<_, (DbId, NaiveDate)>(
            "SELECT venue_id, demand_date AS playlist_date FROM advert_demands \
             WHERE advertisement_id = $1 AND demand_date >= $2 \
             UNION \
             SELECT p.venue_id, p.playlist_date FROM playlists p \
             JOIN playlist_advert_entries e ON e.playlist_id = p.id \
             WHERE e.advertisement_id = $1 AND p.playlist_date >= $2 \
             ORDER BY playlist_date, venue_id",
        )
        .bind(advertisement_id)
        .bind(from)
        .fetch_all(pool)
        .await
    }
}
