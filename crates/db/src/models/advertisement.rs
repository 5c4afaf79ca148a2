//! Advertisement and advert demand models.
//!
//! An advertisement carries one demand record per (venue, date) it must play
//! on; the record's `repeat_count` is the exact number of occurrences that
//! day.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use venuecast_core::track;
use venuecast_core::types::{DbId, Timestamp};

// ---------------------------------------------------------------------------
// Advertisements
// ---------------------------------------------------------------------------

/// A row from the `advertisements` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Advertisement {
    pub id: DbId,
    pub name: String,
    pub duration_secs: f64,
    pub valid_from: NaiveDate,
    pub valid_until: Option<NaiveDate>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a new advertisement.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateAdvertisement {
    pub name: String,
    pub duration_secs: f64,
    pub valid_from: NaiveDate,
    pub valid_until: Option<NaiveDate>,
}

// ---------------------------------------------------------------------------
// Demand records
// ---------------------------------------------------------------------------

/// A row from the `advert_demands` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct AdvertDemandRecord {
    pub id: DbId,
    pub advertisement_id: DbId,
    pub venue_id: DbId,
    pub demand_date: NaiveDate,
    pub repeat_count: i32,
    pub created_at: Timestamp,
}

/// DTO for setting the demand of an advertisement on one (venue, date).
#[derive(Debug, Clone, Deserialize)]
pub struct UpsertAdvertDemand {
    pub advertisement_id: DbId,
    pub venue_id: DbId,
    pub demand_date: NaiveDate,
    pub repeat_count: i32,
}

/// A valid advertisement joined with its demand for one (venue, date).
#[derive(Debug, Clone, FromRow)]
pub struct ValidAdvertDemand {
    pub advertisement_id: DbId,
    pub name: String,
    pub duration_secs: f64,
    pub created_at: Timestamp,
    pub repeat_count: i32,
}

impl ValidAdvertDemand {
    pub fn to_demand(&self) -> track::AdvertDemand {
        track::AdvertDemand {
            advertisement: track::Advertisement {
                id: self.advertisement_id,
                name: self.name.clone(),
                duration_secs: self.duration_secs,
                created_at: self.created_at,
            },
            repeat_count: u32::try_from(self.repeat_count).unwrap_or(0),
        }
    }
}
