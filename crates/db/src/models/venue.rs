//! Venue entity model and DTOs.

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use venuecast_core::types::{DbId, Timestamp};
use venuecast_core::venue::{weekdays_from_iso, VenueConfig};

/// A row from the `venues` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Venue {
    pub id: DbId,
    pub name: String,
    pub begin_time: NaiveTime,
    pub end_time: NaiveTime,
    /// ISO weekday numbers (Monday = 1) with no playback.
    pub free_days: Vec<i16>,
    pub max_advert_block_secs: i32,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Venue {
    /// The per-run configuration view used by generation.
    pub fn to_config(&self) -> VenueConfig {
        VenueConfig {
            id: self.id,
            name: self.name.clone(),
            begin_time: self.begin_time,
            end_time: self.end_time,
            free_days: weekdays_from_iso(&self.free_days),
            max_advert_block_secs: i64::from(self.max_advert_block_secs),
        }
    }
}

/// DTO for creating a new venue.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateVenue {
    pub name: String,
    pub begin_time: NaiveTime,
    pub end_time: NaiveTime,
    #[serde(default)]
    pub free_days: Vec<i16>,
    pub max_advert_block_secs: i32,
}
