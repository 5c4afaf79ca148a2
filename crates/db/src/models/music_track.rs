//! Music track entity model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use venuecast_core::track;
use venuecast_core::types::{DbId, Timestamp};

/// A row from the `music_tracks` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct MusicTrack {
    pub id: DbId,
    pub name: String,
    pub duration_secs: f64,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl MusicTrack {
    pub fn to_track(&self) -> track::MusicTrack {
        track::MusicTrack {
            id: self.id,
            name: self.name.clone(),
            duration_secs: self.duration_secs,
        }
    }
}

/// DTO for creating a new music track.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateMusicTrack {
    pub name: String,
    pub duration_secs: f64,
}
