//! Playlist, playlist entry and generation log models.

use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;
use sqlx::FromRow;
use venuecast_core::playlist::{AdvertEntry, MusicEntry};
use venuecast_core::track;
use venuecast_core::types::{DbId, Timestamp};

/// A row from the `playlists` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Playlist {
    pub id: DbId,
    pub venue_id: DbId,
    pub playlist_date: NaiveDate,
    pub loading: f64,
    pub unique_advert_count: i32,
    pub total_advert_count: i32,
    pub overloaded: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A music entry joined with its track.
#[derive(Debug, Clone, FromRow)]
pub struct MusicEntryRow {
    pub music_track_id: DbId,
    pub name: String,
    pub duration_secs: f64,
    pub playing_at: NaiveDateTime,
}

impl MusicEntryRow {
    pub fn to_entry(&self) -> MusicEntry {
        MusicEntry {
            track: track::MusicTrack {
                id: self.music_track_id,
                name: self.name.clone(),
                duration_secs: self.duration_secs,
            },
            playing_at: self.playing_at,
        }
    }
}

/// An advert entry joined with its advertisement.
#[derive(Debug, Clone, FromRow)]
pub struct AdvertEntryRow {
    pub advertisement_id: DbId,
    pub name: String,
    pub duration_secs: f64,
    pub created_at: Timestamp,
    pub playing_at: NaiveDateTime,
}

impl AdvertEntryRow {
    pub fn to_entry(&self) -> AdvertEntry {
        AdvertEntry {
            advertisement: track::Advertisement {
                id: self.advertisement_id,
                name: self.name.clone(),
                duration_secs: self.duration_secs,
                created_at: self.created_at,
            },
            playing_at: self.playing_at,
        }
    }
}

/// A row from the `playlist_generation_logs` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct PlaylistGenerationLog {
    pub id: DbId,
    pub venue_id: DbId,
    pub playlist_date: NaiveDate,
    pub playlist_id: Option<DbId>,
    pub body: String,
    pub created_at: Timestamp,
}
