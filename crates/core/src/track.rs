//! Music tracks, advertisements and the cyclic track supply.

use serde::Serialize;

use crate::error::CoreError;
use crate::types::{DbId, Timestamp};

/// Common view of anything that can be placed on a playlist timeline.
pub trait Track {
    fn id(&self) -> DbId;
    fn name(&self) -> &str;
    /// Playback length in seconds, possibly fractional.
    fn duration_secs(&self) -> f64;

    /// Playback length rounded up to the next whole second.
    fn whole_secs(&self) -> i64 {
        ceil_secs(self.duration_secs())
    }
}

/// Round a length up to whole seconds. Negative lengths count as zero.
pub fn ceil_secs(secs: f64) -> i64 {
    secs.max(0.0).ceil() as i64
}

// ---------------------------------------------------------------------------
// Music
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MusicTrack {
    pub id: DbId,
    pub name: String,
    pub duration_secs: f64,
}

impl Track for MusicTrack {
    fn id(&self) -> DbId {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn duration_secs(&self) -> f64 {
        self.duration_secs
    }
}

// ---------------------------------------------------------------------------
// Advertisements
// ---------------------------------------------------------------------------

/// A paid advertisement spot.
///
/// `created_at` orders advertisements whenever several compete for the same
/// slots; `id` breaks exact ties.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Advertisement {
    pub id: DbId,
    pub name: String,
    pub duration_secs: f64,
    pub created_at: Timestamp,
}

impl Advertisement {
    /// Sort key used everywhere advertisements are ordered.
    pub fn order_key(&self) -> (Timestamp, DbId) {
        (self.created_at, self.id)
    }
}

impl Track for Advertisement {
    fn id(&self) -> DbId {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn duration_secs(&self) -> f64 {
        self.duration_secs
    }
}

/// An advertisement together with its demand record for one (venue, date).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdvertDemand {
    pub advertisement: Advertisement,
    /// Exact number of occurrences required that day.
    pub repeat_count: u32,
}

// ---------------------------------------------------------------------------
// Cyclic supply
// ---------------------------------------------------------------------------

/// Inexhaustible, ordered supply of music tracks.
///
/// An index cursor over a non-empty slice; after the last track it starts
/// again from the first.
#[derive(Debug)]
pub struct TrackCycle<'a> {
    tracks: &'a [MusicTrack],
    cursor: usize,
}

impl<'a> TrackCycle<'a> {
    /// Build a cycle over `tracks`. An empty list can never fill a window, so
    /// it is rejected up front.
    pub fn new(venue_id: DbId, tracks: &'a [MusicTrack]) -> Result<Self, CoreError> {
        if tracks.is_empty() {
            return Err(CoreError::EmptyTrackSource { venue_id });
        }
        Ok(Self { tracks, cursor: 0 })
    }

    /// Return the next track, wrapping around at the end.
    pub fn next_track(&mut self) -> &'a MusicTrack {
        let track = &self.tracks[self.cursor];
        self.cursor = (self.cursor + 1) % self.tracks.len();
        track
    }
}
