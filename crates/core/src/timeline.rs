//! Timeline building: the music pass and the advertisement pass.
//!
//! Music fills the whole operating window back to back. Advertisements are
//! packed into blocks inside a narrower advert window that leaves room for
//! music at both ends, so a playlist always opens and closes on music. Every
//! block is followed by a stretch of music twice as long as the block cap.
//!
//! All increments are whole seconds: lengths are rounded up before use, and
//! each placed item is followed by a one-second client gap.

use chrono::{NaiveDateTime, TimeDelta, Timelike};

use crate::generation_log::GenerationLog;
use crate::playlist::{AdvertEntry, MusicEntry};
use crate::track::{Advertisement, Track, TrackCycle};
use crate::venue::{OperatingWindow, VenueConfig};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Silence after every placed item, for client-side transitions.
pub const CLIENT_GAP_SECS: i64 = 1;

/// Tolerance added to the block cap so rounding does not starve blocks.
pub const BLOCK_SLACK_SECS: i64 = 3;

// ---------------------------------------------------------------------------
// Advert window
// ---------------------------------------------------------------------------

/// The reduced window advertisement blocks may start in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdvertWindow {
    pub begin: NaiveDateTime,
    pub end: NaiveDateTime,
    /// Music reserved at each end of the day and after every block.
    pub reserved_music_secs: i64,
    /// Maximum summed length of the adverts in one block.
    pub block_capacity_secs: i64,
    pub max_block_secs: i64,
}

impl AdvertWindow {
    pub fn for_venue(venue: &VenueConfig, window: &OperatingWindow) -> Self {
        let max_block_secs = venue.max_advert_block_secs.max(0);
        let reserved_music_secs = max_block_secs * 2;
        let margin = TimeDelta::seconds(reserved_music_secs + CLIENT_GAP_SECS);
        Self {
            begin: window.begin + margin,
            end: window.end - margin,
            reserved_music_secs,
            block_capacity_secs: max_block_secs + BLOCK_SLACK_SECS,
            max_block_secs,
        }
    }

    /// Music stretch (plus gap) that follows every block.
    fn filler(&self) -> TimeDelta {
        TimeDelta::seconds(self.reserved_music_secs + CLIENT_GAP_SECS)
    }

    /// How many blocks fit if every block is filled to the cap.
    pub fn block_slot_count(&self) -> i64 {
        if self.end < self.begin {
            return 0;
        }
        let span = (self.end - self.begin).num_seconds();
        let cycle = self.max_block_secs + CLIENT_GAP_SECS + self.reserved_music_secs + CLIENT_GAP_SECS;
        span / cycle + 1
    }
}

// ---------------------------------------------------------------------------
// Music pass
// ---------------------------------------------------------------------------

/// Lay music across the whole operating window.
///
/// Tracks are taken from the cycle until the cursor passes the window end.
/// The first entry starts exactly at the window begin.
pub fn lay_music(
    window: &OperatingWindow,
    cycle: &mut TrackCycle<'_>,
    log: &mut GenerationLog,
) -> Vec<MusicEntry> {
    let mut entries = Vec::new();
    let mut cursor = window.begin;

    while cursor <= window.end {
        let track = cycle.next_track();
        log.line(format!(
            "music: {} track {} '{}' ({:.3}s)",
            cursor,
            track.id,
            track.name,
            track.duration_secs
        ));
        entries.push(MusicEntry {
            track: track.clone(),
            playing_at: cursor,
        });
        cursor += slot(track);
    }

    entries
}

// ---------------------------------------------------------------------------
// Advertisement pass
// ---------------------------------------------------------------------------

/// Outcome of the advertisement pass.
#[derive(Debug, Clone, PartialEq)]
pub struct AdvertPlacement {
    pub entries: Vec<AdvertEntry>,
    /// Occurrences the advert window had no room for, in demand order.
    pub not_fitted: Vec<Advertisement>,
    pub block_count: usize,
}

/// Pack the demand into advertisement blocks inside the advert window.
///
/// A single forward sweep without backtracking. Each block takes items from
/// the remaining demand in order, adding every item that still fits under the
/// block capacity and would start no later than the window end; items that do
/// not fit wait for a later block. Whatever is left when the cursor passes the
/// window end is returned as not fitted.
pub fn lay_adverts(
    window: &AdvertWindow,
    demand: Vec<Advertisement>,
    log: &mut GenerationLog,
) -> AdvertPlacement {
    let capacity = window.block_capacity_secs as f64;
    let mut remaining = demand;
    let mut entries = Vec::new();
    let mut block_count = 0;
    let mut cursor = window.begin;

    while cursor <= window.end {
        if remaining.is_empty() {
            cursor += window.filler();
            continue;
        }

        let mut block = Vec::new();
        let mut block_secs = 0.0;
        let mut next_start = cursor;
        let mut deferred = Vec::new();
        for ad in remaining.drain(..) {
            if block_secs + ad.duration_secs <= capacity && next_start <= window.end {
                block_secs += ad.duration_secs;
                next_start += slot(&ad);
                block.push(ad);
            } else {
                deferred.push(ad);
            }
        }
        remaining = deferred;

        if block.is_empty() {
            log.line(format!(
                "advert: {cursor} no remaining advert fits a {}s block",
                window.block_capacity_secs
            ));
        } else {
            block_count += 1;
            log.line(format!(
                "advert: block #{block_count} at {cursor}, {} items, {block_secs:.3}s of {}s",
                block.len(),
                window.block_capacity_secs
            ));
        }

        for ad in block {
            log.line(format!(
                "advert:   {} advert {} '{}' ({:.3}s)",
                cursor, ad.id, ad.name, ad.duration_secs
            ));
            let step = slot(&ad);
            entries.push(AdvertEntry {
                advertisement: ad,
                playing_at: cursor,
            });
            cursor += step;
        }

        cursor = ceil_to_second(cursor) + window.filler();
    }

    for ad in &remaining {
        log.line(format!(
            "advert: not fitted advert {} '{}' ({:.3}s)",
            ad.id, ad.name, ad.duration_secs
        ));
    }

    AdvertPlacement {
        entries,
        not_fitted: remaining,
        block_count,
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Cursor advance for one placed item.
fn slot(track: &impl Track) -> TimeDelta {
    TimeDelta::seconds(track.whole_secs() + CLIENT_GAP_SECS)
}

fn ceil_to_second(at: NaiveDateTime) -> NaiveDateTime {
    match at.with_nanosecond(0) {
        Some(truncated) if truncated < at => truncated + TimeDelta::seconds(1),
        _ => at,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
