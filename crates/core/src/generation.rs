//! The playlist generation pipeline and its tri-state outcome.
//!
//! [`generate`] is pure: given a venue, a date, the previous playlist (if
//! any), the venue's music and the advert demand, it decides whether a
//! playlist should exist for the date and, if so, builds it from scratch.
//! Persisting the outcome is the caller's job.

use chrono::NaiveDate;

use crate::demand::resolve_demand;
use crate::error::CoreError;
use crate::generation_log::GenerationLog;
use crate::loading::LoadEvaluator;
use crate::playlist::Playlist;
use crate::timeline::{lay_adverts, lay_music, AdvertWindow};
use crate::track::{AdvertDemand, Advertisement, MusicTrack, TrackCycle};
use crate::venue::VenueConfig;

// ---------------------------------------------------------------------------
// Outcome
// ---------------------------------------------------------------------------

/// Outcome of one generation run for a (venue, date).
#[derive(Debug, Clone, PartialEq)]
pub enum GenerationResult {
    /// Free day and no playlist existed: nothing to store.
    NotGenerated,
    /// A playlist was (re)built.
    Generated {
        playlist: Playlist,
        /// Full decision trace of the run.
        log: String,
        /// Occurrences that did not fit into the advert window.
        not_fitted: Vec<Advertisement>,
    },
    /// Free day, but a playlist from an earlier run exists and must go.
    Delete(Playlist),
}

impl GenerationResult {
    /// Short label for structured logging.
    pub fn kind(&self) -> &'static str {
        match self {
            GenerationResult::NotGenerated => "not_generated",
            GenerationResult::Generated { .. } => "generated",
            GenerationResult::Delete(_) => "delete",
        }
    }
}

/// Everything one generation run reads.
#[derive(Debug, Clone, Copy)]
pub struct GenerationInput<'a> {
    pub venue: &'a VenueConfig,
    pub date: NaiveDate,
    pub tracks: &'a [MusicTrack],
    pub demand: &'a [AdvertDemand],
}

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

/// Outcome for a free day, which needs no tracks or demand.
pub fn free_day_outcome(existing: Option<Playlist>) -> GenerationResult {
    match existing {
        Some(playlist) => GenerationResult::Delete(playlist),
        None => GenerationResult::NotGenerated,
    }
}

/// Run the full pipeline for one (venue, date).
///
/// On a free day the result is [`GenerationResult::NotGenerated`] or
/// [`GenerationResult::Delete`]. Otherwise the existing playlist (or a new
/// one) gets freshly built music and advert entries plus loading figures.
/// A playlist is also marked overloaded whenever demand did not fit.
pub fn generate(
    input: GenerationInput<'_>,
    existing: Option<Playlist>,
    evaluator: &dyn LoadEvaluator,
) -> Result<GenerationResult, CoreError> {
    let GenerationInput {
        venue,
        date,
        tracks,
        demand,
    } = input;

    if venue.is_free_day(date) {
        return Ok(free_day_outcome(existing));
    }

    let mut playlist = existing.unwrap_or_else(|| Playlist::new(venue.id, date));
    if playlist.venue_id != venue.id || playlist.date != date {
        return Err(CoreError::Internal(format!(
            "Playlist for venue {} on {} handed to generation of venue {} on {date}",
            playlist.venue_id, playlist.date, venue.id
        )));
    }

    let window = venue.window(date);
    let advert_window = AdvertWindow::for_venue(venue, &window);

    let mut log = GenerationLog::new();
    log.line(format!(
        "venue {} '{}' on {date}: window {} .. {}, advert window {} .. {}",
        venue.id, venue.name, window.begin, window.end, advert_window.begin, advert_window.end
    ));
    log.line(format!(
        "max block {}s, block capacity {}s, reserved music {}s, {} tracks, {} demand records",
        venue.max_advert_block_secs,
        advert_window.block_capacity_secs,
        advert_window.reserved_music_secs,
        tracks.len(),
        demand.len()
    ));

    let required = resolve_demand(playlist.adverts(), demand, &mut log);

    let mut cycle = TrackCycle::new(venue.id, tracks)?;
    let music = lay_music(&window, &mut cycle, &mut log);
    let placement = lay_adverts(&advert_window, required, &mut log);

    playlist.replace_entries(music, placement.entries);

    let verdict = evaluator.evaluate(venue, &playlist);
    playlist.loading = verdict.loading;
    playlist.overloaded = verdict.overloaded || !placement.not_fitted.is_empty();

    log.line(format!(
        "result: {} music entries, {} advert entries in {} blocks, {} not fitted, loading {:.4}, overloaded {}",
        playlist.music().len(),
        playlist.total_advert_count,
        placement.block_count,
        placement.not_fitted.len(),
        playlist.loading,
        playlist.overloaded
    ));

    Ok(GenerationResult::Generated {
        playlist,
        log: log.into_text(),
        not_fitted: placement.not_fitted,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
