//! One generation unit: load, generate and persist the playlist of a single
//! (venue, date).

use std::sync::Arc;

use chrono::NaiveDate;
use venuecast_core::error::CoreError;
use venuecast_core::generation::{free_day_outcome, generate, GenerationInput, GenerationResult};
use venuecast_core::loading::LoadEvaluator;
use venuecast_core::types::DbId;

use crate::error::WorkerResult;
use crate::store::{DemandStore, PersistMode, PlaylistStore, TrackCycleSource, VenueLookup};

/// What a unit changed in storage.
#[derive(Debug, Clone, PartialEq)]
pub enum UnitOutcome {
    /// Free day without a playlist; nothing stored.
    Skipped,
    /// Free day; the earlier playlist was removed.
    Deleted { playlist_id: DbId },
    /// A playlist was generated and stored.
    Saved {
        playlist_id: DbId,
        not_fitted: usize,
        overloaded: bool,
    },
}

/// Runs generation units against the configured collaborators.
pub struct PlaylistGenerator {
    venues: Arc<dyn VenueLookup>,
    tracks: Arc<dyn TrackCycleSource>,
    demand: Arc<dyn DemandStore>,
    playlists: Arc<dyn PlaylistStore>,
    evaluator: Arc<dyn LoadEvaluator>,
}

impl PlaylistGenerator {
    pub fn new(
        venues: Arc<dyn VenueLookup>,
        tracks: Arc<dyn TrackCycleSource>,
        demand: Arc<dyn DemandStore>,
        playlists: Arc<dyn PlaylistStore>,
        evaluator: Arc<dyn LoadEvaluator>,
    ) -> Self {
        Self {
            venues,
            tracks,
            demand,
            playlists,
            evaluator,
        }
    }

    /// Generate and persist the playlist of one (venue, date).
    ///
    /// The existing playlist is loaded first so demand already placed in it
    /// is reconciled rather than rebuilt blindly. An unknown venue is a
    /// [`CoreError::NotFound`]; a venue without music is
    /// [`CoreError::EmptyTrackSource`]. Either way nothing is written.
    pub async fn run_unit(
        &self,
        venue_id: DbId,
        date: NaiveDate,
        mode: PersistMode,
    ) -> WorkerResult<UnitOutcome> {
        tracing::debug!(venue_id, %date, ?mode, "Generation unit started");

        let venue = self
            .venues
            .find_venue(venue_id)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "venue",
                id: venue_id,
            })?;
        let existing = self.demand.find_playlist(venue_id, date).await?;

        let result = if venue.is_free_day(date) {
            free_day_outcome(existing)
        } else {
            let tracks = self.tracks.load_for_venue(venue_id).await?;
            let demand = self.demand.demand_for(venue_id, date).await?;
            let input = GenerationInput {
                venue: &venue,
                date,
                tracks: &tracks,
                demand: &demand,
            };
            generate(input, existing, self.evaluator.as_ref())?
        };

        let kind = result.kind();
        let outcome = self.apply(result, mode).await?;
        tracing::info!(venue_id, %date, kind, ?outcome, "Generation unit finished");
        Ok(outcome)
    }

    async fn apply(&self, result: GenerationResult, mode: PersistMode) -> WorkerResult<UnitOutcome> {
        match result {
            GenerationResult::NotGenerated => Ok(UnitOutcome::Skipped),
            GenerationResult::Delete(playlist) => match playlist.id {
                Some(playlist_id) => {
                    self.playlists.delete_playlist(playlist_id).await?;
                    Ok(UnitOutcome::Deleted { playlist_id })
                }
                None => Ok(UnitOutcome::Skipped),
            },
            GenerationResult::Generated {
                playlist,
                log,
                not_fitted,
            } => {
                if !not_fitted.is_empty() {
                    tracing::warn!(
                        venue_id = playlist.venue_id,
                        date = %playlist.date,
                        not_fitted = not_fitted.len(),
                        "Advert demand exceeds the advert window"
                    );
                }
                let playlist_id = self.playlists.save_generated(&playlist, &log, mode).await?;
                Ok(UnitOutcome::Saved {
                    playlist_id,
                    not_fitted: not_fitted.len(),
                    overloaded: playlist.overloaded,
                })
            }
        }
    }
}
