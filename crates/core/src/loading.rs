//! Loading evaluation: how saturated a playlist's advert capacity is.

use crate::playlist::Playlist;
use crate::timeline::AdvertWindow;
use crate::track::Track;
use crate::venue::VenueConfig;

/// Default loading fraction above which a playlist counts as overloaded.
pub const DEFAULT_OVERLOAD_THRESHOLD: f64 = 0.95;

/// Loading verdict for a completed playlist.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoadVerdict {
    pub loading: f64,
    pub overloaded: bool,
}

/// Computes the loading of a completed playlist.
pub trait LoadEvaluator: Send + Sync {
    fn evaluate(&self, venue: &VenueConfig, playlist: &Playlist) -> LoadVerdict;
}

/// Loading as placed advert airtime over the advert capacity of the day.
///
/// Capacity is the number of block slots the advert window holds multiplied
/// by the block cap. Placed airtime uses rounded-up lengths.
#[derive(Debug, Clone, Copy)]
pub struct AirtimeLoadEvaluator {
    overload_threshold: f64,
}

impl AirtimeLoadEvaluator {
    pub fn new(overload_threshold: f64) -> Self {
        Self { overload_threshold }
    }
}

impl Default for AirtimeLoadEvaluator {
    fn default() -> Self {
        Self::new(DEFAULT_OVERLOAD_THRESHOLD)
    }
}

impl LoadEvaluator for AirtimeLoadEvaluator {
    fn evaluate(&self, venue: &VenueConfig, playlist: &Playlist) -> LoadVerdict {
        let window = AdvertWindow::for_venue(venue, &venue.window(playlist.date));
        let capacity_secs = window.block_slot_count() * window.max_block_secs;
        let placed_secs: i64 = playlist
            .adverts()
            .iter()
            .map(|e| e.advertisement.whole_secs())
            .sum();

        let loading = if capacity_secs > 0 {
            placed_secs as f64 / capacity_secs as f64
        } else if placed_secs > 0 {
            f64::INFINITY
        } else {
            0.0
        };

        LoadVerdict {
            loading,
            overloaded: loading > self.overload_threshold,
        }
    }
}
