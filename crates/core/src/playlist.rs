//! The playlist aggregate.
//!
//! A [`Playlist`] belongs to exactly one (venue, date) pair and owns two
//! ordered entry lists. Entries are never patched: each generation run builds
//! fresh lists and swaps them in with [`Playlist::replace_entries`], which
//! also refreshes the advert counters.

use std::collections::HashSet;

use chrono::NaiveDate;
use serde::Serialize;

use crate::track::{Advertisement, MusicTrack};
use crate::types::{DbId, PlayingDateTime};

/// One music track scheduled at a point in time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MusicEntry {
    pub track: MusicTrack,
    pub playing_at: PlayingDateTime,
}

/// One advertisement occurrence scheduled at a point in time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdvertEntry {
    pub advertisement: Advertisement,
    pub playing_at: PlayingDateTime,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Playlist {
    /// `None` until the playlist has been persisted.
    pub id: Option<DbId>,
    pub venue_id: DbId,
    pub date: NaiveDate,
    music: Vec<MusicEntry>,
    adverts: Vec<AdvertEntry>,
    /// Fraction of the advert capacity in use.
    pub loading: f64,
    pub unique_advert_count: i32,
    pub total_advert_count: i32,
    pub overloaded: bool,
}

impl Playlist {
    /// A new, empty, unpersisted playlist.
    pub fn new(venue_id: DbId, date: NaiveDate) -> Self {
        Self {
            id: None,
            venue_id,
            date,
            music: Vec::new(),
            adverts: Vec::new(),
            loading: 0.0,
            unique_advert_count: 0,
            total_advert_count: 0,
            overloaded: false,
        }
    }

    /// Rehydrate a stored playlist with its entries.
    pub fn restore(
        id: DbId,
        venue_id: DbId,
        date: NaiveDate,
        music: Vec<MusicEntry>,
        adverts: Vec<AdvertEntry>,
        loading: f64,
        overloaded: bool,
    ) -> Self {
        let mut playlist = Self::new(venue_id, date);
        playlist.id = Some(id);
        playlist.loading = loading;
        playlist.overloaded = overloaded;
        playlist.replace_entries(music, adverts);
        playlist
    }

    pub fn music(&self) -> &[MusicEntry] {
        &self.music
    }

    pub fn adverts(&self) -> &[AdvertEntry] {
        &self.adverts
    }

    /// Swap in freshly built entry lists.
    ///
    /// Both lists are kept ordered by `playing_at`; the sort is stable so
    /// entries sharing a start time keep their build order.
    pub fn replace_entries(&mut self, mut music: Vec<MusicEntry>, mut adverts: Vec<AdvertEntry>) {
        music.sort_by_key(|e| e.playing_at);
        adverts.sort_by_key(|e| e.playing_at);

        let unique: HashSet<DbId> = adverts.iter().map(|e| e.advertisement.id).collect();
        self.unique_advert_count = unique.len() as i32;
        self.total_advert_count = adverts.len() as i32;
        self.music = music;
        self.adverts = adverts;
    }
}
