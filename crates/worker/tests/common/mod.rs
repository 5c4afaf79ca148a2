//! In-memory collaborators shared by the worker integration tests.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime, TimeZone, Utc};
use tokio::sync::Notify;
use venuecast_core::loading::AirtimeLoadEvaluator;
use venuecast_core::playlist::Playlist;
use venuecast_core::track::{AdvertDemand, Advertisement, MusicTrack};
use venuecast_core::types::{DbId, Timestamp};
use venuecast_core::venue::VenueConfig;
use venuecast_db::models::generation_task::GenerationTask;
use venuecast_worker::error::{WorkerError, WorkerResult};
use venuecast_worker::generator::PlaylistGenerator;
use venuecast_worker::store::{
    DemandStore, PersistMode, PlaylistStore, TaskQueue, TrackCycleSource, VenueLookup,
    WatchdogReporter,
};

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// A Monday.
pub fn monday() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 3, 2).unwrap()
}

/// A Sunday.
pub fn sunday() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 3, 8).unwrap()
}

/// 08:00 to 22:00, closed on Sundays, 90 second advert blocks.
pub fn venue(id: DbId) -> VenueConfig {
    VenueConfig {
        id,
        name: format!("venue-{id}"),
        begin_time: NaiveTime::from_hms_opt(8, 0, 0).unwrap(),
        end_time: NaiveTime::from_hms_opt(22, 0, 0).unwrap(),
        free_days: vec![chrono::Weekday::Sun],
        max_advert_block_secs: 90,
    }
}

pub fn tracks() -> Vec<MusicTrack> {
    vec![
        MusicTrack {
            id: 1,
            name: "first".into(),
            duration_secs: 180.0,
        },
        MusicTrack {
            id: 2,
            name: "second".into(),
            duration_secs: 240.5,
        },
    ]
}

pub fn advert(id: DbId, duration_secs: f64) -> Advertisement {
    Advertisement {
        id,
        name: format!("advert-{id}"),
        duration_secs,
        created_at: Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, id as u32).unwrap(),
    }
}

pub fn demand(id: DbId, duration_secs: f64, repeat_count: u32) -> AdvertDemand {
    AdvertDemand {
        advertisement: advert(id, duration_secs),
        repeat_count,
    }
}

pub fn task(id: DbId, advertisement_id: DbId, registered_at: Timestamp) -> GenerationTask {
    GenerationTask {
        id,
        advertisement_id,
        registered_at,
        is_finished: false,
        finished_at: None,
    }
}

// ---------------------------------------------------------------------------
// InMemoryStore
// ---------------------------------------------------------------------------

#[derive(Default)]
struct State {
    venues: HashMap<DbId, VenueConfig>,
    tracks: HashMap<DbId, Vec<MusicTrack>>,
    demand: HashMap<(DbId, NaiveDate), Vec<AdvertDemand>>,
    playlists: HashMap<(DbId, NaiveDate), Playlist>,
    logs: Vec<(DbId, NaiveDate, String)>,
    next_playlist_id: DbId,
    tasks: Vec<GenerationTask>,
    affected: HashMap<DbId, Vec<(DbId, NaiveDate)>>,
    failing_venues: HashSet<DbId>,
    unfinished_calls: usize,
}

/// Holds the first `unfinished()` call until released.
struct Gate {
    entered: Arc<Notify>,
    release: Arc<Notify>,
}

/// Implements every collaborator over shared in-memory state.
#[derive(Default)]
pub struct InMemoryStore {
    state: Mutex<State>,
    gate: Mutex<Option<Gate>>,
}

impl InMemoryStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn add_venue(&self, venue: VenueConfig, tracks: Vec<MusicTrack>) {
        let mut state = self.state.lock().unwrap();
        state.tracks.insert(venue.id, tracks);
        state.venues.insert(venue.id, venue);
    }

    pub fn set_demand(&self, venue_id: DbId, date: NaiveDate, demand: Vec<AdvertDemand>) {
        self.state
            .lock()
            .unwrap()
            .demand
            .insert((venue_id, date), demand);
    }

    pub fn insert_playlist(&self, mut playlist: Playlist) -> DbId {
        let mut state = self.state.lock().unwrap();
        state.next_playlist_id += 1;
        let id = state.next_playlist_id;
        playlist.id = Some(id);
        state
            .playlists
            .insert((playlist.venue_id, playlist.date), playlist);
        id
    }

    pub fn playlist(&self, venue_id: DbId, date: NaiveDate) -> Option<Playlist> {
        self.state
            .lock()
            .unwrap()
            .playlists
            .get(&(venue_id, date))
            .cloned()
    }

    pub fn logs_for(&self, venue_id: DbId, date: NaiveDate) -> Vec<String> {
        self.state
            .lock()
            .unwrap()
            .logs
            .iter()
            .filter(|(v, d, _)| *v == venue_id && *d == date)
            .map(|(_, _, body)| body.clone())
            .collect()
    }

    /// Make every playlist write for `venue_id` fail.
    pub fn fail_writes_for(&self, venue_id: DbId) {
        self.state.lock().unwrap().failing_venues.insert(venue_id);
    }

    pub fn add_task(&self, task: GenerationTask) {
        self.state.lock().unwrap().tasks.push(task);
    }

    pub fn set_affected(&self, advertisement_id: DbId, units: Vec<(DbId, NaiveDate)>) {
        self.state
            .lock()
            .unwrap()
            .affected
            .insert(advertisement_id, units);
    }

    pub fn finished_task_ids(&self) -> Vec<DbId> {
        self.state
            .lock()
            .unwrap()
            .tasks
            .iter()
            .filter(|t| t.is_finished)
            .map(|t| t.id)
            .collect()
    }

    pub fn unfinished_calls(&self) -> usize {
        self.state.lock().unwrap().unfinished_calls
    }

    /// Block the next `unfinished()` call until `release` is notified;
    /// `entered` is notified once the call is waiting.
    pub fn hold_next_poll(&self) -> (Arc<Notify>, Arc<Notify>) {
        let entered = Arc::new(Notify::new());
        let release = Arc::new(Notify::new());
        *self.gate.lock().unwrap() = Some(Gate {
            entered: Arc::clone(&entered),
            release: Arc::clone(&release),
        });
        (entered, release)
    }

    fn write_guard(&self, venue_id: DbId) -> WorkerResult<()> {
        if self.state.lock().unwrap().failing_venues.contains(&venue_id) {
            return Err(WorkerError::Database(sqlx::Error::PoolTimedOut));
        }
        Ok(())
    }
}

#[async_trait]
impl VenueLookup for InMemoryStore {
    async fn find_venue(&self, venue_id: DbId) -> WorkerResult<Option<VenueConfig>> {
        Ok(self.state.lock().unwrap().venues.get(&venue_id).cloned())
    }

    async fn venues_missing_playlist(&self, date: NaiveDate) -> WorkerResult<Vec<DbId>> {
        let state = self.state.lock().unwrap();
        let mut ids: Vec<DbId> = state
            .venues
            .keys()
            .copied()
            .filter(|id| !state.playlists.contains_key(&(*id, date)))
            .collect();
        ids.sort_unstable();
        Ok(ids)
    }
}

#[async_trait]
impl TrackCycleSource for InMemoryStore {
    async fn load_for_venue(&self, venue_id: DbId) -> WorkerResult<Vec<MusicTrack>> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .tracks
            .get(&venue_id)
            .cloned()
            .unwrap_or_default())
    }
}

#[async_trait]
impl DemandStore for InMemoryStore {
    async fn demand_for(
        &self,
        venue_id: DbId,
        date: NaiveDate,
    ) -> WorkerResult<Vec<AdvertDemand>> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .demand
            .get(&(venue_id, date))
            .cloned()
            .unwrap_or_default())
    }

    async fn find_playlist(
        &self,
        venue_id: DbId,
        date: NaiveDate,
    ) -> WorkerResult<Option<Playlist>> {
        Ok(self.playlist(venue_id, date))
    }

    async fn affected_units(
        &self,
        advertisement_id: DbId,
        _from: NaiveDate,
    ) -> WorkerResult<Vec<(DbId, NaiveDate)>> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .affected
            .get(&advertisement_id)
            .cloned()
            .unwrap_or_default())
    }
}

#[async_trait]
impl PlaylistStore for InMemoryStore {
    async fn save_generated(
        &self,
        playlist: &Playlist,
        log: &str,
        mode: PersistMode,
    ) -> WorkerResult<DbId> {
        self.write_guard(playlist.venue_id)?;

        let mut state = self.state.lock().unwrap();
        let id = match (mode, playlist.id) {
            (PersistMode::InPlace, Some(id)) => id,
            _ => {
                state.next_playlist_id += 1;
                state.next_playlist_id
            }
        };
        let mut stored = playlist.clone();
        stored.id = Some(id);
        state
            .playlists
            .insert((playlist.venue_id, playlist.date), stored);
        state
            .logs
            .push((playlist.venue_id, playlist.date, log.to_string()));
        Ok(id)
    }

    async fn delete_playlist(&self, playlist_id: DbId) -> WorkerResult<bool> {
        let mut state = self.state.lock().unwrap();
        let before = state.playlists.len();
        state.playlists.retain(|_, p| p.id != Some(playlist_id));
        Ok(state.playlists.len() < before)
    }
}

#[async_trait]
impl TaskQueue for InMemoryStore {
    async fn unfinished(&self) -> WorkerResult<Vec<GenerationTask>> {
        self.state.lock().unwrap().unfinished_calls += 1;

        let gate = self.gate.lock().unwrap().take();
        if let Some(gate) = gate {
            gate.entered.notify_one();
            gate.release.notified().await;
        }

        let state = self.state.lock().unwrap();
        let mut tasks: Vec<GenerationTask> =
            state.tasks.iter().filter(|t| !t.is_finished).cloned().collect();
        tasks.sort_by_key(|t| (t.registered_at, t.id));
        Ok(tasks)
    }

    async fn stale(&self, cutoff: Timestamp) -> WorkerResult<Vec<GenerationTask>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .tasks
            .iter()
            .filter(|t| !t.is_finished && t.registered_at < cutoff)
            .cloned()
            .collect())
    }

    async fn mark_finished(&self, task_ids: &[DbId]) -> WorkerResult<u64> {
        let mut state = self.state.lock().unwrap();
        let mut count = 0;
        for task in state.tasks.iter_mut() {
            if task_ids.contains(&task.id) && !task.is_finished {
                task.is_finished = true;
                task.finished_at = Some(Utc::now());
                count += 1;
            }
        }
        Ok(count)
    }
}

// ---------------------------------------------------------------------------
// RecordingReporter
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct RecordingReporter {
    pub reported: Mutex<Vec<DbId>>,
}

#[async_trait]
impl WatchdogReporter for RecordingReporter {
    async fn report_stuck(&self, tasks: &[GenerationTask]) {
        self.reported
            .lock()
            .unwrap()
            .extend(tasks.iter().map(|t| t.id));
    }
}

/// A generator wired to `store` for every collaborator.
pub fn generator_for(store: &Arc<InMemoryStore>) -> Arc<PlaylistGenerator> {
    Arc::new(PlaylistGenerator::new(
        store.clone(),
        store.clone(),
        store.clone(),
        store.clone(),
        Arc::new(AirtimeLoadEvaluator::default()),
    ))
}
