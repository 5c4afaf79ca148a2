//! Integration tests for the playlist and demand repositories.
//!
//! Exercises the repository layer against a real database. Ignored by
//! default; run with `cargo test -p venuecast-db -- --ignored` and a
//! `DATABASE_URL` pointing at a disposable PostgreSQL instance.

use chrono::{NaiveDate, NaiveTime};
use sqlx::PgPool;
use venuecast_core::playlist::{AdvertEntry, MusicEntry, Playlist};
use venuecast_db::models::advertisement::{CreateAdvertisement, UpsertAdvertDemand};
use venuecast_db::models::generation_task::CreateGenerationTask;
use venuecast_db::models::music_track::CreateMusicTrack;
use venuecast_db::models::venue::CreateVenue;
use venuecast_db::repositories::{
    AdvertisementRepo, GenerationTaskRepo, MusicTrackRepo, PlaylistRepo, VenueRepo,
};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 3, 2).unwrap()
}

fn new_venue(name: &str) -> CreateVenue {
    CreateVenue {
        name: name.to_string(),
        begin_time: NaiveTime::from_hms_opt(8, 0, 0).unwrap(),
        end_time: NaiveTime::from_hms_opt(22, 0, 0).unwrap(),
        free_days: vec![7],
        max_advert_block_secs: 90,
    }
}

fn new_advert(name: &str) -> CreateAdvertisement {
    CreateAdvertisement {
        name: name.to_string(),
        duration_secs: 30.0,
        valid_from: NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
        valid_until: None,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_venue_config_round_trip(pool: PgPool) {
    let venue = VenueRepo::create(&pool, &new_venue("Lobby")).await.unwrap();
    let found = VenueRepo::find_by_id(&pool, venue.id).await.unwrap().unwrap();
    let config = found.to_config();
    assert_eq!(config.max_advert_block_secs, 90);
    assert_eq!(config.free_days, vec![chrono::Weekday::Sun]);
}

#[sqlx::test(migrations = "../../db/migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_banned_tracks_excluded_from_rotation(pool: PgPool) {
    let venue = VenueRepo::create(&pool, &new_venue("Hall")).await.unwrap();
    let mut ids = Vec::new();
    for name in ["a", "b", "c"] {
        let track = MusicTrackRepo::create(
            &pool,
            &CreateMusicTrack { name: name.to_string(), duration_secs: 180.0 },
        )
        .await
        .unwrap();
        ids.push(track.id);
    }
    MusicTrackRepo::assign_to_venue(&pool, venue.id, ids[2], 0).await.unwrap();
    MusicTrackRepo::assign_to_venue(&pool, venue.id, ids[0], 1).await.unwrap();
    MusicTrackRepo::assign_to_venue(&pool, venue.id, ids[1], 2).await.unwrap();
    MusicTrackRepo::ban_for_venue(&pool, venue.id, ids[0]).await.unwrap();

    let rotation = MusicTrackRepo::list_for_venue(&pool, venue.id).await.unwrap();
    let order: Vec<i64> = rotation.iter().map(|t| t.id).collect();
    assert_eq!(order, vec![ids[2], ids[1]]);
}

#[sqlx::test(migrations = "../../db/migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_playlist_insert_load_and_cascade_delete(pool: PgPool) {
    let venue = VenueRepo::create(&pool, &new_venue("Court")).await.unwrap();
    let track = MusicTrackRepo::create(
        &pool,
        &CreateMusicTrack { name: "song".to_string(), duration_secs: 200.0 },
    )
    .await
    .unwrap();
    let advert = AdvertisementRepo::create(&pool, &new_advert("spot")).await.unwrap();

    let mut playlist = Playlist::new(venue.id, day());
    playlist.replace_entries(
        vec![MusicEntry {
            track: track.to_track(),
            playing_at: day().and_hms_opt(8, 0, 0).unwrap(),
        }],
        vec![AdvertEntry {
            advertisement: venuecast_core::track::Advertisement {
                id: advert.id,
                name: advert.name.clone(),
                duration_secs: advert.duration_secs,
                created_at: advert.created_at,
            },
            playing_at: day().and_hms_opt(8, 3, 1).unwrap(),
        }],
    );

    let mut tx = pool.begin().await.unwrap();
    let id = PlaylistRepo::insert(&mut *tx, &playlist).await.unwrap();
    PlaylistRepo::append_log(&mut *tx, venue.id, day(), Some(id), "trace").await.unwrap();
    tx.commit().await.unwrap();

    let loaded = PlaylistRepo::load_aggregate(&pool, venue.id, day()).await.unwrap().unwrap();
    assert_eq!(loaded.id, Some(id));
    assert_eq!(loaded.music().len(), 1);
    assert_eq!(loaded.adverts().len(), 1);
    assert_eq!(loaded.total_advert_count, 1);

    let mut conn = pool.acquire().await.unwrap();
    assert!(PlaylistRepo::delete(&mut *conn, id).await.unwrap());
    drop(conn);

    let entries = PlaylistRepo::list_music_entries(&pool, id).await.unwrap();
    assert!(entries.is_empty(), "entries should cascade with the playlist");

    let logs = PlaylistRepo::list_logs(&pool, venue.id, day()).await.unwrap();
    assert_eq!(logs.len(), 1, "logs should survive playlist deletion");
    assert_eq!(logs[0].playlist_id, None);
}

#[sqlx::test(migrations = "../../db/migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_pending_demand_hides_venue_from_bulk_candidates(pool: PgPool) {
    let quiet = VenueRepo::create(&pool, &new_venue("Quiet")).await.unwrap();
    let busy = VenueRepo::create(&pool, &new_venue("Busy")).await.unwrap();
    let advert = AdvertisementRepo::create(&pool, &new_advert("spot")).await.unwrap();
    AdvertisementRepo::upsert_demand(
        &pool,
        &UpsertAdvertDemand {
            advertisement_id: advert.id,
            venue_id: busy.id,
            demand_date: day(),
            repeat_count: 3,
        },
    )
    .await
    .unwrap();
    GenerationTaskRepo::enqueue(&pool, &CreateGenerationTask { advertisement_id: advert.id })
        .await
        .unwrap();

    let candidates = VenueRepo::list_missing_playlist(&pool, day()).await.unwrap();
    assert!(candidates.contains(&quiet.id));
    assert!(!candidates.contains(&busy.id));
}

#[sqlx::test(migrations = "../../db/migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_valid_demand_respects_lifetime_and_zero_counts(pool: PgPool) {
    let venue = VenueRepo::create(&pool, &new_venue("Gate")).await.unwrap();
    let live = AdvertisementRepo::create(&pool, &new_advert("live")).await.unwrap();
    let expired = AdvertisementRepo::create(
        &pool,
        &CreateAdvertisement {
            valid_until: Some(NaiveDate::from_ymd_opt(2026, 2, 1).unwrap()),
            ..new_advert("expired")
        },
    )
    .await
    .unwrap();
    let zero = AdvertisementRepo::create(&pool, &new_advert("zero")).await.unwrap();

    for (advert_id, repeat_count) in [(live.id, 2), (expired.id, 2), (zero.id, 0)] {
        AdvertisementRepo::upsert_demand(
            &pool,
            &UpsertAdvertDemand {
                advertisement_id: advert_id,
                venue_id: venue.id,
                demand_date: day(),
                repeat_count,
            },
        )
        .await
        .unwrap();
    }

    let demand = AdvertisementRepo::list_valid_demand(&pool, venue.id, day()).await.unwrap();
    assert_eq!(demand.len(), 1);
    assert_eq!(demand[0].advertisement_id, live.id);
    assert_eq!(demand[0].to_demand().repeat_count, 2);
}
