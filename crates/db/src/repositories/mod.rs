//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods. Reads
//! accept `&PgPool`; writes that must share a transaction accept
//! `&mut PgConnection` so the caller owns the transaction boundary.

pub mod advertisement_repo;
pub mod generation_task_repo;
pub mod music_track_repo;
pub mod playlist_repo;
pub mod venue_repo;

pub use advertisement_repo::AdvertisementRepo;
pub use generation_task_repo::GenerationTaskRepo;
pub use music_track_repo::MusicTrackRepo;
pub use playlist_repo::PlaylistRepo;
pub use venue_repo::VenueRepo;
