//! Playlist generation domain logic.
//!
//! Pure functions and types with no database or runtime dependencies. The
//! worker crate feeds them with data loaded through its collaborator traits
//! and persists the outcome.
//!
//! - [`venue`]: operating hours and free days.
//! - [`track`]: music, advertisements and the cyclic music supply.
//! - [`demand`]: which advert occurrences a playlist must carry.
//! - [`timeline`]: the music and advertisement packing passes.
//! - [`loading`]: loading/overload evaluation.
//! - [`generation`]: the end-to-end pipeline and its outcome.

pub mod demand;
pub mod error;
pub mod generation;
pub mod generation_log;
pub mod loading;
pub mod playlist;
pub mod timeline;
pub mod track;
pub mod types;
pub mod venue;
