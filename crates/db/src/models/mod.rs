//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - A `Deserialize` create DTO for inserts
//! - Conversions into the `venuecast_core` types used by generation

pub mod advertisement;
pub mod generation_task;
pub mod music_track;
pub mod playlist;
pub mod venue;
