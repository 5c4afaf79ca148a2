//! Playlist generation task queue model.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use venuecast_core::types::{DbId, Timestamp};

/// A row from the `playlist_generation_tasks` table.
///
/// Each task records that the demand of one advertisement changed and the
/// playlists it touches must be regenerated.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
pub struct GenerationTask {
    pub id: DbId,
    pub advertisement_id: DbId,
    pub registered_at: Timestamp,
    pub is_finished: bool,
    pub finished_at: Option<Timestamp>,
}

/// DTO for enqueueing a task.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateGenerationTask {
    pub advertisement_id: DbId,
}
