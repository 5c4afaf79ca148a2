use crate::types::DbId;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    #[error("Venue {venue_id} has no music tracks to play")]
    EmptyTrackSource { venue_id: DbId },

    #[error("Internal error: {0}")]
    Internal(String),
}
