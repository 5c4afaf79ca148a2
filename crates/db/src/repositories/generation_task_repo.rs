//! Repository for the `playlist_generation_tasks` queue.

use sqlx::PgPool;
use venuecast_core::types::{DbId, Timestamp};

use crate::models::generation_task::{CreateGenerationTask, GenerationTask};

/// Column list for `playlist_generation_tasks` queries.
const COLUMNS: &str = "id, advertisement_id, registered_at, is_finished, finished_at";

/// Provides queue operations for playlist generation tasks.
pub struct GenerationTaskRepo;

impl GenerationTaskRepo {
    /// Register a demand change for an advertisement.
    pub async fn enqueue(
        pool: &PgPool,
        input: &CreateGenerationTask,
    ) -> Result<GenerationTask, sqlx::Error> {
        let query = format!(
            "INSERT INTO playlist_generation_tasks (advertisement_id) \
             VALUES ($1) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, GenerationTask>(&query)
            .bind(input.advertisement_id)
            .fetch_one(pool)
            .await
    }

    /// All unfinished tasks, oldest registration first.
    pub async fn list_unfinished(pool: &PgPool) -> Result<Vec<GenerationTask>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM playlist_generation_tasks \
             WHERE is_finished = false \
             ORDER BY registered_at, id"
        );
        sqlx::query_as::<_, GenerationTask>(&query)
            .fetch_all(pool)
            .await
    }

    /// Unfinished tasks registered before `cutoff`.
    pub async fn list_stale(
        pool: &PgPool,
        cutoff: Timestamp,
    ) -> Result<Vec<GenerationTask>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM playlist_generation_tasks \
             WHERE is_finished = false AND registered_at < $1 \
             ORDER BY registered_at, id"
        );
        sqlx::query_as::<_, GenerationTask>(&query)
            .bind(cutoff)
            .fetch_all(pool)
            .await
    }

    /// Mark tasks finished. Already finished tasks keep their `finished_at`.
    pub async fn mark_finished(pool: &PgPool, ids: &[DbId]) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE playlist_generation_tasks \
             SET is_finished = true, finished_at = NOW() \
             WHERE id = ANY($1) AND is_finished = false",
        )
        .bind(ids)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }
}
