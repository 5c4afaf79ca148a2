use venuecast_core::error::CoreError;

/// Error type for generation units and driver passes.
///
/// Wraps [`CoreError`] for domain failures and adds the worker's own
/// variants.
#[derive(Debug, thiserror::Error)]
pub enum WorkerError {
    /// A domain-level error from `venuecast_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A database error from sqlx.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Invalid or missing configuration.
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Convenience type alias for worker return values.
pub type WorkerResult<T> = Result<T, WorkerError>;
