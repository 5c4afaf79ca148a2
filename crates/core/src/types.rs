/// All database primary keys are PostgreSQL BIGSERIAL.
pub type DbId = i64;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Venue-local wall-clock time of a playlist entry.
pub type PlayingDateTime = chrono::NaiveDateTime;
