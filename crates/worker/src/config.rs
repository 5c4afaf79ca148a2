use std::str::FromStr;
use std::time::Duration;

use chrono::{NaiveTime, TimeDelta};
use venuecast_core::loading::DEFAULT_OVERLOAD_THRESHOLD;

use crate::error::{WorkerError, WorkerResult};

/// Worker configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// PostgreSQL connection string.
    pub database_url: String,
    /// Connection pool size (default: `10`).
    pub db_max_connections: u32,
    /// How often the demand driver polls the task queue (default: 30s).
    pub demand_poll_interval: Duration,
    /// Fixed pause between two generation units (default: 1000ms).
    pub unit_delay: Duration,
    /// UTC time of day of the daily empty-day pass (default: `01:00`).
    pub bulk_generation_at: NaiveTime,
    /// How often the watchdog looks for stuck tasks (default: 300s).
    pub watchdog_interval: Duration,
    /// Age after which an unfinished task counts as stuck (default: 30min).
    pub max_generation: TimeDelta,
    /// Loading fraction above which a playlist is overloaded (default: `0.95`).
    pub overload_threshold: f64,
}

impl WorkerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                     | Default    |
    /// |-----------------------------|------------|
    /// | `DATABASE_URL`              | (required) |
    /// | `DB_MAX_CONNECTIONS`        | `10`       |
    /// | `DEMAND_POLL_INTERVAL_SECS` | `30`       |
    /// | `UNIT_DELAY_MS`             | `1000`     |
    /// | `BULK_GENERATION_AT`        | `01:00`    |
    /// | `WATCHDOG_INTERVAL_SECS`    | `300`      |
    /// | `MAX_GENERATION_MINUTES`    | `30`       |
    /// | `OVERLOAD_THRESHOLD`        | `0.95`     |
    pub fn from_env() -> WorkerResult<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build the configuration from an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> WorkerResult<Self> {
        let database_url = lookup("DATABASE_URL")
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| WorkerError::Config("DATABASE_URL is required".into()))?;

        let db_max_connections: u32 = parse_var(&lookup, "DB_MAX_CONNECTIONS", 10)?;
        let demand_poll_secs: u64 = parse_var(&lookup, "DEMAND_POLL_INTERVAL_SECS", 30)?;
        let unit_delay_ms: u64 = parse_var(&lookup, "UNIT_DELAY_MS", 1000)?;
        let watchdog_secs: u64 = parse_var(&lookup, "WATCHDOG_INTERVAL_SECS", 300)?;
        let max_generation_minutes: i64 = parse_var(&lookup, "MAX_GENERATION_MINUTES", 30)?;
        let overload_threshold: f64 =
            parse_var(&lookup, "OVERLOAD_THRESHOLD", DEFAULT_OVERLOAD_THRESHOLD)?;

        let bulk_generation_at = match lookup("BULK_GENERATION_AT") {
            Some(raw) => parse_time_of_day(&raw)?,
            None => NaiveTime::from_hms_opt(1, 0, 0)
                .ok_or_else(|| WorkerError::Config("invalid default bulk time".into()))?,
        };

        if demand_poll_secs == 0 || watchdog_secs == 0 {
            return Err(WorkerError::Config(
                "poll and watchdog intervals must be positive".into(),
            ));
        }
        if max_generation_minutes <= 0 {
            return Err(WorkerError::Config(
                "MAX_GENERATION_MINUTES must be positive".into(),
            ));
        }
        if !overload_threshold.is_finite() || overload_threshold < 0.0 {
            return Err(WorkerError::Config(
                "OVERLOAD_THRESHOLD must be a non-negative number".into(),
            ));
        }

        Ok(Self {
            database_url,
            db_max_connections,
            demand_poll_interval: Duration::from_secs(demand_poll_secs),
            unit_delay: Duration::from_millis(unit_delay_ms),
            bulk_generation_at,
            watchdog_interval: Duration::from_secs(watchdog_secs),
            max_generation: TimeDelta::minutes(max_generation_minutes),
            overload_threshold,
        })
    }
}

fn parse_var<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &str,
    default: T,
) -> WorkerResult<T> {
    match lookup(name) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| WorkerError::Config(format!("{name} has an invalid value '{raw}'"))),
        None => Ok(default),
    }
}

/// Accepts `HH:MM` and `HH:MM:SS`.
fn parse_time_of_day(raw: &str) -> WorkerResult<NaiveTime> {
    let raw = raw.trim();
    NaiveTime::parse_from_str(raw, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M:%S"))
        .map_err(|_| WorkerError::Config(format!("BULK_GENERATION_AT has an invalid value '{raw}'")))
}
