//! Venue operating configuration.
//!
//! A [`VenueConfig`] is the immutable-per-run view of a venue: its daily
//! operating hours, the weekdays it stays silent, and the cap on a single
//! advertisement block. Opening hours may wrap past midnight.

use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta, Weekday};
use serde::Serialize;

use crate::types::DbId;

/// Operating hours and advertisement limits of a single venue.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VenueConfig {
    pub id: DbId,
    pub name: String,
    pub begin_time: NaiveTime,
    pub end_time: NaiveTime,
    /// Weekdays with no playback at all.
    pub free_days: Vec<Weekday>,
    /// Cap on the total audio length of one advertisement block.
    pub max_advert_block_secs: i64,
}

/// The concrete playback interval of a venue on one calendar date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OperatingWindow {
    pub begin: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl VenueConfig {
    /// Length of the daily operating window.
    ///
    /// `end_time <= begin_time` means the venue closes after midnight, so the
    /// difference wraps by 24 hours (equal times therefore mean a full day).
    pub fn work_time(&self) -> TimeDelta {
        let diff = self.end_time - self.begin_time;
        if self.end_time <= self.begin_time {
            diff + TimeDelta::hours(24)
        } else {
            diff
        }
    }

    /// Whether `date` falls on one of the venue's configured free days.
    pub fn is_free_day(&self, date: NaiveDate) -> bool {
        self.free_days.contains(&date.weekday())
    }

    /// The operating window starting on `date`.
    pub fn window(&self, date: NaiveDate) -> OperatingWindow {
        let begin = date.and_time(self.begin_time);
        OperatingWindow {
            begin,
            end: begin + self.work_time(),
        }
    }
}

/// Parse ISO weekday numbers (Monday = 1 .. Sunday = 7) into [`Weekday`]s.
///
/// Unknown numbers are ignored.
pub fn weekdays_from_iso(numbers: &[i16]) -> Vec<Weekday> {
    numbers
        .iter()
        .filter_map(|n| match n {
            1 => Some(Weekday::Mon),
            2 => Some(Weekday::Tue),
            3 => Some(Weekday::Wed),
            4 => Some(Weekday::Thu),
            5 => Some(Weekday::Fri),
            6 => Some(Weekday::Sat),
            7 => Some(Weekday::Sun),
            _ => None,
        })
        .collect()
}
