//! Background drivers that decide which playlists to (re)generate.

pub mod demand;
pub mod empty_day;

pub use demand::{DemandDriver, PassSummary};
pub use empty_day::EmptyDayDriver;
