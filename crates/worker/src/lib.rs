//! `venuecast-worker` library crate.
//!
//! Re-exports internal modules for integration testing. The binary
//! entrypoint lives in `main.rs`.

pub mod config;
pub mod drivers;
pub mod error;
pub mod generator;
pub mod pass_guard;
pub mod pg_store;
pub mod store;
pub mod watchdog;
