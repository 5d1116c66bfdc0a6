//! Drag race tournament manager
//!
//! Keeps drivers, divisions and the race history of an elimination-style
//! drag race event, derives rankings, and serves it all over HTTP.

pub mod api;
pub mod config;
pub mod error;
pub mod exchange;
pub mod metrics;
pub mod race;
pub mod ranking;
pub mod service;
pub mod store;
pub mod types;
pub mod utils;

// Re-export commonly used types and traits
pub use error::{Result, TournamentError};
pub use types::*;

// Re-export key components
pub use race::{record_race, RaceRecorder, RecordRaceCommand};
pub use ranking::{rankings, rankings_with, StandingsFilter};
pub use store::{DriverRecordStore, Snapshot, SnapshotStore};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
