//! Race recording
//!
//! Turns race submissions into typed commands and applies them to the
//! driver record store.

pub mod command;
pub mod recorder;

// Re-export commonly used types
pub use command::RecordRaceCommand;
pub use recorder::{record_race, RaceRecorder};
