//! Rankings and tournament statistics
//!
//! Everything here is a pure read over the driver record store.

pub mod engine;
pub mod stats;

// Re-export commonly used types
pub use engine::{active_drivers, rankings, rankings_with, standing_order, StandingsFilter};
pub use stats::tournament_stats;
