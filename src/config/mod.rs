//! Configuration management for the drag race service
//!
//! Loading from environment variables and TOML files, validation and defaults.

pub mod app;
pub mod tournament;

// Re-export commonly used types
pub use app::{validate_config, AppConfig, ServiceSettings, StorageSettings};
pub use tournament::{TournamentConfig, DEFAULT_DIVISIONS};
