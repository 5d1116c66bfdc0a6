//! Driver record store and snapshot persistence
//!
//! This module holds the single owner of tournament state and the
//! backends that save and load it as whole snapshots.

pub mod records;
pub mod snapshot;

// Re-export commonly used types
pub use records::DriverRecordStore;
pub use snapshot::{InMemorySnapshotStore, JsonFileSnapshotStore, Snapshot, SnapshotStore};
