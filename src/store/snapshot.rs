//! Snapshot format and snapshot persistence
//!
//! A snapshot is the complete tournament state: registered divisions, drivers
//! with counters and status override, and the race history. It is always
//! written whole, never incrementally.

use crate::error::{Result, TournamentError};
use crate::types::{Driver, Race, RaceNumber};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::RwLock;

/// Current snapshot document version
pub const SNAPSHOT_VERSION: u32 = 1;

/// Serialized tournament state sufficient for a full reload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default = "crate::utils::current_timestamp")]
    pub saved_at: DateTime<Utc>,
    #[serde(default)]
    pub divisions: Vec<String>,
    #[serde(default)]
    pub drivers: Vec<Driver>,
    #[serde(default)]
    pub races: Vec<Race>,
    #[serde(default)]
    pub race_counter: RaceNumber,
}

fn default_version() -> u32 {
    SNAPSHOT_VERSION
}

impl Snapshot {
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| {
            TournamentError::persistence(format!("Failed to serialize snapshot: {}", e))
        })
    }

    pub fn from_json(data: &str) -> Result<Self> {
        serde_json::from_str(data)
            .map_err(|e| TournamentError::validation(format!("Invalid snapshot document: {}", e)))
    }
}

/// Trait for snapshot persistence backends
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    /// Persist a whole snapshot, replacing the previous one
    async fn save(&self, snapshot: &Snapshot) -> Result<()>;

    /// Load the last saved snapshot, if any
    async fn load(&self) -> Result<Option<Snapshot>>;

    /// Human-readable location, for logs and health output
    fn describe(&self) -> String;
}

/// JSON file snapshot store
///
/// Writes go to a sibling temporary file which is then renamed over the
/// target, so a crash mid-write never leaves a truncated snapshot.
#[derive(Debug, Clone)]
pub struct JsonFileSnapshotStore {
    path: PathBuf,
}

impl JsonFileSnapshotStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "snapshot".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

#[async_trait]
impl SnapshotStore for JsonFileSnapshotStore {
    async fn save(&self, snapshot: &Snapshot) -> Result<()> {
        let data = snapshot.to_json()?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                TournamentError::persistence(format!(
                    "Failed to create directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }

        let temp = self.temp_path();
        tokio::fs::write(&temp, data.as_bytes()).await.map_err(|e| {
            TournamentError::persistence(format!("Failed to write {}: {}", temp.display(), e))
        })?;
        tokio::fs::rename(&temp, &self.path).await.map_err(|e| {
            TournamentError::persistence(format!(
                "Failed to move snapshot into {}: {}",
                self.path.display(),
                e
            ))
        })?;

        Ok(())
    }

    async fn load(&self) -> Result<Option<Snapshot>> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(data) => Snapshot::from_json(&data).map(Some),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(TournamentError::persistence(format!(
                "Failed to read {}: {}",
                self.path.display(),
                e
            ))),
        }
    }

    fn describe(&self) -> String {
        format!("file:{}", self.path.display())
    }
}

/// In-memory snapshot store for tests and file-less deployments
#[derive(Debug, Default)]
pub struct InMemorySnapshotStore {
    snapshot: RwLock<Option<Snapshot>>,
    saves: RwLock<usize>,
}

impl InMemorySnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with a preloaded snapshot
    pub fn with_snapshot(snapshot: Snapshot) -> Self {
        Self {
            snapshot: RwLock::new(Some(snapshot)),
            saves: RwLock::new(0),
        }
    }

    /// Number of completed saves (for testing)
    pub fn save_count(&self) -> usize {
        self.saves.read().map(|count| *count).unwrap_or_default()
    }

    /// Last saved snapshot (for testing)
    pub fn last_snapshot(&self) -> Option<Snapshot> {
        self.snapshot
            .read()
            .map(|snapshot| snapshot.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl SnapshotStore for InMemorySnapshotStore {
    async fn save(&self, snapshot: &Snapshot) -> Result<()> {
        let mut stored = self.snapshot.write().map_err(|_| TournamentError::Internal {
            message: "Failed to acquire snapshot write lock".to_string(),
        })?;
        *stored = Some(snapshot.clone());
        drop(stored);

        if let Ok(mut saves) = self.saves.write() {
            *saves += 1;
        }
        Ok(())
    }

    async fn load(&self) -> Result<Option<Snapshot>> {
        let stored = self.snapshot.read().map_err(|_| TournamentError::Internal {
            message: "Failed to acquire snapshot read lock".to_string(),
        })?;
        Ok(stored.clone())
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::DriverRecordStore;

    fn sample_snapshot() -> Snapshot {
        let mut store = DriverRecordStore::new();
        store.add_driver("Alice", "Pro").unwrap();
        store.add_driver("Bob", "Pro").unwrap();
        store.snapshot()
    }

    #[tokio::test]
    async fn test_file_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileSnapshotStore::new(dir.path().join("nested").join("tournament.json"));

        assert!(store.load().await.unwrap().is_none());

        let snapshot = sample_snapshot();
        store.save(&snapshot).await.unwrap();

        let loaded = store.load().await.unwrap().unwrap();
        assert_eq!(loaded, snapshot);
        assert!(!store.temp_path().exists());
        assert!(store.describe().starts_with("file:"));
    }

    #[tokio::test]
    async fn test_file_store_rejects_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tournament.json");
        std::fs::write(&path, "not json").unwrap();

        let store = JsonFileSnapshotStore::new(&path);
        let err = store.load().await.unwrap_err();
        assert!(matches!(err, TournamentError::Validation { .. }));
    }

    #[tokio::test]
    async fn test_in_memory_store() {
        let store = InMemorySnapshotStore::new();
        assert!(store.load().await.unwrap().is_none());

        store.save(&sample_snapshot()).await.unwrap();
        store.save(&sample_snapshot()).await.unwrap();

        assert_eq!(store.save_count(), 2);
        assert_eq!(store.last_snapshot().unwrap().drivers.len(), 2);
    }

    #[test]
    fn test_snapshot_defaults_for_minimal_document() {
        let snapshot = Snapshot::from_json(
            r#"{"drivers": [{"name": "Alice", "division": "Pro"}]}"#,
        )
        .unwrap();
        assert_eq!(snapshot.version, SNAPSHOT_VERSION);
        assert_eq!(snapshot.drivers[0].wins(), 0);
        assert!(snapshot.races.is_empty());
    }
}
