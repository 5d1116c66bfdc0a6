//! Test fixtures shared by the integration test crates
#![allow(dead_code)]

use async_trait::async_trait;
use dragrace_manager::config::AppConfig;
use dragrace_manager::error::{Result, TournamentError};
use dragrace_manager::metrics::MetricsCollector;
use dragrace_manager::service::AppState;
use dragrace_manager::store::{DriverRecordStore, Snapshot, SnapshotStore};
use dragrace_manager::types::DivisionPolicy;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Snapshot store that can be switched into a failing mode
#[derive(Debug, Default)]
pub struct SwitchableSnapshotStore {
    stored: Mutex<Option<Snapshot>>,
    saves: AtomicUsize,
    failing: AtomicBool,
}

impl SwitchableSnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    pub fn stored(&self) -> Option<Snapshot> {
        self.stored
            .lock()
            .map(|stored| stored.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl SnapshotStore for SwitchableSnapshotStore {
    async fn save(&self, snapshot: &Snapshot) -> Result<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(TournamentError::persistence("simulated write failure"));
        }
        if let Ok(mut stored) = self.stored.lock() {
            *stored = Some(snapshot.clone());
        }
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn load(&self) -> Result<Option<Snapshot>> {
        Ok(self.stored())
    }

    fn describe(&self) -> String {
        "switchable".to_string()
    }
}

/// Configuration with the given divisions and autosave setting
pub fn test_config(divisions: &[&str], autosave: bool) -> AppConfig {
    let mut config = AppConfig::default();
    config.storage.autosave = autosave;
    config.tournament.divisions = divisions.iter().map(|d| d.to_string()).collect();
    config
}

/// Application state over the given snapshot store, not yet started
pub fn test_state(config: AppConfig, snapshots: Arc<dyn SnapshotStore>) -> Arc<AppState> {
    let metrics = Arc::new(MetricsCollector::new().expect("metrics collector"));
    Arc::new(AppState::with_components(config, snapshots, metrics))
}

/// Started application state with an in-memory snapshot store
pub async fn started_state(divisions: &[&str]) -> (Arc<AppState>, Arc<SwitchableSnapshotStore>) {
    let snapshots = Arc::new(SwitchableSnapshotStore::new());
    let state = test_state(test_config(divisions, true), snapshots.clone());
    state.start().await.expect("service start");
    (state, snapshots)
}

/// Store with drivers A, B and C in the Pro division
pub fn pro_store() -> DriverRecordStore {
    let mut store = DriverRecordStore::with_divisions(["Pro"], DivisionPolicy::Open);
    for name in ["A", "B", "C"] {
        store.add_driver(name, "Pro").expect("add driver");
    }
    store
}

/// Sum of wins and losses over every driver
pub fn counter_total(store: &DriverRecordStore) -> u32 {
    store
        .list_drivers(None)
        .iter()
        .map(|d| d.wins() + d.losses())
        .sum()
}
