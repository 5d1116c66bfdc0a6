//! Main application state and service coordination
//!
//! `AppState` owns the driver record store behind a tokio `RwLock`, the
//! snapshot backend and the metrics collector. Every mutation holds the write
//! lock across validation, the change itself and the autosave that follows.

use crate::config::AppConfig;
use crate::error::{Result as TournamentResult, TournamentError};
use crate::exchange::{self, ImportOptions, ImportReport};
use crate::metrics::MetricsCollector;
use crate::race::{RaceRecorder, RecordRaceCommand};
use crate::ranking::{self, StandingsFilter};
use crate::store::{
    DriverRecordStore, InMemorySnapshotStore, JsonFileSnapshotStore, Snapshot, SnapshotStore,
};
use crate::types::{
    Division, Driver, DriverStanding, DriverUpdate, Race, RaceResult, TournamentStats,
};
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;
use tokio::sync::{RwLock, RwLockWriteGuard};
use tracing::{debug, error, info, warn};

/// Service-level errors
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Service initialization error: {message}")]
    Initialization { message: String },

    #[error("Snapshot error: {message}")]
    Snapshot { message: String },
}

/// Main application state shared by every request handler
pub struct AppState {
    /// Application configuration
    config: AppConfig,

    /// The tournament itself
    store: Arc<RwLock<DriverRecordStore>>,

    /// Where snapshots are saved and loaded
    snapshots: Arc<dyn SnapshotStore>,

    /// Prometheus metrics
    metrics: Arc<MetricsCollector>,

    recorder: RaceRecorder,

    /// Last autosave failure, cleared by the next successful save
    last_save_error: Arc<RwLock<Option<String>>>,

    started_at: Instant,

    /// Service status
    is_running: Arc<RwLock<bool>>,
}

impl AppState {
    /// Initialize the application from configuration
    pub async fn new(config: AppConfig) -> Result<Self, ServiceError> {
        info!("Initializing drag race tournament service");

        let snapshots: Arc<dyn SnapshotStore> = match &config.storage.snapshot_path {
            Some(path) => Arc::new(JsonFileSnapshotStore::new(path)),
            None => Arc::new(InMemorySnapshotStore::new()),
        };
        info!(
            "Configuration: service={}, snapshots={}, autosave={}",
            config.service.name,
            snapshots.describe(),
            config.storage.autosave
        );

        let metrics = Arc::new(MetricsCollector::new().map_err(|e| {
            ServiceError::Initialization {
                message: format!("Failed to create metrics collector: {}", e),
            }
        })?);

        Ok(Self::with_components(config, snapshots, metrics))
    }

    /// Assemble the state from already-built components
    pub fn with_components(
        config: AppConfig,
        snapshots: Arc<dyn SnapshotStore>,
        metrics: Arc<MetricsCollector>,
    ) -> Self {
        let store = DriverRecordStore::with_divisions(
            &config.tournament.divisions,
            config.tournament.division_policy,
        );

        Self {
            config,
            store: Arc::new(RwLock::new(store)),
            snapshots,
            metrics,
            recorder: RaceRecorder::new(),
            last_save_error: Arc::new(RwLock::new(None)),
            started_at: Instant::now(),
            is_running: Arc::new(RwLock::new(false)),
        }
    }

    /// Restore the last snapshot, if any, and mark the service as running
    pub async fn start(&self) -> Result<(), ServiceError> {
        info!("Starting drag race tournament service");

        match self.load_from_store().await {
            Ok(true) => {}
            Ok(false) => info!(
                "No snapshot found at {}, starting empty",
                self.snapshots.describe()
            ),
            Err(e) => {
                return Err(ServiceError::Snapshot {
                    message: format!("Failed to restore {}: {}", self.snapshots.describe(), e),
                })
            }
        }

        *self.is_running.write().await = true;
        self.refresh_gauges().await;

        info!("✅ Drag race tournament service started successfully");
        Ok(())
    }

    /// Stop accepting work and write a final snapshot
    pub async fn shutdown(&self) -> Result<(), ServiceError> {
        info!("Starting graceful shutdown of tournament service");

        *self.is_running.write().await = false;

        if self.config.storage.snapshot_path.is_some() {
            self.save_snapshot()
                .await
                .map_err(|e| ServiceError::Snapshot {
                    message: format!("Final snapshot failed: {}", e),
                })?;
            info!("✅ Final snapshot written to {}", self.snapshots.describe());
        }

        let stats = self.stats().await;
        info!(
            "Final tournament statistics: {} drivers, {} races, {} eliminated",
            stats.total_drivers, stats.total_races, stats.eliminated_drivers
        );
        info!("✅ Tournament service shutdown completed");

        Ok(())
    }

    /// Get service configuration
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Check if service is running
    pub async fn is_running(&self) -> bool {
        *self.is_running.read().await
    }

    /// Get metrics collector
    pub fn metrics(&self) -> Arc<MetricsCollector> {
        self.metrics.clone()
    }

    /// Get the record store, for health checks
    pub fn store(&self) -> Arc<RwLock<DriverRecordStore>> {
        self.store.clone()
    }

    /// Describe the snapshot backend
    pub fn snapshot_location(&self) -> String {
        self.snapshots.describe()
    }

    /// Last autosave failure, if the most recent save did not succeed
    pub async fn last_save_error(&self) -> Option<String> {
        self.last_save_error.read().await.clone()
    }

    pub fn uptime(&self) -> std::time::Duration {
        self.started_at.elapsed()
    }

    // Drivers

    pub async fn add_driver(&self, name: &str, division: &str) -> TournamentResult<Driver> {
        let driver = self
            .mutate("add_driver", |store| store.add_driver(name, division))
            .await?;
        info!("Driver added: '{}' in {}", driver.name(), driver.division());
        Ok(driver)
    }

    pub async fn update_driver(
        &self,
        name: &str,
        update: DriverUpdate,
    ) -> TournamentResult<Driver> {
        let driver = self
            .mutate("update_driver", |store| store.update_driver(name, update))
            .await?;
        info!("Driver updated: '{}' -> '{}'", name, driver.name());
        Ok(driver)
    }

    pub async fn remove_driver(&self, name: &str) -> TournamentResult<Driver> {
        let driver = self
            .mutate("remove_driver", |store| store.remove_driver(name))
            .await?;
        info!("Driver removed: '{}'", driver.name());
        Ok(driver)
    }

    pub async fn get_driver(&self, name: &str) -> TournamentResult<Driver> {
        self.store.read().await.get_driver(name).cloned()
    }

    pub async fn list_drivers(&self, division: Option<&str>) -> Vec<Driver> {
        self.store
            .read()
            .await
            .list_drivers(division)
            .into_iter()
            .cloned()
            .collect()
    }

    // Divisions

    pub async fn create_division(&self, name: &str) -> TournamentResult<Division> {
        let division = self
            .mutate("create_division", |store| store.create_division(name))
            .await?;
        info!("Division created: {}", division.name);
        Ok(division)
    }

    pub async fn list_divisions(&self) -> Vec<Division> {
        self.store.read().await.list_divisions()
    }

    pub async fn active_drivers(&self, division: &str) -> Vec<String> {
        ranking::active_drivers(&*self.store.read().await, division)
    }

    // Races

    /// Record one race outcome
    pub async fn record_race(&self, command: RecordRaceCommand) -> TournamentResult<RaceResult> {
        let recorder = self.recorder;
        let outcome = self
            .mutate("record_race", |store| recorder.apply(store, &command))
            .await;

        match outcome {
            Ok(result) => {
                self.metrics
                    .record_race(result.race.kind, result.newly_eliminated.len());
                info!("{}", result.message);
                for name in &result.newly_eliminated {
                    info!("Driver '{}' eliminated after race {}", name, result.race.race_number);
                }
                Ok(result)
            }
            Err(e) => {
                self.metrics.record_race_rejected(e.kind());
                warn!(
                    "Race rejected ({:?} won by '{}'): {}",
                    command.participants(),
                    command.winner(),
                    e
                );
                Err(e)
            }
        }
    }

    pub async fn races(&self, division: Option<&str>) -> Vec<Race> {
        self.store
            .read()
            .await
            .races(division)
            .into_iter()
            .cloned()
            .collect()
    }

    // Rankings

    pub async fn rankings(
        &self,
        division: Option<&str>,
        filter: StandingsFilter,
    ) -> Vec<DriverStanding> {
        let timer = self.metrics.start_timer();
        let standings = ranking::rankings_with(&*self.store.read().await, division, filter);
        self.metrics.record_operation("rankings", timer.stop());
        standings
    }

    pub async fn stats(&self) -> TournamentStats {
        ranking::tournament_stats(&*self.store.read().await)
    }

    // Exchange

    pub async fn export_csv(&self) -> TournamentResult<Vec<u8>> {
        exchange::export_csv(&*self.store.read().await)
    }

    pub async fn export_xlsx(&self) -> TournamentResult<Vec<u8>> {
        exchange::export_xlsx(&*self.store.read().await)
    }

    /// Add drivers from CSV or XLSX bytes; rejected rows are reported, not fatal
    pub async fn import(
        &self,
        data: &[u8],
        options: ImportOptions,
    ) -> TournamentResult<ImportReport> {
        let report = self
            .mutate("import", |store| exchange::import_bytes(store, data, options))
            .await?;

        self.metrics
            .record_import(report.added.len(), report.skipped.len());
        info!("{}", report.message());
        for skipped in &report.skipped {
            debug!("Import skipped row {} ('{}'): {}", skipped.row, skipped.name, skipped.reason);
        }
        Ok(report)
    }

    // Snapshots

    pub async fn snapshot(&self) -> Snapshot {
        self.store.read().await.snapshot()
    }

    /// Persist the current state now, regardless of the autosave setting
    pub async fn save_snapshot(&self) -> TournamentResult<Snapshot> {
        // The write lock keeps concurrent saves from interleaving
        let store = self.store.write().await;
        let snapshot = store.snapshot();
        self.persist(&snapshot).await?;
        Ok(snapshot)
    }

    /// Replace the whole tournament with a snapshot document
    pub async fn replace_from_snapshot(
        &self,
        snapshot: Snapshot,
    ) -> TournamentResult<TournamentStats> {
        let mut store = self.store.write().await;
        let restored = self.rebuild(snapshot)?;
        *store = restored;
        let stats = ranking::tournament_stats(&store);
        self.autosave(&store).await;
        drop(store);

        self.metrics.update_from_stats(&stats);
        info!(
            "Tournament replaced from snapshot: {} drivers, {} races",
            stats.total_drivers, stats.total_races
        );
        Ok(stats)
    }

    /// Load the persisted snapshot into the store; `false` when none exists
    pub async fn load_from_store(&self) -> TournamentResult<bool> {
        let Some(snapshot) = self.snapshots.load().await? else {
            return Ok(false);
        };

        let restored = self.rebuild(snapshot)?;
        info!(
            "Restored {} drivers and {} races from {}",
            restored.driver_count(),
            restored.race_count(),
            self.snapshots.describe()
        );
        *self.store.write().await = restored;
        Ok(true)
    }

    /// Snapshot load keeps the configured policy and seeded divisions
    fn rebuild(&self, snapshot: Snapshot) -> TournamentResult<DriverRecordStore> {
        let mut restored =
            DriverRecordStore::from_snapshot(snapshot, self.config.tournament.division_policy)?;
        for division in &self.config.tournament.divisions {
            if !restored.division_names().contains(division) {
                restored.create_division(division)?;
            }
        }
        Ok(restored)
    }

    /// Run one mutation under the write lock and autosave on success
    async fn mutate<T, F>(&self, operation: &str, change: F) -> TournamentResult<T>
    where
        F: FnOnce(&mut DriverRecordStore) -> TournamentResult<T>,
    {
        let timer = self.metrics.start_timer();
        let mut store = self.store.write().await;

        let value = change(&mut store);
        if value.is_ok() {
            self.autosave(&store).await;
        }
        let stats = ranking::tournament_stats(&store);
        drop(store);

        self.metrics.record_operation(operation, timer.stop());
        self.metrics.update_from_stats(&stats);
        value
    }

    /// Persist while the caller still holds the write lock
    async fn autosave(&self, store: &RwLockWriteGuard<'_, DriverRecordStore>) {
        if !self.config.storage.autosave {
            return;
        }
        if let Err(e) = self.persist(&store.snapshot()).await {
            error!("Autosave to {} failed: {}", self.snapshots.describe(), e);
        }
    }

    async fn persist(&self, snapshot: &Snapshot) -> TournamentResult<()> {
        let result = self.snapshots.save(snapshot).await;
        self.metrics.record_snapshot_save(result.is_ok());

        let mut last_error = self.last_save_error.write().await;
        match &result {
            Ok(()) => {
                debug!(
                    "Snapshot saved to {} ({} drivers, {} races)",
                    self.snapshots.describe(),
                    snapshot.drivers.len(),
                    snapshot.races.len()
                );
                *last_error = None;
            }
            Err(e) => *last_error = Some(e.to_string()),
        }
        result
    }

    async fn refresh_gauges(&self) {
        let stats = self.stats().await;
        self.metrics.update_from_stats(&stats);
        self.metrics.update_uptime(self.uptime());
    }
}
