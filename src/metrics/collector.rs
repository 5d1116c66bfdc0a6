//! Metrics collection using Prometheus
//!
//! Every metric is registered on the collector's own registry and exposed on
//! `/metrics` by the monitoring routes.

use crate::types::{RaceKind, TournamentStats};
use anyhow::Result;
use prometheus::{
    HistogramOpts, HistogramVec, IntCounter, IntCounterVec, IntGauge, IntGaugeVec, Opts, Registry,
};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Main metrics collector for the tournament service
#[derive(Clone)]
pub struct MetricsCollector {
    /// Prometheus registry
    registry: Arc<Registry>,

    /// Service-level metrics
    service_metrics: ServiceMetrics,

    /// Race and roster metrics
    tournament_metrics: TournamentMetrics,

    /// Snapshot and import metrics
    persistence_metrics: PersistenceMetrics,

    /// Performance metrics
    performance_metrics: PerformanceMetrics,
}

/// Service-level metrics
#[derive(Clone)]
pub struct ServiceMetrics {
    /// Service uptime in seconds
    pub uptime_seconds: IntGauge,

    /// Health check status (0=unhealthy, 1=degraded, 2=healthy)
    pub health_status: IntGauge,

    /// Component health status
    pub component_health: IntGaugeVec,
}

/// Race and roster metrics
#[derive(Clone)]
pub struct TournamentMetrics {
    /// Races recorded by kind
    pub races_recorded_total: IntCounterVec,

    /// Race submissions rejected by reason
    pub races_rejected_total: IntCounterVec,

    /// Drivers that reached the elimination threshold
    pub eliminations_total: IntCounter,

    /// Current drivers by status
    pub drivers: IntGaugeVec,

    /// Current number of divisions
    pub divisions: IntGauge,
}

/// Snapshot and import metrics
#[derive(Clone)]
pub struct PersistenceMetrics {
    /// Snapshot saves by outcome
    pub snapshot_saves_total: IntCounterVec,

    /// Imported rows by outcome
    pub import_rows_total: IntCounterVec,
}

/// Performance metrics
#[derive(Clone)]
pub struct PerformanceMetrics {
    /// Store operation durations
    pub operation_duration: HistogramVec,
}

impl MetricsCollector {
    /// Create a new metrics collector with default registry
    pub fn new() -> Result<Self> {
        let registry = Arc::new(Registry::new());
        Self::with_registry(registry)
    }

    /// Create a new metrics collector with custom registry
    pub fn with_registry(registry: Arc<Registry>) -> Result<Self> {
        let service_metrics = ServiceMetrics::new(&registry)?;
        let tournament_metrics = TournamentMetrics::new(&registry)?;
        let persistence_metrics = PersistenceMetrics::new(&registry)?;
        let performance_metrics = PerformanceMetrics::new(&registry)?;

        Ok(Self {
            registry,
            service_metrics,
            tournament_metrics,
            persistence_metrics,
            performance_metrics,
        })
    }

    /// Get the Prometheus registry
    pub fn registry(&self) -> Arc<Registry> {
        self.registry.clone()
    }

    /// Get service metrics
    pub fn service(&self) -> &ServiceMetrics {
        &self.service_metrics
    }

    /// Get race and roster metrics
    pub fn tournament(&self) -> &TournamentMetrics {
        &self.tournament_metrics
    }

    /// Get persistence metrics
    pub fn persistence(&self) -> &PersistenceMetrics {
        &self.persistence_metrics
    }

    /// Get performance metrics
    pub fn performance(&self) -> &PerformanceMetrics {
        &self.performance_metrics
    }

    /// Record an accepted race and the eliminations it caused
    pub fn record_race(&self, kind: RaceKind, newly_eliminated: usize) {
        self.tournament_metrics
            .races_recorded_total
            .with_label_values(&[kind.as_str()])
            .inc();

        if newly_eliminated > 0 {
            self.tournament_metrics
                .eliminations_total
                .inc_by(newly_eliminated as u64);
        }
    }

    /// Record a rejected race submission
    pub fn record_race_rejected(&self, reason: &str) {
        self.tournament_metrics
            .races_rejected_total
            .with_label_values(&[reason])
            .inc();
    }

    /// Refresh the roster gauges from current statistics
    pub fn update_from_stats(&self, stats: &TournamentStats) {
        let drivers = &self.tournament_metrics.drivers;
        drivers
            .with_label_values(&["active"])
            .set(stats.active_drivers as i64);
        drivers
            .with_label_values(&["eliminated"])
            .set(stats.eliminated_drivers as i64);
        drivers
            .with_label_values(&["inactive"])
            .set(stats.inactive_drivers as i64);

        self.tournament_metrics
            .divisions
            .set(stats.divisions as i64);
    }

    /// Record a snapshot save attempt
    pub fn record_snapshot_save(&self, success: bool) {
        let outcome = if success { "success" } else { "error" };
        self.persistence_metrics
            .snapshot_saves_total
            .with_label_values(&[outcome])
            .inc();
    }

    /// Record the outcome of an import
    pub fn record_import(&self, added: usize, skipped: usize) {
        let rows = &self.persistence_metrics.import_rows_total;
        rows.with_label_values(&["added"]).inc_by(added as u64);
        rows.with_label_values(&["skipped"]).inc_by(skipped as u64);
    }

    /// Record store operation duration
    pub fn record_operation(&self, operation: &str, duration: Duration) {
        self.performance_metrics
            .operation_duration
            .with_label_values(&[operation])
            .observe(duration.as_secs_f64());
    }

    /// Update health status
    pub fn update_health_status(&self, status: u8) {
        self.service_metrics.health_status.set(status as i64);
    }

    /// Update component health
    pub fn update_component_health(&self, component: &str, healthy: bool) {
        let status = if healthy { 1 } else { 0 };
        self.service_metrics
            .component_health
            .with_label_values(&[component])
            .set(status);
    }

    /// Update uptime gauge
    pub fn update_uptime(&self, uptime: Duration) {
        self.service_metrics
            .uptime_seconds
            .set(uptime.as_secs() as i64);
    }

    /// Create a timer for measuring operation duration
    pub fn start_timer(&self) -> MetricsTimer {
        MetricsTimer::new()
    }
}

/// Timer for measuring operation durations
pub struct MetricsTimer {
    start: Instant,
}

impl MetricsTimer {
    fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    /// Get the elapsed duration
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    /// Stop the timer and return the duration
    pub fn stop(self) -> Duration {
        self.elapsed()
    }
}

impl ServiceMetrics {
    fn new(registry: &Registry) -> Result<Self> {
        let uptime_seconds = IntGauge::new("dragrace_uptime_seconds", "Service uptime in seconds")?;
        registry.register(Box::new(uptime_seconds.clone()))?;

        let health_status = IntGauge::new(
            "dragrace_health_status",
            "Health status (0=unhealthy, 1=degraded, 2=healthy)",
        )?;
        registry.register(Box::new(health_status.clone()))?;

        let component_health = IntGaugeVec::new(
            Opts::new("dragrace_component_health", "Component health status"),
            &["component"],
        )?;
        registry.register(Box::new(component_health.clone()))?;

        Ok(Self {
            uptime_seconds,
            health_status,
            component_health,
        })
    }
}

impl TournamentMetrics {
    fn new(registry: &Registry) -> Result<Self> {
        let races_recorded_total = IntCounterVec::new(
            Opts::new("dragrace_races_recorded_total", "Total races recorded"),
            &["kind"],
        )?;
        registry.register(Box::new(races_recorded_total.clone()))?;

        let races_rejected_total = IntCounterVec::new(
            Opts::new(
                "dragrace_races_rejected_total",
                "Race submissions rejected",
            ),
            &["reason"],
        )?;
        registry.register(Box::new(races_rejected_total.clone()))?;

        let eliminations_total = IntCounter::new(
            "dragrace_eliminations_total",
            "Drivers eliminated by reaching the loss threshold",
        )?;
        registry.register(Box::new(eliminations_total.clone()))?;

        let drivers = IntGaugeVec::new(
            Opts::new("dragrace_drivers", "Current drivers by status"),
            &["status"],
        )?;
        registry.register(Box::new(drivers.clone()))?;

        let divisions = IntGauge::new("dragrace_divisions", "Current number of divisions")?;
        registry.register(Box::new(divisions.clone()))?;

        Ok(Self {
            races_recorded_total,
            races_rejected_total,
            eliminations_total,
            drivers,
            divisions,
        })
    }
}

impl PersistenceMetrics {
    fn new(registry: &Registry) -> Result<Self> {
        let snapshot_saves_total = IntCounterVec::new(
            Opts::new("dragrace_snapshot_saves_total", "Snapshot save attempts"),
            &["outcome"],
        )?;
        registry.register(Box::new(snapshot_saves_total.clone()))?;

        let import_rows_total = IntCounterVec::new(
            Opts::new("dragrace_import_rows_total", "Imported roster rows"),
            &["outcome"],
        )?;
        registry.register(Box::new(import_rows_total.clone()))?;

        Ok(Self {
            snapshot_saves_total,
            import_rows_total,
        })
    }
}

impl PerformanceMetrics {
    fn new(registry: &Registry) -> Result<Self> {
        let operation_duration = HistogramVec::new(
            HistogramOpts::new(
                "dragrace_operation_duration_seconds",
                "Store operation duration",
            )
            .buckets(vec![0.0001, 0.0005, 0.001, 0.005, 0.01, 0.05, 0.1, 0.5]),
            &["operation"],
        )?;
        registry.register(Box::new(operation_duration.clone()))?;

        Ok(Self { operation_duration })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use prometheus::{Encoder, TextEncoder};

    fn render(collector: &MetricsCollector) -> String {
        let mut buffer = Vec::new();
        TextEncoder::new()
            .encode(&collector.registry().gather(), &mut buffer)
            .unwrap();
        String::from_utf8(buffer).unwrap()
    }

    #[test]
    fn test_metrics_collector_creation() {
        let collector = MetricsCollector::new().expect("Failed to create metrics collector");

        let _service = collector.service();
        let _tournament = collector.tournament();
        let _persistence = collector.persistence();
        let _performance = collector.performance();
    }

    #[test]
    fn test_race_recording() {
        let collector = MetricsCollector::new().unwrap();

        collector.record_race(RaceKind::Regular, 0);
        collector.record_race(RaceKind::Championship, 2);
        collector.record_race_rejected("validation_error");

        let tournament = collector.tournament();
        assert_eq!(
            tournament
                .races_recorded_total
                .with_label_values(&["championship"])
                .get(),
            1
        );
        assert_eq!(tournament.eliminations_total.get(), 2);
        assert!(render(&collector).contains("dragrace_races_rejected_total"));
    }

    #[test]
    fn test_roster_gauges_follow_stats() {
        let collector = MetricsCollector::new().unwrap();
        let stats = TournamentStats {
            total_drivers: 5,
            active_drivers: 3,
            eliminated_drivers: 1,
            inactive_drivers: 1,
            divisions: 2,
            ..Default::default()
        };

        collector.update_from_stats(&stats);

        let drivers = &collector.tournament().drivers;
        assert_eq!(drivers.with_label_values(&["active"]).get(), 3);
        assert_eq!(drivers.with_label_values(&["eliminated"]).get(), 1);
        assert_eq!(collector.tournament().divisions.get(), 2);
    }

    #[test]
    fn test_persistence_counters() {
        let collector = MetricsCollector::new().unwrap();

        collector.record_snapshot_save(true);
        collector.record_snapshot_save(false);
        collector.record_import(4, 1);

        let persistence = collector.persistence();
        assert_eq!(
            persistence
                .snapshot_saves_total
                .with_label_values(&["error"])
                .get(),
            1
        );
        assert_eq!(
            persistence
                .import_rows_total
                .with_label_values(&["added"])
                .get(),
            4
        );
    }

    #[test]
    fn test_metrics_timer() {
        let collector = MetricsCollector::new().unwrap();
        let timer = collector.start_timer();

        std::thread::sleep(Duration::from_millis(10));
        let duration = timer.elapsed();
        assert!(duration >= Duration::from_millis(10));

        collector.record_operation("record_race", timer.stop());
        assert!(render(&collector).contains("dragrace_operation_duration_seconds"));
    }
}
