//! Health check functionality
//!
//! Readiness and liveness probes plus a detailed component report for the
//! tournament service.

use crate::service::app::AppState;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Health check status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Degraded,
    Unhealthy,
}

impl HealthStatus {
    /// Numeric form used by the health gauge
    pub fn as_gauge(&self) -> u8 {
        match self {
            HealthStatus::Healthy => 2,
            HealthStatus::Degraded => 1,
            HealthStatus::Unhealthy => 0,
        }
    }

    fn worst(self, other: HealthStatus) -> HealthStatus {
        if self.as_gauge() <= other.as_gauge() {
            self
        } else {
            other
        }
    }
}

impl std::fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HealthStatus::Healthy => write!(f, "✅ healthy"),
            HealthStatus::Degraded => write!(f, "⚠️  degraded"),
            HealthStatus::Unhealthy => write!(f, "❌ unhealthy"),
        }
    }
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthCheck {
    /// Overall service status
    pub status: HealthStatus,
    /// Service name
    pub service: String,
    /// Service version
    pub version: String,
    /// Current timestamp
    pub timestamp: chrono::DateTime<chrono::Utc>,
    /// Detailed component checks
    pub checks: Vec<ComponentCheck>,
    /// Service statistics
    pub stats: ServiceStats,
}

/// Individual component health check
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentCheck {
    /// Component name
    pub name: String,
    /// Component status
    pub status: HealthStatus,
    /// Optional error message if not healthy
    pub message: Option<String>,
    /// Check duration in milliseconds
    pub duration_ms: u64,
}

/// Service statistics for health reporting
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceStats {
    pub drivers: usize,
    pub active_drivers: usize,
    pub races: usize,
    pub divisions: usize,
    pub uptime_seconds: u64,
    /// Where snapshots are written
    pub snapshot_location: String,
}

impl HealthCheck {
    /// Perform a comprehensive health check of the service
    pub async fn check(app_state: Arc<AppState>) -> Result<Self> {
        let mut checks = Vec::new();

        checks.push(Self::check_service_running(&app_state).await);
        checks.push(Self::check_record_store(&app_state));
        checks.push(Self::check_snapshot_store(&app_state).await);

        let status = checks
            .iter()
            .fold(HealthStatus::Healthy, |acc, check| acc.worst(check.status));

        let metrics = app_state.metrics();
        metrics.update_health_status(status.as_gauge());
        metrics.update_uptime(app_state.uptime());
        for check in &checks {
            metrics.update_component_health(&check.name, check.status != HealthStatus::Unhealthy);
        }

        let stats = Self::gather_service_stats(&app_state).await;

        Ok(HealthCheck {
            status,
            service: app_state.config().service.name.clone(),
            version: crate::VERSION.to_string(),
            timestamp: chrono::Utc::now(),
            checks,
            stats,
        })
    }

    /// Simple liveness check - just verify service is running
    pub async fn liveness_check(app_state: Arc<AppState>) -> Result<HealthStatus> {
        if app_state.is_running().await {
            Ok(HealthStatus::Healthy)
        } else {
            Ok(HealthStatus::Unhealthy)
        }
    }

    /// Readiness check - running, store reachable, last save succeeded
    pub async fn readiness_check(app_state: Arc<AppState>) -> Result<HealthStatus> {
        if !app_state.is_running().await {
            return Ok(HealthStatus::Unhealthy);
        }

        let store = Self::check_record_store(&app_state).status;
        let snapshots = Self::check_snapshot_store(&app_state).await.status;
        Ok(store.worst(snapshots))
    }

    async fn check_service_running(app_state: &AppState) -> ComponentCheck {
        let start = std::time::Instant::now();

        let (status, message) = if app_state.is_running().await {
            (HealthStatus::Healthy, None)
        } else {
            (
                HealthStatus::Unhealthy,
                Some("Service is not running".to_string()),
            )
        };

        ComponentCheck {
            name: "service_running".to_string(),
            status,
            message,
            duration_ms: start.elapsed().as_millis() as u64,
        }
    }

    /// A held write lock means a mutation is in flight, not a failure
    fn check_record_store(app_state: &AppState) -> ComponentCheck {
        let start = std::time::Instant::now();

        let store = app_state.store();
        let (status, message) = match store.try_read() {
            Ok(_) => (HealthStatus::Healthy, None),
            Err(_) => (
                HealthStatus::Degraded,
                Some("Record store is busy".to_string()),
            ),
        };

        ComponentCheck {
            name: "record_store".to_string(),
            status,
            message,
            duration_ms: start.elapsed().as_millis() as u64,
        }
    }

    async fn check_snapshot_store(app_state: &AppState) -> ComponentCheck {
        let start = std::time::Instant::now();

        let (status, message) = match app_state.last_save_error().await {
            None => (HealthStatus::Healthy, None),
            Some(error) => (
                HealthStatus::Degraded,
                Some(format!("Last snapshot save failed: {}", error)),
            ),
        };

        ComponentCheck {
            name: "snapshot_store".to_string(),
            status,
            message,
            duration_ms: start.elapsed().as_millis() as u64,
        }
    }

    async fn gather_service_stats(app_state: &AppState) -> ServiceStats {
        let stats = app_state.stats().await;
        ServiceStats {
            drivers: stats.total_drivers,
            active_drivers: stats.active_drivers,
            races: stats.total_races,
            divisions: stats.divisions,
            uptime_seconds: app_state.uptime().as_secs(),
            snapshot_location: app_state.snapshot_location(),
        }
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| anyhow::anyhow!("Failed to serialize health check: {}", e))
    }
}
