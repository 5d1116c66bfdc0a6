//! Metrics and monitoring for the drag race tournament service
//!
//! Prometheus collection plus the probe and scrape endpoints.

pub mod collector;
pub mod health;

pub use collector::{
    MetricsCollector, MetricsTimer, PerformanceMetrics, PersistenceMetrics, ServiceMetrics,
    TournamentMetrics,
};
pub use health::monitoring_routes;
