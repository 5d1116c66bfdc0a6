//! Service layer for the drag race tournament service
//!
//! Application state around the record store, and health checks.

pub mod app;
pub mod health;

pub use app::{AppState, ServiceError};
pub use health::{HealthCheck, HealthStatus};
