//! Health check endpoints and Prometheus metrics endpoint
//!
//! Merged into the API router so probes and scraping share the service port.

use crate::service::app::AppState;
use crate::service::health::{HealthCheck, HealthStatus};
use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use prometheus::{Encoder, TextEncoder};
use serde_json::json;
use std::sync::Arc;
use tracing::{debug, error};

/// Routes for `/health`, `/ready`, `/alive`, `/metrics` and `/stats`
pub fn monitoring_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/health", get(health_handler))
        .route("/ready", get(ready_handler))
        .route("/alive", get(alive_handler))
        .route("/metrics", get(metrics_handler))
        .route("/stats", get(stats_handler))
}

/// Lightweight health check endpoint handler
async fn health_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    debug!("Health check requested");

    let service = state.config().service.name.clone();
    let (code, status) = match HealthCheck::liveness_check(state).await {
        Ok(HealthStatus::Healthy) => (StatusCode::OK, "healthy"),
        Ok(HealthStatus::Degraded) => (StatusCode::OK, "degraded"),
        Ok(HealthStatus::Unhealthy) | Err(_) => (StatusCode::SERVICE_UNAVAILABLE, "unhealthy"),
    };

    (
        code,
        Json(json!({
            "status": status,
            "service": service,
            "version": crate::VERSION
        })),
    )
}

/// Readiness check endpoint handler
async fn ready_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    debug!("Readiness check requested");

    match HealthCheck::readiness_check(state).await {
        Ok(HealthStatus::Healthy) => (StatusCode::OK, "Ready"),
        Ok(HealthStatus::Degraded) => (StatusCode::OK, "Degraded but ready"),
        Ok(HealthStatus::Unhealthy) => (StatusCode::SERVICE_UNAVAILABLE, "Not ready"),
        Err(e) => {
            error!("Readiness check failed: {}", e);
            (StatusCode::SERVICE_UNAVAILABLE, "Not ready")
        }
    }
}

/// Liveness check endpoint handler
async fn alive_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    debug!("Liveness check requested");

    match HealthCheck::liveness_check(state).await {
        Ok(HealthStatus::Healthy) => (StatusCode::OK, "Alive"),
        _ => (StatusCode::SERVICE_UNAVAILABLE, "Not alive"),
    }
}

/// Prometheus metrics endpoint handler
async fn metrics_handler(State(state): State<Arc<AppState>>) -> Response {
    debug!("Metrics endpoint requested");

    let metrics = state.metrics();
    metrics.update_uptime(state.uptime());

    let metric_families = metrics.registry().gather();
    let encoder = TextEncoder::new();
    let mut buffer = Vec::new();

    match encoder.encode(&metric_families, &mut buffer) {
        Ok(()) => {
            debug!("Serving {} metric families", metric_families.len());
            (
                StatusCode::OK,
                [(header::CONTENT_TYPE, encoder.format_type().to_string())],
                buffer,
            )
                .into_response()
        }
        Err(e) => {
            error!("Failed to encode metrics: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to encode metrics",
            )
                .into_response()
        }
    }
}

/// Detailed service statistics endpoint handler
async fn stats_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    debug!("Stats endpoint requested");

    match HealthCheck::check(state.clone()).await {
        Ok(health) => {
            let code = if health.status == HealthStatus::Unhealthy {
                StatusCode::SERVICE_UNAVAILABLE
            } else {
                StatusCode::OK
            };
            (
                code,
                Json(json!({
                    "service": {
                        "name": health.service,
                        "version": health.version,
                        "status": health.status,
                        "uptime_seconds": health.stats.uptime_seconds
                    },
                    "tournament": {
                        "drivers": health.stats.drivers,
                        "active_drivers": health.stats.active_drivers,
                        "races": health.stats.races,
                        "divisions": health.stats.divisions
                    },
                    "snapshots": health.stats.snapshot_location,
                    "components": health.checks,
                    "timestamp": health.timestamp
                })),
            )
        }
        Err(e) => {
            error!("Failed to get stats: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "service": {
                        "name": state.config().service.name,
                        "version": crate::VERSION,
                        "status": "error"
                    },
                    "error": "Failed to get service stats",
                    "timestamp": chrono::Utc::now()
                })),
            )
        }
    }
}
