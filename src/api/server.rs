//! HTTP server for the tournament API
//!
//! One axum router serves the `/api` routes and the monitoring routes.

use crate::api::handlers;
use crate::metrics::monitoring_routes;
use crate::service::AppState;
use anyhow::{Context, Result};
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

/// Largest accepted upload, for spreadsheet imports
pub const MAX_UPLOAD_BYTES: usize = 16 * 1024 * 1024;

/// Build the complete router for the given application state
pub fn router(state: Arc<AppState>) -> Router {
    let api = Router::new()
        .route(
            "/drivers",
            get(handlers::list_drivers).post(handlers::add_driver),
        )
        .route(
            "/drivers/{name}",
            get(handlers::get_driver)
                .put(handlers::update_driver)
                .delete(handlers::remove_driver),
        )
        .route(
            "/divisions",
            get(handlers::list_divisions).post(handlers::create_division),
        )
        .route("/active-drivers/{division}", get(handlers::active_drivers))
        .route("/race", post(handlers::record_race))
        .route("/races", get(handlers::list_races))
        .route("/rankings", get(handlers::rankings))
        .route("/stats", get(handlers::stats))
        .route("/export", get(handlers::export_csv))
        .route("/export-excel", get(handlers::export_excel))
        .route("/snapshot", get(handlers::snapshot))
        .route("/save", post(handlers::save))
        .route("/load", post(handlers::load))
        .route("/import", post(handlers::import));

    Router::new()
        .route("/", get(handlers::root))
        .nest("/api", api)
        .merge(monitoring_routes())
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .with_state(state)
}

/// Tournament API server
pub struct ApiServer {
    addr: SocketAddr,
    state: Arc<AppState>,
}

impl ApiServer {
    pub fn new(addr: SocketAddr, state: Arc<AppState>) -> Self {
        Self { addr, state }
    }

    /// Serve until `shutdown` resolves
    pub async fn run<F>(self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let listener = TcpListener::bind(self.addr)
            .await
            .with_context(|| format!("Failed to bind {}", self.addr))?;

        info!("Tournament API listening on http://{}", self.addr);

        axum::serve(listener, router(self.state))
            .with_graceful_shutdown(shutdown)
            .await
            .context("HTTP server error")?;

        info!("Tournament API stopped");
        Ok(())
    }
}
