//! Main entry point for the drag race tournament service
//!
//! Loads configuration, restores the last snapshot, serves the HTTP API and
//! writes a final snapshot on shutdown.

use anyhow::Result;
use clap::Parser;
use dragrace_manager::api::ApiServer;
use dragrace_manager::config::{validate_config, AppConfig};
use dragrace_manager::service::AppState;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::signal;
use tracing::{error, info, warn};

/// Drag Race Tournament Manager - scorekeeping for elimination drag racing
#[derive(Parser)]
#[command(
    name = "dragrace-manager",
    version,
    about = "Scorekeeping service for elimination-style drag race tournaments",
    long_about = "Tracks drivers by division, records two-driver and championship races, \
                 eliminates drivers at three losses and serves rankings, statistics and \
                 CSV/Excel exports over HTTP."
)]
struct Args {
    /// Configuration file path
    #[arg(
        short,
        long,
        value_name = "FILE",
        help = "Path to configuration file (TOML format)"
    )]
    config: Option<PathBuf>,

    /// Log level override
    #[arg(
        short,
        long,
        value_name = "LEVEL",
        help = "Override log level (trace, debug, info, warn, error)"
    )]
    log_level: Option<String>,

    /// HTTP port override
    #[arg(short, long, value_name = "PORT", help = "Override HTTP server port")]
    port: Option<u16>,

    /// Snapshot file override
    #[arg(long, value_name = "FILE", help = "Override snapshot file path")]
    snapshot: Option<PathBuf>,

    /// Disable autosave
    #[arg(long, help = "Only save on shutdown or explicit /api/save")]
    no_autosave: bool,

    /// Enable debug mode
    #[arg(short, long, help = "Enable debug mode with verbose logging")]
    debug: bool,

    /// Dry run mode (validate config and exit)
    #[arg(
        long,
        help = "Validate configuration and exit without starting service"
    )]
    dry_run: bool,
}

/// Initialize structured logging with the configured level
fn init_logging(log_level: &str) -> Result<()> {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| log_level.into()),
        )
        .with_target(false)
        .with_thread_ids(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    Ok(())
}

/// Wait for shutdown signals (SIGINT, SIGTERM)
async fn wait_for_shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received SIGINT (Ctrl+C) signal");
        },
        _ = terminate => {
            info!("Received SIGTERM signal");
        },
    }
}

/// Display startup banner with service information
fn display_startup_banner(config: &AppConfig) {
    info!("🏁 Drag Race Tournament Manager");
    info!("   Service: {}", config.service.name);
    info!("   Log level: {}", config.service.log_level);
    info!(
        "   HTTP: {}:{}",
        config.service.http_host, config.service.http_port
    );
    match &config.storage.snapshot_path {
        Some(path) => info!("   Snapshot: {}", path.display()),
        None => info!("   Snapshot: in memory only"),
    }
    info!("   Autosave: {}", config.storage.autosave);
    info!(
        "   Divisions: {} ({:?} policy)",
        config.tournament.divisions.join(", "),
        config.tournament.division_policy
    );
    info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
}

/// Load and merge configuration from environment and CLI arguments
fn load_config(args: &Args) -> Result<AppConfig> {
    let mut config = if let Some(config_path) = &args.config {
        AppConfig::from_file(config_path)?
    } else {
        AppConfig::from_env()?
    };

    // Apply CLI overrides
    if let Some(log_level) = &args.log_level {
        config.service.log_level = log_level.clone();
    }

    if args.debug {
        config.service.log_level = "debug".to_string();
    }

    if let Some(port) = args.port {
        config.service.http_port = port;
    }

    if let Some(snapshot) = &args.snapshot {
        config.storage.snapshot_path = Some(snapshot.clone());
    }

    if args.no_autosave {
        config.storage.autosave = false;
    }

    validate_config(&config)?;
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Load configuration (CLI args can override environment/config file)
    let config = load_config(&args).unwrap_or_else(|e| {
        eprintln!("Configuration error: {}", e);
        std::process::exit(1);
    });

    // Initialize logging early (before any other operations)
    if let Err(e) = init_logging(&config.service.log_level) {
        eprintln!("Failed to initialize logging: {}", e);
        std::process::exit(1);
    }

    if args.dry_run {
        info!("Configuration validation successful");
        display_startup_banner(&config);
        info!("Dry run completed - exiting without starting service");
        return Ok(());
    }

    display_startup_banner(&config);

    let addr = config.bind_address()?;

    info!("Initializing service components...");
    let app_state = match AppState::new(config.clone()).await {
        Ok(state) => Arc::new(state),
        Err(e) => {
            error!("Failed to initialize application: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = app_state.start().await {
        error!("Failed to start service: {}", e);
        std::process::exit(1);
    }

    info!("✅ Drag Race Tournament Manager is running");
    info!("Press Ctrl+C to shutdown gracefully...");

    let server = ApiServer::new(addr, app_state.clone());
    if let Err(e) = server.run(wait_for_shutdown_signal()).await {
        error!("Server failed: {}", e);
    }

    info!("🛑 Shutdown signal received, beginning graceful shutdown...");

    match tokio::time::timeout(config.shutdown_timeout(), app_state.shutdown()).await {
        Ok(Ok(())) => info!("✅ Graceful shutdown completed successfully"),
        Ok(Err(e)) => error!("Shutdown failed: {}", e),
        Err(_) => warn!("⚠️  Shutdown timeout exceeded, forcing exit"),
    }

    info!("🛑 Drag Race Tournament Manager stopped");
    Ok(())
}
