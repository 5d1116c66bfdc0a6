//! Main application configuration
//!
//! Loaded from environment variables or a TOML file, then validated.

use crate::config::tournament::TournamentConfig;
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub service: ServiceSettings,
    pub storage: StorageSettings,
    pub tournament: TournamentConfig,
}

/// Service-level settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceSettings {
    /// Service name for logging and metrics
    pub name: String,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Interface the HTTP server binds to
    pub http_host: String,
    /// Port for the HTTP API and health endpoints
    pub http_port: u16,
    /// Graceful shutdown timeout in seconds
    pub shutdown_timeout_seconds: u64,
}

/// Snapshot persistence settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageSettings {
    /// Snapshot file; `None` keeps state in memory only
    pub snapshot_path: Option<PathBuf>,
    /// Persist after every successful mutation
    pub autosave: bool,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            name: "dragrace-manager".to_string(),
            log_level: "info".to_string(),
            http_host: "0.0.0.0".to_string(),
            http_port: 5000,
            shutdown_timeout_seconds: 30,
        }
    }
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            snapshot_path: Some(PathBuf::from("data/tournament.json")),
            autosave: true,
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables with fallback to defaults
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        config.apply_env()?;
        validate_config(&config)?;
        Ok(config)
    }

    /// Load a TOML file, then let environment variables override it
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let mut config = Self::from_toml_str(&raw)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        config.apply_env()?;
        validate_config(&config)?;
        Ok(config)
    }

    /// Parse a TOML document; missing sections fall back to defaults
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        toml::from_str(raw).map_err(|e| anyhow!("Invalid TOML configuration: {}", e))
    }

    fn apply_env(&mut self) -> Result<()> {
        // Service settings
        if let Ok(name) = env::var("SERVICE_NAME") {
            self.service.name = name;
        }
        if let Ok(log_level) = env::var("LOG_LEVEL") {
            self.service.log_level = log_level;
        }
        if let Ok(host) = env::var("HTTP_HOST") {
            self.service.http_host = host;
        }
        if let Some(port) = env::var("HTTP_PORT").ok().or_else(|| env::var("PORT").ok()) {
            self.service.http_port = port
                .parse()
                .map_err(|_| anyhow!("Invalid HTTP_PORT value: {}", port))?;
        }
        if let Ok(timeout) = env::var("SHUTDOWN_TIMEOUT_SECONDS") {
            self.service.shutdown_timeout_seconds = timeout
                .parse()
                .map_err(|_| anyhow!("Invalid SHUTDOWN_TIMEOUT_SECONDS value: {}", timeout))?;
        }

        // Storage settings
        if let Ok(path) = env::var("SNAPSHOT_PATH") {
            self.storage.snapshot_path = if path.trim().is_empty() {
                None
            } else {
                Some(PathBuf::from(path))
            };
        }
        if let Ok(autosave) = env::var("AUTOSAVE") {
            self.storage.autosave = autosave
                .parse()
                .map_err(|_| anyhow!("Invalid AUTOSAVE value: {}", autosave))?;
        }

        // Tournament settings
        if let Ok(policy) = env::var("DIVISION_POLICY") {
            self.tournament.division_policy = policy
                .parse()
                .map_err(|_| anyhow!("Invalid DIVISION_POLICY value: {}", policy))?;
        }
        if let Ok(divisions) = env::var("DIVISIONS") {
            self.tournament.divisions = TournamentConfig::parse_divisions(&divisions);
        }

        Ok(())
    }

    /// Address the HTTP server binds to
    pub fn bind_address(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.service.http_host, self.service.http_port)
            .parse()
            .map_err(|_| {
                anyhow!(
                    "Invalid bind address: {}:{}",
                    self.service.http_host,
                    self.service.http_port
                )
            })
    }

    /// Get shutdown timeout as Duration
    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.service.shutdown_timeout_seconds)
    }
}

/// Validate configuration values
pub fn validate_config(config: &AppConfig) -> Result<()> {
    match config.service.log_level.to_lowercase().as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => {}
        _ => return Err(anyhow!("Invalid log level: {}", config.service.log_level)),
    }

    if config.service.name.trim().is_empty() {
        return Err(anyhow!("Service name cannot be empty"));
    }
    if config.service.http_port == 0 {
        return Err(anyhow!("HTTP port cannot be 0"));
    }
    if config.service.shutdown_timeout_seconds == 0 {
        return Err(anyhow!("Shutdown timeout must be greater than 0"));
    }

    if config.storage.autosave && config.storage.snapshot_path.is_none() {
        return Err(anyhow!("Autosave requires a snapshot path"));
    }

    let mut seen = std::collections::HashSet::new();
    for division in &config.tournament.divisions {
        if division.trim().is_empty() {
            return Err(anyhow!("Division names cannot be empty"));
        }
        if !seen.insert(division.trim()) {
            return Err(anyhow!("Duplicate division in configuration: {}", division));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DivisionPolicy;

    #[test]
    fn test_default_config_is_valid() {
        let config = AppConfig::default();
        assert!(validate_config(&config).is_ok());
        assert_eq!(config.service.http_port, 5000);
        assert_eq!(config.shutdown_timeout(), Duration::from_secs(30));
        assert_eq!(config.bind_address().unwrap().port(), 5000);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = AppConfig::from_toml_str(
            r#"
            [service]
            http_port = 8088

            [tournament]
            divisions = ["PRO", "STREET"]
            division_policy = "registered"
            "#,
        )
        .unwrap();

        assert_eq!(config.service.http_port, 8088);
        assert_eq!(config.service.log_level, "info");
        assert!(config.storage.autosave);
        assert_eq!(config.tournament.divisions, vec!["PRO", "STREET"]);
        assert_eq!(config.tournament.division_policy, DivisionPolicy::Registered);
    }

    #[test]
    fn test_validation_failures() {
        let mut config = AppConfig::default();
        config.service.log_level = "loud".to_string();
        assert!(validate_config(&config).is_err());

        let mut config = AppConfig::default();
        config.storage.snapshot_path = None;
        assert!(validate_config(&config).is_err());
        config.storage.autosave = false;
        assert!(validate_config(&config).is_ok());

        let mut config = AppConfig::default();
        config.tournament.divisions.push("OPEN".to_string());
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_from_file_reads_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dragrace.toml");
        std::fs::write(&path, "[storage]\nautosave = false\n").unwrap();

        let config = AppConfig::from_file(&path).unwrap();
        assert!(!config.storage.autosave);
    }

    #[test]
    fn test_invalid_toml_is_rejected() {
        assert!(AppConfig::from_toml_str("[service\nname = 1").is_err());
    }
}
