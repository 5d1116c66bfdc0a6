//! Error types for the tournament service
//!
//! Core operations return [`TournamentError`] so the request layer can map
//! each failure kind onto a response. Application wiring uses anyhow.

/// Result type alias for core tournament operations
pub type Result<T> = std::result::Result<T, TournamentError>;

/// Failure kinds surfaced by the tournament core
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TournamentError {
    #[error("Validation failed: {reason}")]
    Validation { reason: String },

    #[error("{entity} not found: {name}")]
    NotFound { entity: &'static str, name: String },

    #[error("{entity} already exists: {name}")]
    Conflict { entity: &'static str, name: String },

    #[error("Import failed: {reason}")]
    Import { reason: String },

    #[error("Export failed: {reason}")]
    Export { reason: String },

    #[error("Persistence error: {message}")]
    Persistence { message: String },

    #[error("Internal service error: {message}")]
    Internal { message: String },
}

impl TournamentError {
    pub fn validation(reason: impl Into<String>) -> Self {
        Self::Validation {
            reason: reason.into(),
        }
    }

    pub fn driver_not_found(name: impl Into<String>) -> Self {
        Self::NotFound {
            entity: "Driver",
            name: name.into(),
        }
    }

    pub fn driver_conflict(name: impl Into<String>) -> Self {
        Self::Conflict {
            entity: "Driver",
            name: name.into(),
        }
    }

    pub fn import(reason: impl Into<String>) -> Self {
        Self::Import {
            reason: reason.into(),
        }
    }

    pub fn export(reason: impl Into<String>) -> Self {
        Self::Export {
            reason: reason.into(),
        }
    }

    pub fn persistence(message: impl Into<String>) -> Self {
        Self::Persistence {
            message: message.into(),
        }
    }

    /// Short machine-readable name of the failure kind
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Validation { .. } => "validation_error",
            Self::NotFound { .. } => "not_found",
            Self::Conflict { .. } => "conflict",
            Self::Import { .. } => "import_error",
            Self::Export { .. } => "export_error",
            Self::Persistence { .. } => "persistence_error",
            Self::Internal { .. } => "internal_error",
        }
    }
}
