//! Unified error hierarchy for cyclepacer
//!
//! The pacing core itself never raises these — its failures are values on
//! `SimulationResult` (see [`crate::models::FailureKind`]). This hierarchy
//! covers everything around the core: loading courses and rider profiles,
//! writing results, and reading configuration.

use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type for all cyclepacer operations outside the core.
#[derive(Debug, Error)]
pub enum PacerError {
    /// Course or rider input failed validation before a simulation could start.
    #[error("degenerate input: {0}")]
    DegenerateInput(String),

    /// GPX/JSON/TOML parsing errors.
    #[error("import error: {0}")]
    Import(#[from] ImportError),

    /// CSV/JSON export errors.
    #[error("export error: {0}")]
    Export(#[from] ExportError),

    /// Configuration errors.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// IO errors.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic internal error.
    #[error("internal error: {0}")]
    Internal(String),
}

/// Import-specific errors.
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("malformed GPX track: {reason}")]
    MalformedGpx { reason: String },

    #[error("rider profile missing field: {field}")]
    MissingRiderField { field: String },

    #[error("rider power-duration curve is empty")]
    EmptyPdc,

    #[error("invalid physics parameter {parameter}: {value}")]
    InvalidPhysicsParameter { parameter: String, value: String },

    #[error("parse error in {format}: {reason}")]
    ParseError { format: String, reason: String },
}

/// Export-specific errors.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Result type alias for cyclepacer operations.
pub type Result<T> = std::result::Result<T, PacerError>;

impl PacerError {
    /// Whether retrying the same operation might succeed (transient IO only).
    pub fn is_retryable(&self) -> bool {
        matches!(self, PacerError::Io(_))
    }

    /// Map to an error severity for logging.
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            PacerError::DegenerateInput(_) => ErrorSeverity::Warning,
            PacerError::Import(_) => ErrorSeverity::Warning,
            PacerError::Export(_) => ErrorSeverity::Error,
            PacerError::Configuration(_) => ErrorSeverity::Error,
            PacerError::Io(_) => ErrorSeverity::Error,
            PacerError::Internal(_) => ErrorSeverity::Critical,
        }
    }
}

/// Error severity levels, mirrored to `tracing::Level` at the logging boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    Critical,
    Error,
    Warning,
    Info,
}

impl ErrorSeverity {
    pub fn to_tracing_level(self) -> tracing::Level {
        match self {
            ErrorSeverity::Critical => tracing::Level::ERROR,
            ErrorSeverity::Error => tracing::Level::ERROR,
            ErrorSeverity::Warning => tracing::Level::WARN,
            ErrorSeverity::Info => tracing::Level::INFO,
        }
    }
}
