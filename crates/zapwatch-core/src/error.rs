//! Error types for ZapWatch

use thiserror::Error;

/// Result type alias using ZapWatch Error
pub type Result<T> = std::result::Result<T, Error>;

/// ZapWatch error types
#[derive(Error, Debug)]
pub enum Error {
    // === Engine Errors ===
    #[error("Engine error: {0}")]
    Engine(String),

    #[error("Engine API error ({status}): {message}")]
    EngineApi { status: u16, message: String },

    #[error("{phase} did not complete after {attempts} polls")]
    PollTimeout { phase: String, attempts: u32 },

    // === Target Errors ===
    #[error("Invalid target: {0}")]
    InvalidTarget(String),

    // === Store Errors ===
    #[error("Scan not found: {id}")]
    ScanNotFound { id: i64 },

    #[error("Database error: {0}")]
    Database(String),

    // === Configuration Errors ===
    #[error("Configuration error: {0}")]
    Configuration(String),

    // === IO Errors ===
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // === Input Errors ===
    #[error("Parse error: {0}")]
    Parse(String),
}

impl Error {
    /// Missing-record faults are reported to the user, never fatal
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::ScanNotFound { .. })
    }

    /// Get an error code for logging
    pub fn code(&self) -> &'static str {
        match self {
            Error::Engine(_) => "ENGINE_ERROR",
            Error::EngineApi { .. } => "ENGINE_API_ERROR",
            Error::PollTimeout { .. } => "POLL_TIMEOUT",
            Error::InvalidTarget(_) => "INVALID_TARGET",
            Error::ScanNotFound { .. } => "SCAN_NOT_FOUND",
            Error::Database(_) => "DATABASE_ERROR",
            Error::Configuration(_) => "CONFIG_ERROR",
            Error::Io(_) => "IO_ERROR",
            Error::Parse(_) => "PARSE_ERROR",
        }
    }
}
