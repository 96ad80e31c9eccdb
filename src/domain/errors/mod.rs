// Domain errors - Error types for the domain layer

use std::fmt;

use crate::error::{ConfigError, ControlError, ProbeError};

/// Domain-specific error types
#[derive(Debug, Clone, PartialEq)]
pub enum DomainError {
    /// Invalid arguments provided
    BadArgs(String),
    /// File not found
    FileNotFound(String),
    /// Invalid file format
    InvalidFormat(String),
    /// Configuration could not be loaded or applied
    ConfigFail(String),
    /// Metadata extraction failed
    ProbeFail(String),
    /// The editing-control server cannot be reached
    ServerUnavailable(String),
    /// Processing error
    ProcessingError(String),
}

impl fmt::Display for DomainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DomainError::BadArgs(msg) => write!(f, "Bad arguments: {}", msg),
            DomainError::FileNotFound(msg) => write!(f, "File not found: {}", msg),
            DomainError::InvalidFormat(msg) => write!(f, "Invalid format: {}", msg),
            DomainError::ConfigFail(msg) => write!(f, "Configuration error: {}", msg),
            DomainError::ProbeFail(msg) => write!(f, "Probe failed: {}", msg),
            DomainError::ServerUnavailable(msg) => write!(f, "Server unavailable: {}", msg),
            DomainError::ProcessingError(msg) => write!(f, "Processing error: {}", msg),
        }
    }
}

impl std::error::Error for DomainError {}

impl From<ProbeError> for DomainError {
    fn from(err: ProbeError) -> Self {
        match err {
            ProbeError::FileNotFound { path } => DomainError::FileNotFound(path),
            other => DomainError::ProbeFail(other.to_string()),
        }
    }
}

impl From<ControlError> for DomainError {
    fn from(err: ControlError) -> Self {
        if err.is_connection_failure() {
            DomainError::ServerUnavailable(err.to_string())
        } else {
            DomainError::ProcessingError(err.to_string())
        }
    }
}

impl From<ConfigError> for DomainError {
    fn from(err: ConfigError) -> Self {
        DomainError::ConfigFail(err.to_string())
    }
}
