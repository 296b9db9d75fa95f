//! Error types and error handling for kmgr.
//!
//! This module defines the error types used throughout the
//! application. Protocol-specific error handling (HTTP status codes,
//! MCP error codes) is handled in the respective adapter modules.

use thiserror::Error;

/// Result type alias for kmgr operations
pub type Result<T> = std::result::Result<T, KmgrError>;

/// Main error type for kmgr
#[derive(Error, Debug)]
pub enum KmgrError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Access denied: {0}")]
    AccessDenied(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Method not allowed: {0}")]
    MethodNotAllowed(String),

    #[error("Too large: {0}")]
    TooLarge(String),

    #[error("Empty export: {0}")]
    EmptyExport(String),

    #[error("Pack not created: {0}")]
    NotCreated(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Archive error: {0}")]
    Archive(#[from] zip::result::ZipError),
}

impl KmgrError {
    /// Get user-friendly error message
    pub fn message(&self) -> String {
        self.to_string()
    }

    /// Caller supplied malformed or out-of-range input
    pub fn is_bad_request(&self) -> bool {
        matches!(
            self,
            KmgrError::BadRequest(_)
                | KmgrError::TooLarge(_)
                | KmgrError::EmptyExport(_)
                | KmgrError::NotCreated(_)
                | KmgrError::ConfigError(_)
        )
    }

    /// Path escaped the configured roots
    pub fn is_access_denied(&self) -> bool {
        matches!(self, KmgrError::AccessDenied(_))
    }

    /// Target missing, including an io error of kind NotFound
    pub fn is_not_found(&self) -> bool {
        match self {
            KmgrError::NotFound(_) => true,
            KmgrError::Io(e) => e.kind() == std::io::ErrorKind::NotFound,
            _ => false,
        }
    }

    /// Failures worth another attempt under the bounded retry policy
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            KmgrError::Io(_) | KmgrError::Archive(_) | KmgrError::Internal(_)
        )
    }
}
