//! Unified application error types for StudyStore.
//!
//! Every crate maps its internal errors into [`AppError`] for consistent
//! propagation through the `?` operator. Backend SDK errors never cross an
//! adapter boundary; they are wrapped as [`ErrorKind::StorageBackend`] with
//! the original error kept as the source.

use std::fmt;
use thiserror::Error;

/// Top-level error kind categorization used across the entire workspace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum ErrorKind {
    /// A drive, folder, file or record is absent at the requested identifier or path.
    NotFound,
    /// A folder record's policy flag forbids the attempted write or delete.
    InsufficientPrivileges,
    /// A storage backend (network, auth, quota, timeout) failed.
    StorageBackend,
    /// No adapter is registered for the requested drive type.
    UnsupportedDriveType,
    /// Input validation failed.
    Validation,
    /// A uniqueness constraint was violated.
    Conflict,
    /// A metadata store error occurred.
    Database,
    /// A configuration error occurred.
    Configuration,
    /// A serialization/deserialization error occurred.
    Serialization,
    /// An internal error occurred.
    Internal,
}

impl ErrorKind {
    /// Whether the caller is expected to recover from this kind, for
    /// example by running a repair or asking for different permissions.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::NotFound | Self::InsufficientPrivileges)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => write!(f, "NOT_FOUND"),
            Self::InsufficientPrivileges => write!(f, "INSUFFICIENT_PRIVILEGES"),
            Self::StorageBackend => write!(f, "STORAGE_BACKEND"),
            Self::UnsupportedDriveType => write!(f, "UNSUPPORTED_DRIVE_TYPE"),
            Self::Validation => write!(f, "VALIDATION"),
            Self::Conflict => write!(f, "CONFLICT"),
            Self::Database => write!(f, "DATABASE"),
            Self::Configuration => write!(f, "CONFIGURATION"),
            Self::Serialization => write!(f, "SERIALIZATION"),
            Self::Internal => write!(f, "INTERNAL"),
        }
    }
}

/// The unified application error used throughout StudyStore.
#[derive(Debug, Error)]
#[error("{kind}: {message}")]
pub struct AppError {
    /// The category of error.
    pub kind: ErrorKind,
    /// A human-readable error message.
    pub message: String,
    /// Optional underlying cause.
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl AppError {
    /// Create a new application error.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
        }
    }

    /// Create a new application error with an underlying cause.
    pub fn with_source(
        kind: ErrorKind,
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            kind,
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a not-found error.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, message)
    }

    /// Create an insufficient-privileges error.
    pub fn insufficient_privileges(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InsufficientPrivileges, message)
    }

    /// Create a storage backend error without a source.
    pub fn storage_backend(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::StorageBackend, message)
    }

    /// Create an unsupported-drive-type error.
    pub fn unsupported_drive_type(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::UnsupportedDriveType, message)
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, message)
    }

    /// Create a conflict error.
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Conflict, message)
    }

    /// Create a database error.
    pub fn database(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Database, message)
    }

    /// Create a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Configuration, message)
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal, message)
    }

    /// Prefix the message with additional context, keeping kind and source.
    pub fn context(mut self, context: impl fmt::Display) -> Self {
        self.message = format!("{context}: {}", self.message);
        self
    }

    /// Check whether this error is a not-found error.
    pub fn is_not_found(&self) -> bool {
        self.kind == ErrorKind::NotFound
    }
}

impl Clone for AppError {
    fn clone(&self) -> Self {
        Self {
            kind: self.kind,
            message: self.message.clone(),
            source: None,
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::with_source(
            ErrorKind::Serialization,
            format!("JSON serialization error: {err}"),
            err,
        )
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        let kind = if err.kind() == std::io::ErrorKind::NotFound {
            ErrorKind::NotFound
        } else {
            ErrorKind::StorageBackend
        };
        Self::with_source(kind, format!("I/O error: {err}"), err)
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        Self::with_source(
            ErrorKind::Configuration,
            format!("Configuration error: {err}"),
            err,
        )
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        Self::with_source(ErrorKind::Validation, format!("Invalid input: {err}"), err)
    }
}
