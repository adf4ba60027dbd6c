//! Unified error types for sbom-import.
//!
//! The hierarchy separates fatal conditions (unreadable input, missing scope,
//! authorization failures) from the recoverable per-package lookup failures,
//! which never surface as errors at all.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for sbom-import operations.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum ImportError {
    /// Errors while loading an SBOM document
    #[error("Failed to load SBOM: {context}")]
    Parse {
        context: String,
        #[source]
        source: ParseErrorKind,
    },

    /// Errors raised by the library lookup stage that abort the run
    #[error("Library lookup failed: {context}")]
    Lookup {
        context: String,
        #[source]
        source: LookupErrorKind,
    },

    /// Errors while handing the update request to the inventory service
    #[error("Upload failed: {context}")]
    Upload {
        context: String,
        #[source]
        source: UploadErrorKind,
    },

    /// IO errors with context
    #[error("IO error at {path:?}: {message}")]
    Io {
        path: Option<PathBuf>,
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// Scope could not be determined
    #[error("Invalid scope: {0}")]
    Scope(String),

    /// Configuration errors
    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Specific parse error kinds
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum ParseErrorKind {
    #[error("Unsupported input format: {0} (expected .json or .csv)")]
    UnsupportedFormat(String),

    #[error("Invalid JSON structure: {0}")]
    InvalidJson(String),

    #[error("Invalid CSV structure: {0}")]
    InvalidCsv(String),

    #[error("Missing required field: {field} in {context}")]
    MissingField { field: String, context: String },

    #[error("Invalid SBOM structure: {0}")]
    InvalidStructure(String),
}

/// Lookup failures that stop the whole resolution pass
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum LookupErrorKind {
    #[error("No permission (error code {code}): {message}")]
    PermissionDenied { code: i64, message: String },

    #[error("Resolution cancelled")]
    Cancelled,
}

/// Specific upload error kinds
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum UploadErrorKind {
    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Service rejected request: {0}")]
    Rejected(String),

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),
}

// ============================================================================
// Result type alias
// ============================================================================

/// Convenient Result type for sbom-import operations
pub type Result<T> = std::result::Result<T, ImportError>;

// ============================================================================
// Error construction helpers
// ============================================================================

impl ImportError {
    /// Create a parse error with context
    pub fn parse(context: impl Into<String>, source: ParseErrorKind) -> Self {
        Self::Parse {
            context: context.into(),
            source,
        }
    }

    /// Create the fatal authorization error
    pub fn permission_denied(code: i64, message: impl Into<String>) -> Self {
        Self::Lookup {
            context: "authorization".to_string(),
            source: LookupErrorKind::PermissionDenied {
                code,
                message: message.into(),
            },
        }
    }

    /// Create an upload error with context
    pub fn upload(context: impl Into<String>, source: UploadErrorKind) -> Self {
        Self::Upload {
            context: context.into(),
            source,
        }
    }

    /// Create a scope error
    pub fn scope(message: impl Into<String>) -> Self {
        Self::Scope(message.into())
    }

    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Whether this error came from an authorization failure at the lookup service.
    #[must_use]
    pub const fn is_permission_denied(&self) -> bool {
        matches!(
            self,
            Self::Lookup {
                source: LookupErrorKind::PermissionDenied { .. },
                ..
            }
        )
    }
}

// ============================================================================
// Conversions from existing error types
// ============================================================================

impl From<std::io::Error> for ImportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            path: None,
            message: format!("{err}"),
            source: err,
        }
    }
}

impl From<serde_json::Error> for ImportError {
    fn from(err: serde_json::Error) -> Self {
        Self::parse(
            "JSON deserialization",
            ParseErrorKind::InvalidJson(err.to_string()),
        )
    }
}

impl From<csv::Error> for ImportError {
    fn from(err: csv::Error) -> Self {
        Self::parse(
            "CSV deserialization",
            ParseErrorKind::InvalidCsv(err.to_string()),
        )
    }
}
