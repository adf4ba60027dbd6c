//! Loader trait definitions and error types.
//!
//! This module defines the `SbomLoader` trait implemented by the SPDX JSON
//! and CSV loaders, and the `ParseError` they report.

use crate::error::{ImportError, ParseErrorKind};
use crate::model::{InputFormat, SbomDocument};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur while loading an SBOM
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    JsonError(String),

    #[error("CSV parse error: {0}")]
    CsvError(String),

    #[error("Missing required field '{field}' in {record}")]
    MissingField { field: String, record: String },

    #[error("Invalid SBOM structure: {0}")]
    InvalidStructure(String),

    #[error("{}: {source}", .path.display())]
    InFile {
        path: PathBuf,
        #[source]
        source: Box<ParseError>,
    },
}

impl ParseError {
    /// Create a missing-field error
    pub fn missing_field(field: impl Into<String>, record: impl Into<String>) -> Self {
        Self::MissingField {
            field: field.into(),
            record: record.into(),
        }
    }

    /// Attach the file the error came from.
    #[must_use]
    pub fn in_file(self, path: &Path) -> Self {
        match self {
            already @ Self::InFile { .. } => already,
            other => Self::InFile {
                path: path.to_path_buf(),
                source: Box::new(other),
            },
        }
    }

    /// The file this error names, if any
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::InFile { path, .. } => Some(path),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for ParseError {
    fn from(err: serde_json::Error) -> Self {
        Self::JsonError(err.to_string())
    }
}

impl From<csv::Error> for ParseError {
    fn from(err: csv::Error) -> Self {
        Self::CsvError(err.to_string())
    }
}

impl From<ParseError> for ImportError {
    fn from(err: ParseError) -> Self {
        let (path, inner) = match err {
            ParseError::InFile { path, source } => (Some(path), *source),
            other => (None, other),
        };
        let context = path
            .as_ref()
            .map_or_else(|| "input".to_string(), |p| p.display().to_string());

        match inner {
            ParseError::Io(source) => Self::Io {
                path,
                message: source.to_string(),
                source,
            },
            ParseError::JsonError(msg) => Self::parse(context, ParseErrorKind::InvalidJson(msg)),
            ParseError::CsvError(msg) => Self::parse(context, ParseErrorKind::InvalidCsv(msg)),
            ParseError::MissingField { field, record } => Self::parse(
                context,
                ParseErrorKind::MissingField {
                    field,
                    context: record,
                },
            ),
            ParseError::InvalidStructure(msg) => {
                Self::parse(context, ParseErrorKind::InvalidStructure(msg))
            }
            nested @ ParseError::InFile { .. } => Self::parse(
                context,
                ParseErrorKind::InvalidStructure(nested.to_string()),
            ),
        }
    }
}

/// Trait for SBOM input loaders
pub trait SbomLoader {
    /// Load an SBOM from a file path; errors name the file.
    fn load(&self, path: &Path) -> Result<SbomDocument, ParseError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| ParseError::from(e).in_file(path))?;
        self.parse_str(&content).map_err(|e| e.in_file(path))
    }

    /// Load an SBOM from string content
    fn parse_str(&self, content: &str) -> Result<SbomDocument, ParseError>;

    /// Format handled by this loader
    fn format(&self) -> InputFormat;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_file_names_path() {
        let err = ParseError::missing_field("SPDXID", "packages[2]").in_file(Path::new("bom.json"));
        let display = err.to_string();
        assert!(display.starts_with("bom.json"), "{display}");
        assert!(display.contains("packages[2]"));
        assert_eq!(err.path(), Some(Path::new("bom.json")));
    }

    #[test]
    fn test_in_file_is_not_nested() {
        let err = ParseError::InvalidStructure("x".to_string())
            .in_file(Path::new("a.json"))
            .in_file(Path::new("b.json"));
        assert_eq!(err.path(), Some(Path::new("a.json")));
    }

    #[test]
    fn test_conversion_to_import_error() {
        let err: ImportError = ParseError::missing_field("name", "packages[0]")
            .in_file(Path::new("bom.json"))
            .into();
        let display = err.to_string();
        assert!(display.contains("bom.json"), "{display}");
        assert!(matches!(
            err,
            ImportError::Parse {
                source: ParseErrorKind::MissingField { .. },
                ..
            }
        ));
    }
}
