//! Metadata structures for loaded SBOM documents.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Input document format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum InputFormat {
    /// SPDX 2.x JSON document
    #[default]
    SpdxJson,
    /// Flat tabular export, one package per row
    Csv,
}

impl InputFormat {
    /// Pick the input format from a file path.
    ///
    /// Only a `.csv` extension selects the tabular loader; every other file is
    /// read as JSON.
    #[must_use]
    pub fn from_path(path: &std::path::Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("csv") => Self::Csv,
            _ => Self::SpdxJson,
        }
    }
}

impl std::fmt::Display for InputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SpdxJson => write!(f, "SPDX JSON"),
            Self::Csv => write!(f, "CSV"),
        }
    }
}

/// Document-level metadata
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocumentMetadata {
    /// Input format the document was loaded from
    pub format: InputFormat,
    /// SPDX version without the `SPDX-` prefix, when declared
    pub spec_version: Option<String>,
    /// Document name, used as the default project name
    pub name: Option<String>,
    /// Creation timestamp, when declared and parseable
    pub created: Option<DateTime<Utc>>,
    /// Creators/authors
    pub creators: Vec<Creator>,
}

impl DocumentMetadata {
    /// Names of the tools that generated the document, in declaration order.
    pub fn tool_names(&self) -> impl Iterator<Item = &str> {
        self.creators
            .iter()
            .filter(|c| c.creator_type == CreatorType::Tool)
            .map(|c| c.name.as_str())
    }
}

/// Creator information
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Creator {
    /// Creator type
    pub creator_type: CreatorType,
    /// Creator name
    pub name: String,
}

impl Creator {
    /// Parse an SPDX creator string such as `"Tool: syft-0.98.0"`.
    ///
    /// Strings without a recognised prefix are treated as tools.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let (creator_type, name) = raw.strip_prefix("Tool:").map_or_else(
            || {
                raw.strip_prefix("Organization:").map_or_else(
                    || {
                        raw.strip_prefix("Person:").map_or(
                            (CreatorType::Tool, raw.trim()),
                            |name| (CreatorType::Person, name.trim()),
                        )
                    },
                    |name| (CreatorType::Organization, name.trim()),
                )
            },
            |name| (CreatorType::Tool, name.trim()),
        );

        Self {
            creator_type,
            name: name.to_string(),
        }
    }
}

/// Type of creator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CreatorType {
    Person,
    Organization,
    Tool,
}
