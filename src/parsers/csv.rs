//! Tabular (CSV) loader.
//!
//! One package per row, checksum in a dedicated `sha1` column. The format
//! carries no relationships, so every loaded document is flat.

use crate::model::{DocumentMetadata, InputFormat, Package, SbomDocument};
use crate::parsers::spdx::asserted;
use crate::parsers::traits::{ParseError, SbomLoader};
use serde::Deserialize;

/// Columns every CSV export must carry
pub const REQUIRED_COLUMNS: [&str; 4] = ["name", "versionInfo", "packageFileName", "sha1"];

/// Loader for flat CSV package lists
#[derive(Debug, Default, Clone, Copy)]
pub struct CsvLoader;

impl CsvLoader {
    /// Create a new CSV loader
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl SbomLoader for CsvLoader {
    fn parse_str(&self, content: &str) -> Result<SbomDocument, ParseError> {
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(false)
            .from_reader(content.as_bytes());

        let headers = reader.headers()?.clone();
        let missing: Vec<&str> = REQUIRED_COLUMNS
            .iter()
            .copied()
            .filter(|col| !headers.iter().any(|h| h == *col))
            .collect();
        if !missing.is_empty() {
            return Err(ParseError::missing_field(missing.join(", "), "CSV header"));
        }

        let mut sbom = SbomDocument::new(DocumentMetadata {
            format: InputFormat::Csv,
            ..DocumentMetadata::default()
        });

        for (idx, row) in reader.deserialize::<CsvRow>().enumerate() {
            let row = row?;
            // Header is line 1
            let record = format!("row {}", idx + 2);
            let name = row
                .name
                .filter(|n| !n.is_empty())
                .ok_or_else(|| ParseError::missing_field("name", &record))?;

            let mut package = Package::new(format!("CSVRef-{}", idx + 1), name);
            package.version = asserted(row.version_info);
            package.file_name = asserted(row.package_file_name);
            if let Some(sha1) = asserted(row.sha1) {
                package = package.with_checksum("SHA1", sha1);
            }
            sbom.add_package(package);
        }

        tracing::debug!(packages = sbom.package_count(), "Loaded CSV package list");
        Ok(sbom)
    }

    fn format(&self) -> InputFormat {
        InputFormat::Csv
    }
}

/// One CSV row; license, supplier and homepage columns are accepted and ignored.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CsvRow {
    name: Option<String>,
    version_info: Option<String>,
    package_file_name: Option<String>,
    sha1: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "name,licenseConcluded,licenseInfoFromFiles,licenseDeclared,copyrightText,versionInfo,packageFileName,supplier,originator,homepage,sha1";

    #[test]
    fn test_parse_rows() {
        let content = format!(
            "{HEADER}\n\
             guava,Apache-2.0,,,,31.1,guava-31.1.jar,Google,,https://github.com/google/guava,abcdef\n\
             left-pad,MIT,,,,1.3.0,,,,,\n"
        );
        let doc = CsvLoader::new().parse_str(&content).unwrap();

        assert_eq!(doc.package_count(), 2);
        assert!(doc.edges.is_empty());
        assert_eq!(doc.document.format, InputFormat::Csv);

        let guava = doc.get_package("CSVRef-1").unwrap();
        assert_eq!(guava.sha1(), Some("abcdef"));
        assert_eq!(guava.artifact_name(), "guava-31.1.jar");

        let left_pad = doc.get_package("CSVRef-2").unwrap();
        assert_eq!(left_pad.sha1(), None);
        assert_eq!(left_pad.file_name, None);
        assert_eq!(left_pad.version.as_deref(), Some("1.3.0"));
    }

    #[test]
    fn test_missing_columns_are_listed() {
        let err = CsvLoader::new().parse_str("name,sha1\nfoo,abc\n").unwrap_err();
        match err {
            ParseError::MissingField { field, record } => {
                assert_eq!(field, "versionInfo, packageFileName");
                assert_eq!(record, "CSV header");
            }
            other => panic!("Expected MissingField, got {other:?}"),
        }
    }

    #[test]
    fn test_blank_name_is_reported_with_row() {
        let content = "name,versionInfo,packageFileName,sha1\n,1.0,a.jar,abc\n";
        let err = CsvLoader::new().parse_str(content).unwrap_err();
        assert!(err.to_string().contains("row 2"), "{err}");
    }

    #[test]
    fn test_ragged_row_is_an_error() {
        let content = "name,versionInfo,packageFileName,sha1\nfoo,1.0\n";
        let err = CsvLoader::new().parse_str(content).unwrap_err();
        assert!(matches!(err, ParseError::CsvError(_)));
    }
}
