//! SPDX JSON loader.
//!
//! Reads SPDX 2.x JSON documents. Required package fields are validated up
//! front so that later stages can rely on them being present.

use crate::model::{
    Checksum, Creator, DocumentMetadata, ExternalRef, InputFormat, Package, PackageFile,
    RefCategory, RelationshipEdge, RelationshipKind, SbomDocument, NO_ASSERTION,
};
use crate::parsers::traits::{ParseError, SbomLoader};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::collections::HashMap;

/// Loader for SPDX JSON documents
#[derive(Debug, Default, Clone, Copy)]
pub struct SpdxJsonLoader;

impl SpdxJsonLoader {
    /// Create a new SPDX JSON loader
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Load an SPDX document from a JSON reader
    pub fn load_reader<R: std::io::Read>(&self, reader: R) -> Result<SbomDocument, ParseError> {
        let spdx: SpdxDocument = serde_json::from_reader(reader)?;
        convert_document(spdx)
    }
}

impl SbomLoader for SpdxJsonLoader {
    fn parse_str(&self, content: &str) -> Result<SbomDocument, ParseError> {
        let spdx: SpdxDocument = serde_json::from_str(content)?;
        convert_document(spdx)
    }

    fn format(&self) -> InputFormat {
        InputFormat::SpdxJson
    }
}

fn convert_document(spdx: SpdxDocument) -> Result<SbomDocument, ParseError> {
    let mut sbom = SbomDocument::new(convert_metadata(&spdx));

    let packages = spdx
        .packages
        .ok_or_else(|| ParseError::missing_field("packages", "document"))?;

    let files: HashMap<String, PackageFile> = spdx
        .files
        .unwrap_or_default()
        .into_iter()
        .enumerate()
        .map(|(idx, file)| convert_file(file, idx))
        .collect::<Result<Vec<_>, _>>()?
        .into_iter()
        .map(|f| (f.id.clone(), f))
        .collect();

    for (idx, pkg) in packages.into_iter().enumerate() {
        let package = convert_package(pkg, idx, &files)?;
        sbom.add_package(package);
    }

    let relationships = spdx.relationships.unwrap_or_default();
    if relationships.is_empty() {
        tracing::debug!("No relationships declared; dependencies will be flat");
    }
    for (idx, rel) in relationships.into_iter().enumerate() {
        let record = format!("relationships[{idx}]");
        let from = require(rel.spdx_element_id, "spdxElementId", &record)?;
        let to = require(rel.related_spdx_element, "relatedSpdxElement", &record)?;
        let kind = RelationshipKind::parse(&require(
            rel.relationship_type,
            "relationshipType",
            &record,
        )?);
        if kind == RelationshipKind::DependsOn {
            sbom.add_edge(RelationshipEdge::new(from, to, kind));
        }
    }

    sbom.log_collision_summary();
    Ok(sbom)
}

fn convert_metadata(spdx: &SpdxDocument) -> DocumentMetadata {
    let spec_version = spdx
        .spdx_version
        .as_deref()
        .map(|v| v.strip_prefix("SPDX-").unwrap_or(v).to_string());

    let created = spdx
        .creation_info
        .as_ref()
        .and_then(|ci| ci.created.as_deref())
        .and_then(|c| DateTime::parse_from_rfc3339(c).ok())
        .map(|dt| dt.with_timezone(&Utc));

    let creators = spdx
        .creation_info
        .as_ref()
        .map(|ci| ci.creators.iter().map(|c| Creator::parse(c)).collect())
        .unwrap_or_default();

    DocumentMetadata {
        format: InputFormat::SpdxJson,
        spec_version,
        name: spdx.name.clone(),
        created,
        creators,
    }
}

fn convert_package(
    pkg: SpdxPackage,
    idx: usize,
    files: &HashMap<String, PackageFile>,
) -> Result<Package, ParseError> {
    let record = format!("packages[{idx}]");
    let id = require(pkg.spdx_id, "SPDXID", &record)?;
    let name = require(pkg.name, "name", &record)?;

    let mut package = Package::new(id, name);
    package.version = asserted(pkg.version_info);
    package.file_name = asserted(pkg.package_file_name);
    package.download_location = asserted(pkg.download_location);

    for (cidx, checksum) in pkg.checksums.unwrap_or_default().into_iter().enumerate() {
        let record = format!("{record}.checksums[{cidx}]");
        let algorithm = require(checksum.algorithm, "algorithm", &record)?;
        let value = require(checksum.checksum_value, "checksumValue", &record)?;
        package.checksums.push(Checksum::new(&algorithm, value));
    }

    for (ridx, ext_ref) in pkg.external_refs.unwrap_or_default().into_iter().enumerate() {
        let record = format!("{record}.externalRefs[{ridx}]");
        let category = require(ext_ref.reference_category, "referenceCategory", &record)?;
        let locator = require(ext_ref.reference_locator, "referenceLocator", &record)?;
        package.external_refs.push(ExternalRef {
            category: RefCategory::parse(&category),
            ref_type: ext_ref.reference_type,
            locator,
        });
    }

    for file_id in pkg.has_files.unwrap_or_default() {
        if package.files.iter().any(|f| f.id == file_id) {
            continue;
        }
        match files.get(&file_id) {
            Some(file) => package.files.push(file.clone()),
            None => tracing::debug!(
                package = %package.id,
                file = %file_id,
                "hasFiles entry has no matching file record"
            ),
        }
    }

    Ok(package)
}

fn convert_file(file: SpdxFile, idx: usize) -> Result<PackageFile, ParseError> {
    let record = format!("files[{idx}]");
    let id = require(file.spdx_id, "SPDXID", &record)?;
    let file_name = require(file.file_name, "fileName", &record)?;
    let sha1 = file
        .checksums
        .unwrap_or_default()
        .into_iter()
        .filter_map(|c| Some(Checksum::new(&c.algorithm?, c.checksum_value?)))
        .find(Checksum::is_sha1)
        .map(|c| c.value);

    Ok(PackageFile {
        id,
        file_name,
        sha1,
    })
}

/// Require a field to be present and non-blank.
fn require(value: Option<String>, field: &str, record: &str) -> Result<String, ParseError> {
    value
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| ParseError::missing_field(field, record))
}

/// Normalize an optional SPDX value: blanks, `NOASSERTION` and `NONE` are absent.
pub(crate) fn asserted(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty() && v != NO_ASSERTION && v != "NONE")
}

// ============================================================================
// SPDX JSON structures
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SpdxDocument {
    spdx_version: Option<String>,
    name: Option<String>,
    creation_info: Option<SpdxCreationInfo>,
    packages: Option<Vec<SpdxPackage>>,
    files: Option<Vec<SpdxFile>>,
    relationships: Option<Vec<SpdxRelationship>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SpdxCreationInfo {
    created: Option<String>,
    #[serde(default)]
    creators: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SpdxPackage {
    #[serde(rename = "SPDXID")]
    spdx_id: Option<String>,
    name: Option<String>,
    version_info: Option<String>,
    package_file_name: Option<String>,
    download_location: Option<String>,
    checksums: Option<Vec<SpdxChecksum>>,
    external_refs: Option<Vec<SpdxExternalRef>>,
    has_files: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SpdxChecksum {
    algorithm: Option<String>,
    checksum_value: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SpdxExternalRef {
    reference_category: Option<String>,
    reference_type: Option<String>,
    reference_locator: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SpdxFile {
    #[serde(rename = "SPDXID")]
    spdx_id: Option<String>,
    file_name: Option<String>,
    checksums: Option<Vec<SpdxChecksum>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SpdxRelationship {
    spdx_element_id: Option<String>,
    relationship_type: Option<String>,
    related_spdx_element: Option<String>,
}
