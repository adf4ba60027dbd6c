//! SBOM loading stage.

use crate::model::SbomDocument;
use anyhow::{Context, Result};
use std::path::Path;

/// Load an SBOM file with context for error messages.
pub fn load_document(path: &Path) -> Result<SbomDocument> {
    tracing::info!("Loading SBOM: {}", path.display());

    let document = crate::parsers::load_sbom(path)
        .with_context(|| format!("Failed to load SBOM: {}", path.display()))?;

    tracing::info!(
        format = %document.document.format,
        edges = document.edges.len(),
        "Loaded {} packages",
        document.package_count()
    );

    Ok(document)
}
