//! Update request output stage.

use crate::config::OutputConfig;
use crate::model::UpdateRequest;
use anyhow::{Context, Result};
use std::path::PathBuf;

/// Write the update request as pretty JSON, creating the output directory
/// when missing. Returns the written path.
pub fn write_request(request: &UpdateRequest, output: &OutputConfig) -> Result<PathBuf> {
    if !output.dir.is_dir() {
        tracing::info!("Creating output directory: {}", output.dir.display());
        std::fs::create_dir_all(&output.dir).with_context(|| {
            format!("Failed to create output directory {}", output.dir.display())
        })?;
    }

    let path = output.request_path();
    let content =
        serde_json::to_string_pretty(request).context("Failed to serialize update request")?;
    std::fs::write(&path, content)
        .with_context(|| format!("Failed to write update request to {}", path.display()))?;

    tracing::info!("Update request created successfully: {}", path.display());
    Ok(path)
}
