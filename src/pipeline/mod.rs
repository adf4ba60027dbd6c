//! Pipeline orchestration for the import workflow.
//!
//! load → scope → resolve → write → upload. Each stage reports its own
//! [`PipelineError`] variant so the binary can map failures to exit codes.
//! The update request is always written before the upload is attempted.

mod load;
mod output;
mod upload;

pub use load::load_document;
pub use output::write_request;
pub use upload::{format_upload_summary, upload_request};

use crate::client::{
    LibraryLookup, LibraryQuery, LookupOutcome, ProjectLookup, UpdateUploader, UploadResult,
};
use crate::config::ImportConfig;
use crate::error::ImportError;
use crate::model::UpdateRequest;
use crate::request::{resolve_scope, Scope, UpdateRequestAssembler};
use crate::resolve::{EngineOptions, ResolutionEngine, ResolveStats};
use std::path::{Path, PathBuf};

/// Structured pipeline error types for better diagnostics.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// Failed to read or parse the SBOM file
    #[error("Load failed for {path}: {source:#}")]
    LoadFailed {
        path: String,
        source: anyhow::Error,
    },

    /// Target project could not be determined
    #[error("Scope failed: {source}")]
    ScopeFailed {
        #[source]
        source: ImportError,
    },

    /// Resolution aborted
    #[error("Resolution failed: {source}")]
    ResolveFailed {
        #[source]
        source: ImportError,
    },

    /// The update request could not be written
    #[error("Write failed: {source:#}")]
    WriteFailed { source: anyhow::Error },

    /// Upload failed; the update request file was still written
    #[error("Upload failed ({}): {source}", .request_path.display())]
    UploadFailed {
        request_path: PathBuf,
        #[source]
        source: ImportError,
    },
}

impl PipelineError {
    /// Process exit code for this failure
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::UploadFailed { .. } => exit_codes::UPLOAD_FAILED,
            Self::ResolveFailed { source } if source.is_permission_denied() => {
                exit_codes::PERMISSION_DENIED
            }
            _ => exit_codes::ERROR,
        }
    }
}

/// Exit codes for CI/CD integration
pub mod exit_codes {
    /// Update request written (and uploaded unless offline)
    pub const SUCCESS: i32 = 0;
    /// Upload failed; the update request file was written
    pub const UPLOAD_FAILED: i32 = 1;
    /// The lookup service refused the credentials
    pub const PERMISSION_DENIED: i32 = 2;
    /// Any other error
    pub const ERROR: i32 = 3;
}

/// Services the pipeline talks to.
///
/// `projects` and `uploader` are optional: without a project lookup the
/// scope is always addressed by name, and without an uploader the run is
/// offline regardless of configuration.
pub struct ImportServices<'a> {
    pub lookup: &'a dyn LibraryLookup,
    pub projects: Option<&'a dyn ProjectLookup>,
    pub uploader: Option<&'a dyn UpdateUploader>,
}

/// Lookup stand-in used when no credentials are configured; only declared
/// checksums resolve.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoLookup;

impl LibraryLookup for NoLookup {
    fn lookup_library(&self, _query: &LibraryQuery<'_>) -> LookupOutcome {
        LookupOutcome::transport("no lookup service configured")
    }
}

/// What a successful run produced
#[derive(Debug, Clone)]
pub struct ImportReport {
    pub request: UpdateRequest,
    pub request_path: PathBuf,
    pub stats: ResolveStats,
    /// Present when the request was uploaded
    pub upload: Option<UploadResult>,
}

/// Run the whole import for one SBOM file.
pub fn run_import(
    sbom_path: &Path,
    config: &ImportConfig,
    services: &ImportServices<'_>,
) -> Result<ImportReport, PipelineError> {
    let document = load_document(sbom_path).map_err(|source| PipelineError::LoadFailed {
        path: sbom_path.display().to_string(),
        source,
    })?;

    tracing::debug!("Resolving project scope");
    let scope = Scope::parse(config.scope.scope.as_deref().unwrap_or_default())
        .map(|s| s.with_default_product(config.scope.product_token.as_deref()))
        .and_then(|s| resolve_scope(&s, services.projects, document.name()))
        .map_err(|source| PipelineError::ScopeFailed { source })?;

    let options = EngineOptions::from(&config.resolver);
    let outcome = ResolutionEngine::new(services.lookup, options)
        .run(&document)
        .map_err(|source| PipelineError::ResolveFailed { source })?;

    let request = UpdateRequestAssembler::new(config.scope.update_type)
        .with_org_token(config.server.org_token.clone().unwrap_or_default())
        .assemble(&scope, outcome.dependencies);

    let request_path = write_request(&request, &config.output)
        .map_err(|source| PipelineError::WriteFailed { source })?;

    let upload = match services.uploader {
        Some(uploader) if !config.output.offline => {
            let base_url = config.client_config().base_url;
            let result = upload_request(uploader, &request, &base_url).map_err(|source| {
                PipelineError::UploadFailed {
                    request_path: request_path.clone(),
                    source,
                }
            })?;
            Some(result)
        }
        _ => {
            tracing::info!("Offline mode: skipping upload");
            None
        }
    };

    Ok(ImportReport {
        request,
        request_path,
        stats: outcome.stats,
        upload,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LookupErrorKind;

    #[test]
    fn test_exit_codes_values() {
        assert_eq!(exit_codes::SUCCESS, 0);
        assert_eq!(exit_codes::UPLOAD_FAILED, 1);
        assert_eq!(exit_codes::PERMISSION_DENIED, 2);
        assert_eq!(exit_codes::ERROR, 3);
    }

    #[test]
    fn test_exit_code_mapping() {
        let denied = PipelineError::ResolveFailed {
            source: ImportError::permission_denied(5001, "no"),
        };
        assert_eq!(denied.exit_code(), exit_codes::PERMISSION_DENIED);

        let cancelled = PipelineError::ResolveFailed {
            source: ImportError::Lookup {
                context: "x".to_string(),
                source: LookupErrorKind::Cancelled,
            },
        };
        assert_eq!(cancelled.exit_code(), exit_codes::ERROR);

        let scope = PipelineError::ScopeFailed {
            source: ImportError::scope("none"),
        };
        assert_eq!(scope.exit_code(), exit_codes::ERROR);
    }

    #[test]
    fn test_no_lookup_never_finds() {
        let outcome = NoLookup.lookup_library(&LibraryQuery {
            lookup_code: "npm",
            name: "left-pad",
            version: "1.3.0",
        });
        assert!(!outcome.is_found());
        assert!(!outcome.is_no_permission());
    }
}
