//! Collaborator traits consumed by the resolution engine.
//!
//! The engine only sees these traits. [`super::MendClient`] implements all
//! three over HTTP; tests plug in in-memory stubs.

use super::codes;
use crate::error::Result;
use crate::model::UpdateRequest;
use indexmap::IndexMap;

/// One library lookup request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LibraryQuery<'a> {
    /// Ecosystem lookup code (`npm`, `maven`, ...)
    pub lookup_code: &'a str,
    /// Library name
    pub name: &'a str,
    /// Library version
    pub version: &'a str,
}

/// A successful lookup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LibraryMatch {
    /// SHA-1 of the matched artifact
    pub checksum: String,
    /// Canonical artifact id reported by the service
    pub artifact_id: String,
}

/// Result of a single lookup attempt.
///
/// Failures are values, not errors: the resolver decides which codes abort
/// the run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupOutcome {
    Found(LibraryMatch),
    Failed {
        /// Service error code; `None` for transport and decoding failures
        code: Option<i64>,
        message: String,
    },
}

impl LookupOutcome {
    /// Shorthand for a successful outcome
    pub fn found(checksum: impl Into<String>, artifact_id: impl Into<String>) -> Self {
        Self::Found(LibraryMatch {
            checksum: checksum.into(),
            artifact_id: artifact_id.into(),
        })
    }

    /// Shorthand for a failure carrying a service error code
    pub fn error(code: i64, message: impl Into<String>) -> Self {
        Self::Failed {
            code: Some(code),
            message: message.into(),
        }
    }

    /// Shorthand for a failure without a service error code
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Failed {
            code: None,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn is_found(&self) -> bool {
        matches!(self, Self::Found(_))
    }

    /// The service refused the credentials
    #[must_use]
    pub fn is_no_permission(&self) -> bool {
        matches!(self, Self::Failed { code: Some(c), .. } if *c == codes::NO_PERMISSION)
    }

    /// Too many libraries matched the query
    #[must_use]
    pub fn is_ambiguous(&self) -> bool {
        matches!(self, Self::Failed { code: Some(c), .. } if *c == codes::AMBIGUOUS_MATCH)
    }
}

/// Library lookup service.
///
/// Implementations must be shareable across resolver worker threads.
pub trait LibraryLookup: Send + Sync {
    /// Look up a library by ecosystem, name and version.
    fn lookup_library(&self, query: &LibraryQuery<'_>) -> LookupOutcome;
}

/// Project lookup service
pub trait ProjectLookup {
    /// Token of an existing project, by project name or token.
    ///
    /// Any failure means "no token available".
    fn project_token(&self, project: &str) -> Option<String>;
}

/// Upload service consuming the finished update request
pub trait UpdateUploader {
    fn upload(&self, request: &UpdateRequest) -> Result<UploadResult>;
}

/// What the upload service reports back
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UploadResult {
    pub organization: String,
    pub updated_projects: Vec<String>,
    pub created_projects: Vec<String>,
    /// Project name → project id
    pub project_ids: IndexMap<String, i64>,
    pub request_token: Option<String>,
}

impl UploadResult {
    /// Web UI link for a project, when its id is known.
    #[must_use]
    pub fn project_link(&self, base_url: &str, project: &str) -> Option<String> {
        self.project_ids.get(project).map(|id| {
            format!(
                "{}/Wss/WSS.html#!project;id={id}",
                base_url.trim_end_matches('/')
            )
        })
    }
}

impl<T: LibraryLookup + ?Sized> LibraryLookup for &T {
    fn lookup_library(&self, query: &LibraryQuery<'_>) -> LookupOutcome {
        (**self).lookup_library(query)
    }
}

impl<T: ProjectLookup + ?Sized> ProjectLookup for &T {
    fn project_token(&self, project: &str) -> Option<String> {
        (**self).project_token(project)
    }
}
