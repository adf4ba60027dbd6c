//! **Resolve Software Bills of Materials into dependency update requests.**
//!
//! `sbom-import` reads an SBOM, finds a SHA-1 checksum for every package and
//! nests the packages along their `DEPENDS_ON` relationships into the update
//! request format of the Mend inventory service. The request is written to
//! disk and, unless running offline, uploaded.
//!
//! ## Key Features
//!
//! - **Two Input Formats**: SPDX JSON documents and flat CSV package lists,
//!   normalized into one [`SbomDocument`] model.
//! - **Checksum Resolution**: declared SHA-1 checksums are used as-is; other
//!   packages are looked up by name and version across candidate ecosystems
//!   inferred from package URLs, file extensions and the generating tool.
//! - **Deterministic Trees**: every package identity appears once, at the
//!   first point it is reached; relationship cycles terminate.
//! - **Parallel Lookups**: an optional worker pool resolves packages
//!   concurrently without changing the output.
//!
//! ## Core Concepts & Modules
//!
//! - **[`model`]**: the loaded document, the ecosystem catalog and the
//!   update request format.
//! - **[`parsers`]**: SPDX JSON and CSV loaders.
//! - **[`resolve`]**: the [`ResolutionEngine`]: candidate inference, the
//!   library resolver and the tree builder.
//! - **[`request`]**: scope parsing and the [`UpdateRequestAssembler`].
//! - **[`client`]**: lookup and upload traits plus the HTTP [`MendClient`].
//! - **[`pipeline`]**: load → scope → resolve → write → upload.
//!
//! ## Getting Started
//!
//! ```no_run
//! use std::path::Path;
//! use sbom_import::{load_sbom, EngineOptions, MendClient, MendClientConfig, ResolutionEngine};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let sbom = load_sbom(Path::new("path/to/sbom.spdx.json"))?;
//!     let client = MendClient::new(MendClientConfig {
//!         user_key: "user-key".to_string(),
//!         org_token: "org-token".to_string(),
//!         ..MendClientConfig::default()
//!     })?;
//!
//!     let outcome = ResolutionEngine::new(&client, EngineOptions::default()).run(&sbom)?;
//!     println!(
//!         "Resolved {} of {} packages",
//!         outcome.stats.resolved(),
//!         outcome.stats.packages
//!     );
//!
//!     Ok(())
//! }
//! ```

// Lint to discourage unwrap() in production code - prefer explicit error handling
#![warn(clippy::unwrap_used)]
#![allow(
    // Doc completeness: # Errors / # Panics sections are aspirational
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    // Config structs legitimately use many bools for toggle flags
    clippy::struct_excessive_bools,
    clippy::module_name_repetitions
)]

pub mod cli;
pub mod client;
pub mod config;
pub mod error;
pub mod model;
pub mod parsers;
pub mod pipeline;
pub mod request;
pub mod resolve;

// Re-export main types for convenience
pub use client::{
    LibraryLookup, MendClient, MendClientConfig, ProjectLookup, UpdateUploader, UploadResult,
};
pub use config::{ConfigError, ImportConfig, ImportConfigBuilder, Validatable};
pub use error::{ImportError, Result};
pub use model::{ResolvedDependency, SbomDocument, UpdateRequest, UpdateType};
pub use parsers::{load_sbom, parse_sbom_str, SbomLoader};
pub use pipeline::{run_import, ImportReport, ImportServices, PipelineError};
pub use request::{resolve_scope, ResolvedScope, Scope, UpdateRequestAssembler};
pub use resolve::{EngineOptions, ResolutionEngine, ResolutionOutcome, ResolveStats};
