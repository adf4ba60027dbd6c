//! Checksum resolution and dependency tree construction.
//!
//! Turns a loaded [`SbomDocument`](crate::model::SbomDocument) into the
//! nested dependency list of an update request:
//! - packages with a declared SHA-1 are used as-is
//! - other packages are looked up by name and version across candidate
//!   ecosystems (see [`infer_candidates`])
//! - resolved packages are nested along `DEPENDS_ON` edges, each identity
//!   emitted once

mod candidates;
mod context;
mod engine;
mod naming;
mod resolver;
mod tree;

pub use candidates::{
    infer_candidates, package_manager_type, CandidateSet, CandidateTier, InferenceHints,
};
pub use context::{
    ChecksumSource, Resolution, ResolutionContext, ResolveStats, ResolvedPackage,
};
pub use engine::{EngineOptions, ResolutionEngine, ResolutionOutcome};
pub use naming::{CreatorHint, NameTemplate, NormalizedName};
pub use resolver::{LibraryResolver, LookupCache, ResolveAttempt};
pub use tree::{TreeBuilder, MAX_TREE_DEPTH};
