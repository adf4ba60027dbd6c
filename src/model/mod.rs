//! Data model for SBOM resolution.
//!
//! Both input formats are normalized into an [`SbomDocument`]. Resolution
//! produces [`ResolvedDependency`] trees, which the assembler wraps into an
//! [`UpdateRequest`].
//!
//! # Index Support
//!
//! Tree expansion uses a [`DependencyIndex`] built once per document:
//!
//! ```ignore
//! let index = DependencyIndex::build(&doc.edges);
//! let children = index.children_of("SPDXRef-Package-app");
//! ```

pub mod catalog;
mod dependency;
mod index;
mod metadata;
mod package;
mod request;
mod sbom;

pub use catalog::EcosystemType;
pub use dependency::*;
pub use index::*;
pub use metadata::*;
pub use package::*;
pub use request::*;
pub use sbom::*;
