//! Per-run resolution state.
//!
//! Everything a resolution pass mutates lives here and is threaded through
//! explicitly, so independent passes never share state.

use crate::model::catalog::EcosystemType;
use crate::model::ResolvedDependency;
use serde::Serialize;
use std::collections::HashMap;

/// Where a resolved checksum came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChecksumSource {
    /// Declared in the SBOM
    Declared,
    /// Returned by the lookup service for this ecosystem
    Lookup(&'static EcosystemType),
}

/// A package with a usable checksum
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPackage {
    pub artifact_id: String,
    pub version: String,
    pub checksum: String,
    pub file_name: String,
    pub source: ChecksumSource,
}

impl ResolvedPackage {
    /// Output node for this package, without children
    #[must_use]
    pub fn to_dependency(&self) -> ResolvedDependency {
        ResolvedDependency::new(
            self.artifact_id.clone(),
            self.version.clone(),
            self.checksum.clone(),
            self.file_name.clone(),
        )
    }
}

/// Per-package resolution result
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Resolved(ResolvedPackage),
    /// The `NOASSERTION` sentinel; skipped without a not-found report
    Sentinel,
    /// No checksum could be obtained
    Unresolved { reason: String },
}

impl Resolution {
    #[must_use]
    pub const fn as_resolved(&self) -> Option<&ResolvedPackage> {
        match self {
            Self::Resolved(resolved) => Some(resolved),
            _ => None,
        }
    }
}

/// Counters for one resolution pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ResolveStats {
    /// Packages in the document
    pub packages: usize,
    /// Resolved from a declared SHA-1
    pub declared: usize,
    /// Resolved through the lookup service
    pub looked_up: usize,
    /// `NOASSERTION` sentinels skipped
    pub sentinels: usize,
    /// Packages without a checksum after all candidates
    pub not_found: usize,
    /// Lookup service calls
    pub lookup_calls: usize,
    /// Lookups answered from the within-run memo
    pub cache_hits: usize,
    /// Resolved packages dropped because their identity was already emitted
    pub duplicates: usize,
}

impl ResolveStats {
    fn count(&mut self, resolution: &Resolution) {
        self.packages += 1;
        match resolution {
            Resolution::Resolved(ResolvedPackage {
                source: ChecksumSource::Declared,
                ..
            }) => self.declared += 1,
            Resolution::Resolved(_) => self.looked_up += 1,
            Resolution::Sentinel => self.sentinels += 1,
            Resolution::Unresolved { .. } => self.not_found += 1,
        }
    }

    /// Packages that made it into the output
    #[must_use]
    pub const fn resolved(&self) -> usize {
        self.declared + self.looked_up
    }

    /// Log a one-line summary
    pub fn log_summary(&self) {
        tracing::info!(
            packages = self.packages,
            declared = self.declared,
            looked_up = self.looked_up,
            not_found = self.not_found,
            sentinels = self.sentinels,
            lookup_calls = self.lookup_calls,
            cache_hits = self.cache_hits,
            duplicates = self.duplicates,
            "Resolved {} of {} packages",
            self.resolved(),
            self.packages
        );
    }
}

/// Mutable state of one resolution pass
#[derive(Debug, Default)]
pub struct ResolutionContext {
    /// Ecosystem that resolved the most recent looked-up package
    sticky: Option<&'static EcosystemType>,
    resolutions: HashMap<String, Resolution>,
    stats: ResolveStats,
}

impl ResolutionContext {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Ecosystem to promote in the next fallback candidate list
    #[must_use]
    pub const fn sticky(&self) -> Option<&'static EcosystemType> {
        self.sticky
    }

    /// Record a package's resolution, updating stickiness on lookup success.
    pub fn record(&mut self, package_id: &str, resolution: Resolution) {
        if let Resolution::Resolved(ResolvedPackage {
            source: ChecksumSource::Lookup(ecosystem),
            ..
        }) = &resolution
        {
            self.sticky = Some(*ecosystem);
        }
        self.stats.count(&resolution);
        self.resolutions.insert(package_id.to_string(), resolution);
    }

    /// Resolution recorded for a package id
    #[must_use]
    pub fn get(&self, package_id: &str) -> Option<&Resolution> {
        self.resolutions.get(package_id)
    }

    /// Resolved package for an id, if it resolved
    #[must_use]
    pub fn resolved(&self, package_id: &str) -> Option<&ResolvedPackage> {
        self.get(package_id).and_then(Resolution::as_resolved)
    }

    #[must_use]
    pub const fn stats(&self) -> &ResolveStats {
        &self.stats
    }

    pub fn stats_mut(&mut self) -> &mut ResolveStats {
        &mut self.stats
    }
}
