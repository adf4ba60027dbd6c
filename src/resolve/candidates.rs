//! Candidate ecosystem inference.
//!
//! For a package without a usable checksum, derive the ordered list of
//! ecosystems to query. Tiers are evaluated in order; the first that
//! produces candidates wins:
//!
//! 1. Package-manager reference (`pkg:<type>/...`): sole candidate
//! 2. File extension: every catalog type sharing it
//! 3. Creator-tool or name-prefix hint: the hinted type alone
//! 4. Fallback: the whole catalog, last successful type and hinted type
//!    first
//!
//! Multilingual mode skips tiers 2 and 3.

use crate::model::catalog::{self, EcosystemType};
use crate::model::Package;
use packageurl::PackageUrl;
use regex::Regex;
use std::str::FromStr;
use std::sync::LazyLock;

static PURL_TYPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^pkg:([^/]+)/").expect("static regex"));

/// Tier that produced a candidate set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CandidateTier {
    PackageManager,
    CreatorHint,
    Extension,
    Fallback,
}

impl std::fmt::Display for CandidateTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::PackageManager => write!(f, "package-manager"),
            Self::CreatorHint => write!(f, "creator-hint"),
            Self::Extension => write!(f, "extension"),
            Self::Fallback => write!(f, "fallback"),
        }
    }
}

/// Ordered candidates plus the tier they came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateSet {
    pub tier: CandidateTier,
    pub candidates: Vec<&'static EcosystemType>,
}

impl CandidateSet {
    fn new(tier: CandidateTier, candidates: Vec<&'static EcosystemType>) -> Self {
        Self {
            tier,
            candidates: dedup_by_lookup_code(candidates),
        }
    }

    /// Lookup codes in try order
    #[must_use]
    pub fn lookup_codes(&self) -> Vec<&'static str> {
        self.candidates.iter().map(|e| e.lookup_code).collect()
    }

    #[must_use]
    pub fn first(&self) -> Option<&'static EcosystemType> {
        self.candidates.first().copied()
    }
}

/// Inputs to candidate inference besides the package itself
#[derive(Debug, Clone, Copy, Default)]
pub struct InferenceHints {
    /// Ecosystem suggested by the creator tool or the package name
    pub creator: Option<&'static EcosystemType>,
    /// Ecosystem that resolved the previous package
    pub sticky: Option<&'static EcosystemType>,
    /// Search every ecosystem regardless of extension or hint
    pub multilingual: bool,
}

/// Derive the ordered candidate ecosystems for a package.
#[must_use]
pub fn infer_candidates(package: &Package, hints: &InferenceHints) -> CandidateSet {
    if let Some(ecosystem) = package_manager_type(package) {
        return CandidateSet::new(CandidateTier::PackageManager, vec![ecosystem]);
    }

    if !hints.multilingual {
        if let Some(ext) = package.file_extension() {
            let by_ext = catalog::by_extension(&ext);
            if !by_ext.is_empty() {
                return CandidateSet::new(CandidateTier::Extension, by_ext);
            }
        }
        if let Some(hinted) = hints.creator {
            return CandidateSet::new(CandidateTier::CreatorHint, vec![hinted]);
        }
    }

    let mut ordered: Vec<&'static EcosystemType> = Vec::with_capacity(catalog::all().len() + 2);
    ordered.extend(hints.sticky);
    ordered.extend(hints.creator);
    ordered.extend(catalog::all().iter());
    CandidateSet::new(CandidateTier::Fallback, ordered)
}

/// Ecosystem named by the package's package-manager references.
///
/// References are tried in declaration order; the first whose purl type is
/// in the catalog wins.
#[must_use]
pub fn package_manager_type(package: &Package) -> Option<&'static EcosystemType> {
    package
        .package_manager_refs()
        .find_map(|r| ecosystem_of_locator(&package.name, r.locator.trim()))
}

fn ecosystem_of_locator(name: &str, locator: &str) -> Option<&'static EcosystemType> {
    let purl_type = match PackageUrl::from_str(locator) {
        Ok(purl) => purl.ty().to_string(),
        Err(_) => PURL_TYPE.captures(locator)?.get(1)?.as_str().trim().to_string(),
    };
    let found = catalog::by_key(&purl_type);
    if found.is_none() {
        tracing::debug!(
            package = %name,
            purl_type = %purl_type,
            "Package-manager type not in catalog"
        );
    }
    found
}

/// Keep the first entry per lookup code; querying a code twice is pointless.
fn dedup_by_lookup_code(candidates: Vec<&'static EcosystemType>) -> Vec<&'static EcosystemType> {
    let mut seen = Vec::with_capacity(candidates.len());
    candidates
        .into_iter()
        .filter(|e| {
            if seen.contains(&e.lookup_code) {
                false
            } else {
                seen.push(e.lookup_code);
                true
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn npm() -> &'static EcosystemType {
        catalog::by_key("npm").unwrap()
    }

    fn ruby() -> &'static EcosystemType {
        catalog::by_key("gem").unwrap()
    }

    #[test]
    fn test_package_manager_tier_is_sole_candidate() {
        let pkg = Package::new("SPDXRef-a", "left-pad")
            .with_file_name("left-pad-1.3.0.jar")
            .with_external_ref("PACKAGE-MANAGER", "pkg:npm/left-pad@1.3.0");
        let set = infer_candidates(&pkg, &InferenceHints::default());
        assert_eq!(set.tier, CandidateTier::PackageManager);
        assert_eq!(set.lookup_codes(), vec!["npm"]);
    }

    #[test]
    fn test_package_manager_underscore_category() {
        let pkg = Package::new("SPDXRef-a", "requests")
            .with_external_ref("PACKAGE_MANAGER", "pkg:pypi/requests@2.31.0");
        assert_eq!(package_manager_type(&pkg).map(|e| e.key), Some("pypi"));
    }

    #[test]
    fn test_malformed_purl_falls_back_to_prefix() {
        let pkg = Package::new("SPDXRef-a", "x")
            .with_external_ref("PACKAGE-MANAGER", "pkg:golang/github.com/a b c@@");
        assert_eq!(package_manager_type(&pkg).map(|e| e.key), Some("go"));
    }

    #[test]
    fn test_unknown_purl_type_falls_through() {
        let pkg = Package::new("SPDXRef-a", "x")
            .with_file_name("x-1.0.gem")
            .with_external_ref("PACKAGE-MANAGER", "pkg:swift/x@1.0");
        let set = infer_candidates(&pkg, &InferenceHints::default());
        assert_eq!(set.tier, CandidateTier::Extension);
        assert_eq!(set.lookup_codes(), vec!["ruby"]);
    }

    #[test]
    fn test_later_known_reference_wins_over_unknown_type() {
        let pkg = Package::new("SPDXRef-a", "left-pad")
            .with_external_ref("PACKAGE-MANAGER", "pkg:swift/left-pad@1.3.0")
            .with_external_ref("PACKAGE-MANAGER", "pkg:npm/left-pad@1.3.0");
        let set = infer_candidates(&pkg, &InferenceHints::default());
        assert_eq!(set.tier, CandidateTier::PackageManager);
        assert_eq!(set.lookup_codes(), vec!["npm"]);
    }

    #[test]
    fn test_first_known_reference_is_used() {
        let pkg = Package::new("SPDXRef-a", "requests")
            .with_external_ref("SECURITY", "cpe:2.3:a:python:requests:2.31.0")
            .with_external_ref("PACKAGE-MANAGER", "pkg:pypi/requests@2.31.0")
            .with_external_ref("PACKAGE-MANAGER", "pkg:npm/requests@2.31.0");
        assert_eq!(package_manager_type(&pkg).map(|e| e.key), Some("pypi"));
    }

    #[test]
    fn test_extension_tier_uses_download_location() {
        let pkg = Package::new("SPDXRef-a", "jquery")
            .with_download_location("https://cdn.example.com/jquery.js?v=3");
        let set = infer_candidates(&pkg, &InferenceHints::default());
        assert_eq!(set.tier, CandidateTier::Extension);
        assert_eq!(set.lookup_codes(), vec!["npm", "cdnjs"]);
    }

    #[test]
    fn test_creator_hint_restricts_fallback() {
        let pkg = Package::new("SPDXRef-a", "rack");
        let hints = InferenceHints {
            creator: Some(ruby()),
            ..InferenceHints::default()
        };
        let set = infer_candidates(&pkg, &hints);
        assert_eq!(set.tier, CandidateTier::CreatorHint);
        assert_eq!(set.lookup_codes(), vec!["ruby"]);
    }

    #[test]
    fn test_fallback_orders_sticky_first() {
        let pkg = Package::new("SPDXRef-a", "left-pad");
        let hints = InferenceHints {
            sticky: Some(npm()),
            ..InferenceHints::default()
        };
        let set = infer_candidates(&pkg, &hints);
        assert_eq!(set.tier, CandidateTier::Fallback);
        let codes = set.lookup_codes();
        assert_eq!(codes[0], "npm");
        assert_eq!(codes[1], "maven");
        assert_eq!(codes.iter().filter(|c| **c == "npm").count(), 1);
    }

    #[test]
    fn test_multilingual_skips_extension_and_uses_whole_catalog() {
        let pkg = Package::new("SPDXRef-a", "guava").with_file_name("guava.jar");
        let hints = InferenceHints {
            creator: Some(ruby()),
            multilingual: true,
            ..InferenceHints::default()
        };
        let set = infer_candidates(&pkg, &hints);
        assert_eq!(set.tier, CandidateTier::Fallback);
        assert_eq!(set.first().map(|e| e.key), Some("gem"));
        // rust and rlib share a lookup code
        assert_eq!(set.candidates.len(), catalog::all().len() - 1);
    }
}
