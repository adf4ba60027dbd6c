//! The loaded SBOM document: packages plus relationship edges.

use super::{DocumentMetadata, Package, RelationshipEdge};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Uniform in-memory form of an SBOM, independent of the input format.
///
/// Packages keep their input order; resolution and output follow it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SbomDocument {
    /// Document-level metadata
    pub document: DocumentMetadata,
    /// Packages indexed by their document id
    pub packages: IndexMap<String, Package>,
    /// `DEPENDS_ON` edges between package ids
    pub edges: Vec<RelationshipEdge>,
    /// Number of package ids declared more than once
    #[serde(skip)]
    pub collision_count: usize,
}

impl SbomDocument {
    /// Create an empty document
    #[must_use]
    pub fn new(document: DocumentMetadata) -> Self {
        Self {
            document,
            packages: IndexMap::new(),
            edges: Vec::new(),
            collision_count: 0,
        }
    }

    /// Add a package.
    ///
    /// Returns `true` if a package with the same id was already present; the
    /// later declaration wins.
    pub fn add_package(&mut self, package: Package) -> bool {
        let id = package.id.clone();
        let replaced = self.packages.insert(id, package).is_some();
        if replaced {
            self.collision_count += 1;
        }
        replaced
    }

    /// Log a single summary line if any package ids collided during loading.
    pub fn log_collision_summary(&self) {
        if self.collision_count > 0 {
            tracing::warn!(
                collision_count = self.collision_count,
                "{} package ids were declared more than once; the last declaration was kept",
                self.collision_count
            );
        }
    }

    /// Add a relationship edge
    pub fn add_edge(&mut self, edge: RelationshipEdge) {
        self.edges.push(edge);
    }

    /// Get a package by id
    #[must_use]
    pub fn get_package(&self, id: &str) -> Option<&Package> {
        self.packages.get(id)
    }

    /// Total package count
    #[must_use]
    pub fn package_count(&self) -> usize {
        self.packages.len()
    }

    /// Declared document name, ignoring blanks
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.document
            .name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_package_counts_collisions() {
        let mut doc = SbomDocument::default();
        assert!(!doc.add_package(Package::new("SPDXRef-a", "a")));
        assert!(doc.add_package(Package::new("SPDXRef-a", "a2")));
        assert_eq!(doc.collision_count, 1);
        assert_eq!(doc.package_count(), 1);
        assert_eq!(doc.get_package("SPDXRef-a").map(|p| p.name.as_str()), Some("a2"));
    }

    #[test]
    fn test_packages_keep_input_order() {
        let mut doc = SbomDocument::default();
        for id in ["c", "a", "b"] {
            doc.add_package(Package::new(id, id));
        }
        let order: Vec<&str> = doc.packages.keys().map(String::as_str).collect();
        assert_eq!(order, vec!["c", "a", "b"]);
    }

    #[test]
    fn test_blank_name_is_absent() {
        let mut doc = SbomDocument::default();
        doc.document.name = Some("  ".to_string());
        assert_eq!(doc.name(), None);
        doc.document.name = Some("my-app".to_string());
        assert_eq!(doc.name(), Some("my-app"));
    }
}
