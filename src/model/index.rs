//! Precomputed adjacency for dependency-tree expansion.
//!
//! Building the index once turns each child lookup into an O(children)
//! slice access instead of a scan over every relationship edge.
//!
//! ```ignore
//! let index = DependencyIndex::build(&doc.edges);
//! for child in index.children_of("SPDXRef-Package-app") {
//!     println!("{child}");
//! }
//! ```

use super::{RelationshipEdge, RelationshipKind};
use std::collections::HashMap;

/// Source package id → ordered target package ids, `DEPENDS_ON` edges only.
#[derive(Debug, Clone, Default)]
#[must_use]
pub struct DependencyIndex {
    children: HashMap<String, Vec<String>>,
    edge_count: usize,
}

impl DependencyIndex {
    /// Build the index from relationship edges, keeping edge order per source.
    pub fn build(edges: &[RelationshipEdge]) -> Self {
        let mut children: HashMap<String, Vec<String>> = HashMap::new();
        let mut edge_count = 0;

        for edge in edges.iter().filter(|e| e.kind == RelationshipKind::DependsOn) {
            children
                .entry(edge.from.clone())
                .or_default()
                .push(edge.to.clone());
            edge_count += 1;
        }

        Self {
            children,
            edge_count,
        }
    }

    /// Direct children of a package id, in declaration order.
    #[must_use]
    pub fn children_of(&self, id: &str) -> &[String] {
        self.children.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Number of indexed edges
    #[must_use]
    pub const fn edge_count(&self) -> usize {
        self.edge_count
    }
}
