//! Dependency tree construction.
//!
//! Walks packages in input order and expands each through the
//! [`DependencyIndex`]. One visited set covers the whole pass: an identity
//! is emitted at the first point it is reached and never again, which also
//! stops expansion when relationship edges form cycles.
//!
//! Expansion runs on an explicit frame stack, so chain length never
//! touches the call stack. Nesting is capped at [`MAX_TREE_DEPTH`]; a child
//! below the cap stays unvisited and is emitted at top level when the input
//! walk reaches it.

use super::context::ResolutionContext;
use super::naming::CreatorHint;
use crate::model::{DependencyIndex, Package, ResolvedDependency, SbomDocument};
use std::collections::HashSet;

/// Deepest nesting written into the update request
pub const MAX_TREE_DEPTH: usize = 256;

/// A package being expanded, with the position of its next child edge.
struct Frame<'a> {
    package: &'a Package,
    node: ResolvedDependency,
    next_child: usize,
}

/// Builds the nested output from resolved packages.
pub struct TreeBuilder<'a> {
    document: &'a SbomDocument,
    index: &'a DependencyIndex,
    context: &'a ResolutionContext,
    hint: CreatorHint,
    visited: HashSet<String>,
    duplicates: usize,
}

impl<'a> TreeBuilder<'a> {
    pub fn new(
        document: &'a SbomDocument,
        index: &'a DependencyIndex,
        context: &'a ResolutionContext,
    ) -> Self {
        Self {
            document,
            index,
            context,
            hint: CreatorHint::default(),
            visited: HashSet::new(),
            duplicates: 0,
        }
    }

    /// Deduplicate on names and versions as normalized by the creator tool's
    /// naming template.
    #[must_use]
    pub const fn with_creator_hint(mut self, hint: CreatorHint) -> Self {
        self.hint = hint;
        self
    }

    /// Build the top-level dependency list.
    ///
    /// Returns the trees plus the number of resolved packages dropped as
    /// repeats of an identity already emitted.
    pub fn build(mut self) -> (Vec<ResolvedDependency>, usize) {
        let document = self.document;
        let mut roots = Vec::new();

        for package in document.packages.values() {
            if let Some(root) = self.attach(package) {
                roots.push(root);
            }
        }

        (roots, self.duplicates)
    }

    /// Output identity of a package.
    ///
    /// Under a naming template, `npm:x` at `^1.0` and `x` at `1.0` are the
    /// same library. Packages declaring a file name keep their own identity.
    fn identity_of(&self, package: &Package) -> String {
        if self.hint.template.is_none() || package.file_name.is_some() {
            return package.identity();
        }
        let normalized = self.hint.normalize(&package.name, package.version.as_deref());
        match normalized.version {
            Some(version) => format!("{}-{version}", normalized.name),
            None => normalized.name,
        }
    }

    /// Mark a package visited and open a frame for it, unless it is
    /// unresolved or already emitted.
    fn enter(&mut self, package: &'a Package) -> Option<Frame<'a>> {
        let resolved = self.context.resolved(&package.id)?;
        let identity = self.identity_of(package);
        if !self.visited.insert(identity) {
            self.duplicates += 1;
            tracing::debug!(identity = %package.identity(), "Already added, skipping");
            return None;
        }
        Some(Frame {
            package,
            node: resolved.to_dependency(),
            next_child: 0,
        })
    }

    /// Whether a child would be emitted if entered now.
    fn is_pending(&self, package: &Package) -> bool {
        self.context.resolved(&package.id).is_some()
            && !self.visited.contains(&self.identity_of(package))
    }

    /// Expand a package and everything reachable below it.
    fn attach(&mut self, package: &'a Package) -> Option<ResolvedDependency> {
        let (document, index) = (self.document, self.index);
        let mut path = vec![self.enter(package)?];

        loop {
            let depth = path.len();
            let frame = path.last_mut()?;
            let parent = frame.package;

            let Some(child_id) = index.children_of(&parent.id).get(frame.next_child) else {
                let finished = path.pop()?;
                tracing::debug!(
                    identity = %finished.package.identity(),
                    children = finished.node.child_dependencies.len(),
                    "Dependency added"
                );
                match path.last_mut() {
                    Some(up) => up.node.child_dependencies.push(finished.node),
                    None => return Some(finished.node),
                }
                continue;
            };
            frame.next_child += 1;

            let Some(child) = document.get_package(child_id) else {
                tracing::debug!(
                    parent = %parent.id,
                    child = %child_id,
                    "Dependency target not among known packages"
                );
                continue;
            };
            if depth >= MAX_TREE_DEPTH {
                if self.is_pending(child) {
                    tracing::debug!(
                        parent = %parent.id,
                        child = %child.id,
                        depth,
                        "Nesting limit reached, child left for top level"
                    );
                }
                continue;
            }
            if let Some(frame) = self.enter(child) {
                path.push(frame);
            }
        }
    }
}
