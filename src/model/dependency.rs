//! Output unit of a resolution pass.

use serde::{Deserialize, Serialize};

/// Checksum map as the inventory service expects it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyChecksums {
    #[serde(rename = "SHA1")]
    pub sha1: String,
}

/// A resolved package with its nested dependencies.
///
/// Field names follow the inventory service's dependency format: the
/// checksum travels as `sha1`, the file name as `filename` and the child
/// list as `children`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedDependency {
    pub artifact_id: String,
    pub version: String,
    #[serde(rename = "sha1")]
    pub checksum: String,
    pub system_path: String,
    pub optional: bool,
    #[serde(rename = "filename")]
    pub file_name: String,
    pub checksums: DependencyChecksums,
    pub dependency_file: String,
    #[serde(rename = "children", default, skip_serializing_if = "Vec::is_empty")]
    pub child_dependencies: Vec<ResolvedDependency>,
}

impl ResolvedDependency {
    /// Create a dependency with no children.
    pub fn new(
        artifact_id: impl Into<String>,
        version: impl Into<String>,
        checksum: impl Into<String>,
        file_name: impl Into<String>,
    ) -> Self {
        let checksum = checksum.into();
        Self {
            artifact_id: artifact_id.into(),
            version: version.into(),
            checksums: DependencyChecksums {
                sha1: checksum.clone(),
            },
            checksum,
            system_path: String::new(),
            optional: false,
            file_name: file_name.into(),
            dependency_file: String::new(),
            child_dependencies: Vec::new(),
        }
    }

    /// Number of dependencies in this subtree, including this one.
    #[must_use]
    pub fn subtree_size(&self) -> usize {
        1 + self
            .child_dependencies
            .iter()
            .map(Self::subtree_size)
            .sum::<usize>()
    }

    /// Depth-first search for a dependency by artifact id.
    #[must_use]
    pub fn find(&self, artifact_id: &str) -> Option<&Self> {
        if self.artifact_id == artifact_id {
            return Some(self);
        }
        self.child_dependencies
            .iter()
            .find_map(|child| child.find(artifact_id))
    }
}
