//! Package records and relationship edges loaded from an SBOM.

use serde::{Deserialize, Serialize};

/// Placeholder SPDX writers use for "no information"; a package with this
/// name is skipped silently.
pub const NO_ASSERTION: &str = "NOASSERTION";

/// A declared package, normalized from either input format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Package {
    /// Stable identifier within the document (SPDX `SPDXID`)
    pub id: String,
    /// Display name
    pub name: String,
    /// Declared package file name
    pub file_name: Option<String>,
    /// Version string
    pub version: Option<String>,
    /// Declared checksums
    pub checksums: Vec<Checksum>,
    /// External references (package-manager locators, CPEs, ...)
    pub external_refs: Vec<ExternalRef>,
    /// Download location
    pub download_location: Option<String>,
    /// Files declared through `hasFiles`
    pub files: Vec<PackageFile>,
}

impl Package {
    /// Create a package with only an id and a name.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            file_name: None,
            version: None,
            checksums: Vec::new(),
            external_refs: Vec::new(),
            download_location: None,
            files: Vec::new(),
        }
    }

    /// Builder-style version setter
    #[must_use]
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    /// Builder-style file name setter
    #[must_use]
    pub fn with_file_name(mut self, file_name: impl Into<String>) -> Self {
        self.file_name = Some(file_name.into());
        self
    }

    /// Builder-style checksum append
    #[must_use]
    pub fn with_checksum(mut self, algorithm: &str, value: impl Into<String>) -> Self {
        self.checksums.push(Checksum::new(algorithm, value));
        self
    }

    /// Builder-style external reference append
    #[must_use]
    pub fn with_external_ref(mut self, category: &str, locator: impl Into<String>) -> Self {
        self.external_refs.push(ExternalRef {
            category: RefCategory::parse(category),
            ref_type: None,
            locator: locator.into(),
        });
        self
    }

    /// Builder-style download location setter
    #[must_use]
    pub fn with_download_location(mut self, location: impl Into<String>) -> Self {
        self.download_location = Some(location.into());
        self
    }

    /// Name used as artifact id for packages carrying their own checksum:
    /// the file name when declared, otherwise the package name.
    #[must_use]
    pub fn artifact_name(&self) -> &str {
        self.file_name.as_deref().unwrap_or(&self.name)
    }

    /// Identity used to deduplicate output: `name-version`, or the bare name
    /// when no version is declared.
    #[must_use]
    pub fn identity(&self) -> String {
        match self.version.as_deref() {
            Some(version) => format!("{}-{}", self.artifact_name(), version),
            None => self.artifact_name().to_string(),
        }
    }

    /// Whether this package is the `NOASSERTION` sentinel.
    #[must_use]
    pub fn is_no_assertion(&self) -> bool {
        self.name == NO_ASSERTION || self.artifact_name() == NO_ASSERTION
    }

    /// The first non-empty SHA-1 checksum declared for this package.
    #[must_use]
    pub fn sha1(&self) -> Option<&str> {
        self.checksums
            .iter()
            .find(|c| c.is_sha1() && !c.value.trim().is_empty())
            .map(|c| c.value.trim())
    }

    /// External references in the package-manager category, in declaration
    /// order.
    pub fn package_manager_refs(&self) -> impl Iterator<Item = &ExternalRef> {
        self.external_refs
            .iter()
            .filter(|r| r.category == RefCategory::PackageManager)
    }

    /// File extension taken from the file name, falling back to the
    /// download location when the file name has none.
    #[must_use]
    pub fn file_extension(&self) -> Option<String> {
        self.file_name
            .as_deref()
            .and_then(extension_of)
            .or_else(|| self.download_location.as_deref().and_then(extension_of))
    }
}

/// Lowercased extension of the last path segment of a file name or URL.
fn extension_of(raw: &str) -> Option<String> {
    let without_query = raw.split(['?', '#']).next().unwrap_or(raw);
    let segment = without_query.rsplit('/').next().unwrap_or(without_query);
    let (stem, ext) = segment.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() {
        return None;
    }
    Some(ext.to_lowercase())
}

/// Checksum entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Checksum {
    /// Algorithm as written in the document (e.g. `SHA1`)
    pub algorithm: String,
    /// Hex digest
    pub value: String,
}

impl Checksum {
    pub fn new(algorithm: &str, value: impl Into<String>) -> Self {
        Self {
            algorithm: algorithm.to_string(),
            value: value.into(),
        }
    }

    /// Case-insensitive SHA-1 check, accepting both `SHA1` and `SHA-1`.
    #[must_use]
    pub fn is_sha1(&self) -> bool {
        let algo = self.algorithm.trim();
        algo.eq_ignore_ascii_case("sha1") || algo.eq_ignore_ascii_case("sha-1")
    }
}

/// External reference category
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RefCategory {
    PackageManager,
    Security,
    PersistentId,
    Other(String),
}

impl RefCategory {
    /// Parse an SPDX reference category; both `PACKAGE-MANAGER` and
    /// `PACKAGE_MANAGER` spellings occur in the wild.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_uppercase().replace('_', "-").as_str() {
            "PACKAGE-MANAGER" => Self::PackageManager,
            "SECURITY" => Self::Security,
            "PERSISTENT-ID" => Self::PersistentId,
            _ => Self::Other(raw.to_string()),
        }
    }
}

/// External reference
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalRef {
    /// Reference category
    pub category: RefCategory,
    /// Reference type (`purl`, `cpe23Type`, ...)
    pub ref_type: Option<String>,
    /// Locator, e.g. `pkg:npm/left-pad@1.3.0`
    pub locator: String,
}

/// A file declared inside a package
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageFile {
    /// SPDX id of the file
    pub id: String,
    /// File name
    pub file_name: String,
    /// SHA-1, when declared
    pub sha1: Option<String>,
}

/// Relationship kind between two SPDX elements
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RelationshipKind {
    DependsOn,
    DependencyOf,
    DynamicLink,
    StaticLink,
    Contains,
    Describes,
    Other(String),
}

impl RelationshipKind {
    /// Parse an SPDX `relationshipType`
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        match raw {
            "DEPENDS_ON" => Self::DependsOn,
            "DEPENDENCY_OF" => Self::DependencyOf,
            "DYNAMIC_LINK" => Self::DynamicLink,
            "STATIC_LINK" => Self::StaticLink,
            "CONTAINS" => Self::Contains,
            "DESCRIBES" => Self::Describes,
            other => Self::Other(other.to_string()),
        }
    }
}

/// Directed relationship edge between two package ids
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RelationshipEdge {
    /// Source package id
    pub from: String,
    /// Target package id
    pub to: String,
    /// Relationship kind
    pub kind: RelationshipKind,
}

impl RelationshipEdge {
    pub fn new(from: impl Into<String>, to: impl Into<String>, kind: RelationshipKind) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            kind,
        }
    }

    /// Shorthand for a `DEPENDS_ON` edge
    pub fn depends_on(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self::new(from, to, RelationshipKind::DependsOn)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sha1_is_case_insensitive() {
        let pkg = Package::new("SPDXRef-a", "a")
            .with_checksum("SHA256", "ffff")
            .with_checksum("sha1", "abcd");
        assert_eq!(pkg.sha1(), Some("abcd"));

        let dashed = Package::new("SPDXRef-b", "b").with_checksum("Sha-1", "0102");
        assert_eq!(dashed.sha1(), Some("0102"));
    }

    #[test]
    fn test_sha1_ignores_empty_and_other_algorithms() {
        let pkg = Package::new("SPDXRef-a", "a")
            .with_checksum("SHA1", "  ")
            .with_checksum("MD5", "beef");
        assert_eq!(pkg.sha1(), None);
    }

    #[test]
    fn test_identity_and_artifact_name() {
        let pkg = Package::new("SPDXRef-a", "left-pad").with_version("1.3.0");
        assert_eq!(pkg.identity(), "left-pad-1.3.0");
        assert_eq!(pkg.artifact_name(), "left-pad");

        let file = Package::new("SPDXRef-b", "guava").with_file_name("guava-31.jar");
        assert_eq!(file.identity(), "guava-31.jar");
    }

    #[test]
    fn test_no_assertion_sentinel() {
        assert!(Package::new("SPDXRef-x", NO_ASSERTION).is_no_assertion());
        assert!(!Package::new("SPDXRef-y", "noassertion-lib").is_no_assertion());
    }

    #[test]
    fn test_file_extension_prefers_file_name() {
        let pkg = Package::new("SPDXRef-a", "a")
            .with_file_name("commons-io-2.11.0.JAR")
            .with_download_location("https://example.org/a.whl");
        assert_eq!(pkg.file_extension().as_deref(), Some("jar"));
    }

    #[test]
    fn test_file_extension_falls_back_to_download_location() {
        let pkg = Package::new("SPDXRef-a", "requests")
            .with_file_name("requests")
            .with_download_location("https://files.example/requests-2.31.0-py3-none-any.whl?x=1");
        assert_eq!(pkg.file_extension().as_deref(), Some("whl"));

        let none = Package::new("SPDXRef-b", "b").with_download_location("https://example.org/");
        assert_eq!(none.file_extension(), None);
    }

    #[test]
    fn test_hidden_file_has_no_extension() {
        assert_eq!(extension_of(".npmrc"), None);
        assert_eq!(extension_of("pkg."), None);
    }

    #[test]
    fn test_ref_category_spellings() {
        assert_eq!(RefCategory::parse("PACKAGE-MANAGER"), RefCategory::PackageManager);
        assert_eq!(RefCategory::parse("PACKAGE_MANAGER"), RefCategory::PackageManager);
        assert_eq!(RefCategory::parse("package-manager"), RefCategory::PackageManager);
        assert_eq!(RefCategory::parse("SECURITY"), RefCategory::Security);
    }

    #[test]
    fn test_package_manager_ref_lookup() {
        let pkg = Package::new("SPDXRef-a", "a")
            .with_external_ref("SECURITY", "cpe:2.3:a:a:a:1.0")
            .with_external_ref("PACKAGE_MANAGER", "pkg:npm/a@1.0");
        let locators: Vec<&str> = pkg.package_manager_refs().map(|r| r.locator.as_str()).collect();
        assert_eq!(locators, vec!["pkg:npm/a@1.0"]);
    }

    #[test]
    fn test_relationship_kind_parse() {
        assert_eq!(RelationshipKind::parse("DEPENDS_ON"), RelationshipKind::DependsOn);
        assert_eq!(
            RelationshipKind::parse("GENERATES"),
            RelationshipKind::Other("GENERATES".to_string())
        );
    }
}
