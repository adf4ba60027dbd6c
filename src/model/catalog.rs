//! Static registry of the library ecosystems the lookup service understands.
//!
//! Each entry carries the lookup code sent to the service, the file
//! extension conventionally used by the ecosystem's artifacts, whether
//! library names are case-insensitive there, and a priority used to order
//! candidates when several ecosystems could apply.

use serde::Serialize;
use std::fmt;

/// One supported ecosystem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct EcosystemType {
    /// Catalog key; matches the package-URL type for most ecosystems
    pub key: &'static str,
    /// Library names compare case-insensitively in this ecosystem
    pub case_fold: bool,
    /// Ecosystem (language) name
    pub ecosystem_name: &'static str,
    /// Conventional artifact file extension
    pub file_extension: &'static str,
    /// Library type code understood by the lookup service
    pub lookup_code: &'static str,
    /// Ordering priority, lower first
    pub priority: u8,
}

impl EcosystemType {
    const fn new(
        key: &'static str,
        case_fold: bool,
        ecosystem_name: &'static str,
        file_extension: &'static str,
        lookup_code: &'static str,
        priority: u8,
    ) -> Self {
        Self {
            key,
            case_fold,
            ecosystem_name,
            file_extension,
            lookup_code,
            priority,
        }
    }

    /// Normalize a library name for comparisons within this ecosystem.
    #[must_use]
    pub fn fold_name(&self, name: &str) -> String {
        if self.case_fold {
            name.to_lowercase()
        } else {
            name.to_string()
        }
    }
}

impl fmt::Display for EcosystemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.key, self.lookup_code)
    }
}

/// Every supported ecosystem, in priority order.
pub static CATALOG: [EcosystemType; 18] = [
    EcosystemType::new("maven", true, "JAVA", "jar", "maven", 1),
    EcosystemType::new("pypi", false, "PYTHON", "whl", "pypi", 2),
    EcosystemType::new("npm", true, "NPM", "js", "npm", 3),
    EcosystemType::new("cdnjs", true, "CDNJS", "js", "cdnjs", 4),
    EcosystemType::new("dotnet", true, "NUGET", "exe", ".net", 5),
    EcosystemType::new("bower", true, "BOWER", "jar", "bower", 6),
    EcosystemType::new("ocaml", false, "Opam", "ml", "ocaml", 7),
    EcosystemType::new("go", false, "GO", "go", "go", 8),
    EcosystemType::new("nuget", true, "NUGET", "ng", "nuget", 9),
    EcosystemType::new("rpm", false, "RPM", "rpm", "rpm", 10),
    EcosystemType::new("composer", false, "PHP", "php", "php", 11),
    EcosystemType::new("cocoapods", false, "CocoaPods", "pod", "cocoapods", 12),
    EcosystemType::new("cran", false, "R", "r", "cran", 13),
    EcosystemType::new("gem", true, "RUBY", "gem", "ruby", 14),
    EcosystemType::new("rust", true, "RUST", "rs", "rust", 15),
    EcosystemType::new("rlib", true, "RUST", "rlib", "rust", 16),
    EcosystemType::new("hex", true, "HEX", "hex", "hex", 17),
    EcosystemType::new("alpine", false, "Alpine", "apk", "alpine", 18),
];

/// All catalog entries in priority order.
#[must_use]
pub fn all() -> &'static [EcosystemType] {
    &CATALOG
}

/// Look up an entry by catalog key or package-URL type.
///
/// Package-URL types that differ from the catalog key (`golang`, `cargo`,
/// `apk`) are mapped onto their entry.
#[must_use]
pub fn by_key(key: &str) -> Option<&'static EcosystemType> {
    let key = key.trim().to_lowercase();
    let key = match key.as_str() {
        "golang" => "go",
        "cargo" => "rust",
        "apk" => "alpine",
        other => other,
    };
    CATALOG.iter().find(|e| e.key == key)
}

/// Entries whose conventional file extension matches, in priority order.
#[must_use]
pub fn by_extension(ext: &str) -> Vec<&'static EcosystemType> {
    let ext = ext.trim_start_matches('.');
    CATALOG
        .iter()
        .filter(|e| e.file_extension.eq_ignore_ascii_case(ext))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_is_sorted_by_priority() {
        let priorities: Vec<u8> = all().iter().map(|e| e.priority).collect();
        let mut sorted = priorities.clone();
        sorted.sort_unstable();
        assert_eq!(priorities, sorted);
        assert_eq!(all().len(), 18);
    }

    #[test]
    fn test_by_key_with_purl_aliases() {
        assert_eq!(by_key("npm").map(|e| e.lookup_code), Some("npm"));
        assert_eq!(by_key("golang").map(|e| e.key), Some("go"));
        assert_eq!(by_key("cargo").map(|e| e.lookup_code), Some("rust"));
        assert_eq!(by_key("APK").map(|e| e.key), Some("alpine"));
        assert!(by_key("swift").is_none());
    }

    #[test]
    fn test_by_extension_returns_all_sharing_entries() {
        let js: Vec<&str> = by_extension("js").iter().map(|e| e.key).collect();
        assert_eq!(js, vec!["npm", "cdnjs"]);

        let jar: Vec<&str> = by_extension(".JAR").iter().map(|e| e.key).collect();
        assert_eq!(jar, vec!["maven", "bower"]);

        assert!(by_extension("tgz").is_empty());
    }

    #[test]
    fn test_fold_name() {
        let npm = by_key("npm").unwrap();
        assert_eq!(npm.fold_name("Left-Pad"), "left-pad");
        let pypi = by_key("pypi").unwrap();
        assert_eq!(pypi.fold_name("Django"), "Django");
    }
}
