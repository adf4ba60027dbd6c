//! Creator-tool naming templates and hints.
//!
//! Some SBOM generators encode the ecosystem inside the package name
//! (`npm:left-pad`) or write version ranges instead of versions (`^1.3.0`).
//! A [`NameTemplate`] undoes that for the tools it recognises. Matching is
//! best-effort: names from unrecognised tools pass through untouched.

use crate::model::catalog::{self, EcosystemType};
use crate::model::DocumentMetadata;

/// Known generator naming patterns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NameTemplate {
    /// GitHub dependency-graph export: `ecosystem:name`, `^version`
    Github,
}

impl NameTemplate {
    pub const ALL: [Self; 1] = [Self::Github];

    /// Template for a creator tool name, if one applies.
    #[must_use]
    pub fn for_tool(tool: &str) -> Option<Self> {
        let tool = tool.to_lowercase();
        Self::ALL.into_iter().find(|t| tool.contains(t.tool_marker()))
    }

    const fn tool_marker(self) -> &'static str {
        match self {
            Self::Github => "github",
        }
    }

    /// Separator between the ecosystem prefix and the library name
    #[must_use]
    pub const fn name_delimiter(self) -> char {
        match self {
            Self::Github => ':',
        }
    }

    /// Characters stripped from versions
    #[must_use]
    pub const fn version_noise(self) -> &'static [char] {
        match self {
            Self::Github => &['^'],
        }
    }

    /// Split and clean a package name and version.
    #[must_use]
    pub fn apply(self, name: &str, version: Option<&str>) -> NormalizedName {
        let (prefix, bare) = match name.split_once(self.name_delimiter()) {
            Some((prefix, bare)) if !bare.is_empty() => (Some(prefix), bare),
            _ => (None, name),
        };
        let version = version
            .map(|v| v.replace(self.version_noise(), "").trim().to_string())
            .filter(|v| !v.is_empty());

        NormalizedName {
            name: bare.to_string(),
            version,
            ecosystem: prefix.and_then(catalog::by_key),
        }
    }
}

/// A package name after template normalization
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedName {
    pub name: String,
    pub version: Option<String>,
    /// Ecosystem encoded in the name, when recognised
    pub ecosystem: Option<&'static EcosystemType>,
}

impl NormalizedName {
    /// Name and version as declared
    #[must_use]
    pub fn verbatim(name: &str, version: Option<&str>) -> Self {
        Self {
            name: name.to_string(),
            version: version.map(str::to_string),
            ecosystem: None,
        }
    }
}

/// What the document's creator tools say about its packages
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CreatorHint {
    /// Naming template of the generating tool
    pub template: Option<NameTemplate>,
    /// Ecosystem the generating tool is named after
    pub ecosystem: Option<&'static EcosystemType>,
}

impl CreatorHint {
    /// Derive the hint from the document's tool creators.
    ///
    /// The first tool that names a template or an ecosystem wins for each
    /// field.
    #[must_use]
    pub fn from_document(meta: &DocumentMetadata) -> Self {
        let mut hint = Self::default();
        for tool in meta.tool_names() {
            if hint.template.is_none() {
                hint.template = NameTemplate::for_tool(tool);
            }
            if hint.ecosystem.is_none() {
                hint.ecosystem = ecosystem_in_tool_name(tool);
            }
        }
        if hint != Self::default() {
            tracing::debug!(
                template = ?hint.template,
                ecosystem = hint.ecosystem.map(|e| e.key),
                "Creator tool hint"
            );
        }
        hint
    }

    /// Normalize one package's name and version.
    #[must_use]
    pub fn normalize(&self, name: &str, version: Option<&str>) -> NormalizedName {
        match self.template {
            Some(template) => template.apply(name, version),
            None => NormalizedName::verbatim(name, version),
        }
    }
}

/// The first tool-name token equal to a lookup code or catalog key.
fn ecosystem_in_tool_name(tool: &str) -> Option<&'static EcosystemType> {
    tool.split(|c: char| !(c.is_ascii_alphanumeric() || c == '.'))
        .map(|token| token.trim_matches('.'))
        .filter(|token| !token.is_empty())
        .find_map(|token| {
            catalog::all().iter().find(|e| {
                e.lookup_code.trim_start_matches('.').eq_ignore_ascii_case(token)
                    || e.key.eq_ignore_ascii_case(token)
            })
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Creator;

    fn meta_with_tools(tools: &[&str]) -> DocumentMetadata {
        DocumentMetadata {
            creators: tools.iter().map(|t| Creator::parse(t)).collect(),
            ..DocumentMetadata::default()
        }
    }

    #[test]
    fn test_github_template_splits_prefix() {
        let normalized = NameTemplate::Github.apply("npm:left-pad", Some("^1.3.0"));
        assert_eq!(normalized.name, "left-pad");
        assert_eq!(normalized.version.as_deref(), Some("1.3.0"));
        assert_eq!(normalized.ecosystem.map(|e| e.key), Some("npm"));
    }

    #[test]
    fn test_github_template_without_prefix() {
        let normalized = NameTemplate::Github.apply("left-pad", Some("1.3.0"));
        assert_eq!(normalized.name, "left-pad");
        assert_eq!(normalized.ecosystem, None);
    }

    #[test]
    fn test_template_for_tool() {
        assert_eq!(
            NameTemplate::for_tool("GitHub.com-Dependency-Graph"),
            Some(NameTemplate::Github)
        );
        assert_eq!(NameTemplate::for_tool("syft-0.98.0"), None);
    }

    #[test]
    fn test_creator_hint_from_tools() {
        let hint = CreatorHint::from_document(&meta_with_tools(&[
            "Organization: Acme",
            "Tool: pypi-sbom-1.2",
        ]));
        assert_eq!(hint.template, None);
        assert_eq!(hint.ecosystem.map(|e| e.lookup_code), Some("pypi"));
    }

    #[test]
    fn test_creator_hint_ignores_unrelated_tools() {
        let hint = CreatorHint::from_document(&meta_with_tools(&["Tool: syft-0.98.0"]));
        assert_eq!(hint, CreatorHint::default());
        assert_eq!(
            hint.normalize("npm:x", Some("^1")),
            NormalizedName::verbatim("npm:x", Some("^1"))
        );
    }
}
