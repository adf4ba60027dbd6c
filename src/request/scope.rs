//! Scope parsing and project resolution.
//!
//! A scope string addresses the target project as `Org//Product//Project`,
//! `Product//Project` or just `Project`. The organization segment is kept for
//! logs only; the organization itself comes from the credentials.

use crate::client::ProjectLookup;
use crate::error::{ImportError, Result};
use crate::model::{ProjectCoordinates, ProjectRef};

/// Product used when the scope names only a project
pub const DEFAULT_PRODUCT: &str = "Mend-Imports";

/// Separator between scope segments
pub const SCOPE_DELIMITER: &str = "//";

/// A parsed scope string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scope {
    pub organization: Option<String>,
    pub product: String,
    /// Project name or token; empty when the scope string was empty
    pub project: String,
    /// Whether the product came from the scope string itself
    pub explicit_product: bool,
}

impl Scope {
    /// Parse a scope string.
    ///
    /// Segments are trimmed. More than three segments is an error.
    pub fn parse(raw: &str) -> Result<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Ok(Self::project_only(String::new()));
        }

        let segments: Vec<&str> = raw.split(SCOPE_DELIMITER).map(str::trim).collect();
        let scope = match segments.as_slice() {
            [project] => Self::project_only((*project).to_string()),
            [product, project] => Self {
                organization: None,
                product: (*product).to_string(),
                project: (*project).to_string(),
                explicit_product: true,
            },
            [organization, product, project] => Self {
                organization: Some((*organization).to_string()).filter(|o| !o.is_empty()),
                product: (*product).to_string(),
                project: (*project).to_string(),
                explicit_product: true,
            },
            _ => {
                return Err(ImportError::scope(format!(
                    "'{raw}' has {} segments; expected Project, Product//Project or Org//Product//Project",
                    segments.len()
                )))
            }
        };

        tracing::debug!(
            organization = scope.organization.as_deref(),
            product = %scope.product,
            project = %scope.project,
            "Scope layers"
        );
        Ok(scope)
    }

    fn project_only(project: String) -> Self {
        Self {
            organization: None,
            product: DEFAULT_PRODUCT.to_string(),
            project,
            explicit_product: false,
        }
    }

    /// Use `product` unless the scope string named one itself.
    #[must_use]
    pub fn with_default_product(mut self, product: Option<&str>) -> Self {
        if let Some(product) = product.map(str::trim).filter(|p| !p.is_empty()) {
            if !self.explicit_product {
                self.product = product.to_string();
            }
        }
        self
    }
}

/// Scope settled for the update request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedScope {
    /// Product name; empty when an existing project token was found
    pub product: String,
    pub project: ProjectRef,
}

impl ResolvedScope {
    /// Target an existing project by token
    #[must_use]
    pub fn by_token(token: impl Into<String>) -> Self {
        Self {
            product: String::new(),
            project: ProjectRef::Token {
                project_token: token.into(),
            },
        }
    }

    /// Target a project by name within a product
    #[must_use]
    pub fn by_name(product: impl Into<String>, project: impl Into<String>) -> Self {
        Self {
            product: product.into(),
            project: ProjectRef::Coordinates {
                coordinates: ProjectCoordinates {
                    artifact_id: project.into(),
                },
            },
        }
    }
}

/// Settle the target project.
///
/// The project segment is first tried as an existing project (by name or
/// token) through `lookup`; a hit targets that token with an empty product.
/// Otherwise the project is addressed by name, using `fallback_project`
/// (usually the document name) when the scope named none.
pub fn resolve_scope(
    scope: &Scope,
    lookup: Option<&dyn ProjectLookup>,
    fallback_project: Option<&str>,
) -> Result<ResolvedScope> {
    if !scope.project.is_empty() {
        if let Some(lookup) = lookup {
            tracing::debug!("Attempting to resolve project scope");
            if let Some(token) = lookup.project_token(&scope.project) {
                tracing::debug!(project = %scope.project, "Project token found");
                return Ok(ResolvedScope::by_token(token));
            }
        }
    }

    let project = if scope.project.is_empty() {
        fallback_project
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .ok_or_else(|| {
                ImportError::scope("no project given and the SBOM document has no name")
            })?
    } else {
        scope.project.as_str()
    };

    tracing::debug!(product = %scope.product, project, "Project addressed by name");
    Ok(ResolvedScope::by_name(scope.product.clone(), project))
}

#[cfg(test)]
mod tests {
    use super::*;

    struct KnownProjects(Vec<(&'static str, &'static str)>);

    impl ProjectLookup for KnownProjects {
        fn project_token(&self, project: &str) -> Option<String> {
            self.0
                .iter()
                .find(|(name, token)| *name == project || *token == project)
                .map(|(_, token)| (*token).to_string())
        }
    }

    #[test]
    fn test_three_segments() {
        let scope = Scope::parse("OrgA//ProductB//ProjectC").unwrap();
        assert_eq!(scope.organization.as_deref(), Some("OrgA"));
        assert_eq!(scope.product, "ProductB");
        assert_eq!(scope.project, "ProjectC");
    }

    #[test]
    fn test_two_segments() {
        let scope = Scope::parse("ProductB//ProjectC").unwrap();
        assert_eq!(scope.organization, None);
        assert_eq!(scope.product, "ProductB");
        assert_eq!(scope.project, "ProjectC");
    }

    #[test]
    fn test_single_segment_uses_default_product() {
        let scope = Scope::parse("ProjectC").unwrap();
        assert_eq!(scope.product, DEFAULT_PRODUCT);
        assert_eq!(scope.project, "ProjectC");
        assert!(!scope.explicit_product);
    }

    #[test]
    fn test_too_many_segments() {
        assert!(matches!(
            Scope::parse("a//b//c//d"),
            Err(ImportError::Scope(_))
        ));
    }

    #[test]
    fn test_default_product_only_fills_missing_product() {
        let scope = Scope::parse("ProjectC")
            .unwrap()
            .with_default_product(Some("Team Product"));
        assert_eq!(scope.product, "Team Product");

        let scope = Scope::parse("ProductB//ProjectC")
            .unwrap()
            .with_default_product(Some("Team Product"));
        assert_eq!(scope.product, "ProductB");
    }

    #[test]
    fn test_known_project_resolves_to_token() {
        let lookup = KnownProjects(vec![("ProjectC", "tok-123")]);
        let scope = Scope::parse("ProductB//ProjectC").unwrap();
        let resolved = resolve_scope(&scope, Some(&lookup), None).unwrap();

        assert_eq!(resolved, ResolvedScope::by_token("tok-123"));
        assert!(resolved.product.is_empty());
    }

    #[test]
    fn test_unknown_project_uses_coordinates() {
        let lookup = KnownProjects(vec![]);
        let scope = Scope::parse("ProductB//ProjectC").unwrap();
        let resolved = resolve_scope(&scope, Some(&lookup), None).unwrap();
        assert_eq!(resolved, ResolvedScope::by_name("ProductB", "ProjectC"));
    }

    #[test]
    fn test_empty_scope_falls_back_to_document_name() {
        let scope = Scope::parse("").unwrap();
        let resolved = resolve_scope(&scope, None, Some("my-app")).unwrap();
        assert_eq!(resolved, ResolvedScope::by_name(DEFAULT_PRODUCT, "my-app"));
    }

    #[test]
    fn test_empty_scope_without_document_name_fails() {
        let scope = Scope::parse("  ").unwrap();
        assert!(matches!(
            resolve_scope(&scope, None, None),
            Err(ImportError::Scope(_))
        ));
    }
}
