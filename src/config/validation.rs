//! Configuration validation for sbom-import.
//!
//! Provides validation traits and implementations for all configuration types.

use super::defaults::MAX_WORKERS;
use super::types::{ImportConfig, OutputConfig, ResolverConfig, ScopeConfig, ServerConfig};
use crate::request::Scope;

// ============================================================================
// Configuration Error
// ============================================================================

/// Error type for configuration validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError {
    /// The field that failed validation
    pub field: String,
    /// Description of the validation error
    pub message: String,
}

impl ConfigError {
    fn new(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl std::error::Error for ConfigError {}

// ============================================================================
// Validation Trait
// ============================================================================

/// Trait for validatable configuration types.
pub trait Validatable {
    /// Validate the configuration, returning any errors found.
    fn validate(&self) -> Vec<ConfigError>;

    /// Check if the configuration is valid.
    fn is_valid(&self) -> bool {
        self.validate().is_empty()
    }
}

// ============================================================================
// Validation Implementations
// ============================================================================

impl Validatable for ImportConfig {
    fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        errors.extend(self.server.validate());
        errors.extend(self.scope.validate());
        errors.extend(self.resolver.validate());
        errors.extend(self.output.validate());

        // Offline runs never contact the server
        if !self.output.offline {
            if is_blank(self.server.user_key.as_deref()) {
                errors.push(ConfigError::new(
                    "server.user_key",
                    "A user key is required unless running offline",
                ));
            }
            if is_blank(self.server.org_token.as_deref()) {
                errors.push(ConfigError::new(
                    "server.org_token",
                    "An organization API key is required unless running offline",
                ));
            }
        }

        errors
    }
}

fn is_blank(value: Option<&str>) -> bool {
    value.map_or(true, |v| v.trim().is_empty())
}

impl Validatable for ServerConfig {
    fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        let url = self.url.trim();

        if url.is_empty() {
            errors.push(ConfigError::new("server.url", "Server URL is required"));
        } else if url.contains("://") && !(url.starts_with("https://") || url.starts_with("http://"))
        {
            errors.push(ConfigError::new(
                "server.url",
                format!("Unsupported scheme in '{url}'. Use http(s)://host"),
            ));
        } else if url.contains(char::is_whitespace) {
            errors.push(ConfigError::new(
                "server.url",
                format!("Server URL '{url}' contains whitespace"),
            ));
        }

        if self.timeout_secs == 0 {
            errors.push(ConfigError::new(
                "server.timeout_secs",
                "Timeout must be at least 1 second",
            ));
        }

        errors
    }
}

impl Validatable for ScopeConfig {
    fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        if let Some(ref scope) = self.scope {
            if let Err(e) = Scope::parse(scope) {
                errors.push(ConfigError::new("scope.scope", e.to_string()));
            }
        }
        errors
    }
}

impl Validatable for ResolverConfig {
    fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        if self.workers == 0 {
            errors.push(ConfigError::new(
                "resolver.workers",
                "At least one worker is required",
            ));
        } else if self.workers > MAX_WORKERS {
            errors.push(ConfigError::new(
                "resolver.workers",
                format!("At most {MAX_WORKERS} workers are supported, got {}", self.workers),
            ));
        }
        errors
    }
}

impl Validatable for OutputConfig {
    fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();

        if self.dir.is_file() {
            errors.push(ConfigError::new(
                "output.dir",
                format!("Output path is a file: {}", self.dir.display()),
            ));
        }

        let file_name = self.file_name.trim();
        if file_name.is_empty() || file_name.contains(['/', '\\']) {
            errors.push(ConfigError::new(
                "output.file_name",
                format!("Invalid output file name '{}'", self.file_name),
            ));
        }

        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn online_config() -> ImportConfig {
        ImportConfig::builder().credentials("user", "org").build()
    }

    #[test]
    fn test_default_online_config_needs_credentials() {
        let errors = ImportConfig::default().validate();
        let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["server.user_key", "server.org_token"]);
    }

    #[test]
    fn test_offline_config_needs_no_credentials() {
        let config = ImportConfig::builder().offline(true).build();
        assert!(config.is_valid());
    }

    #[test]
    fn test_complete_config_is_valid() {
        assert!(online_config().is_valid());
    }

    #[test]
    fn test_server_url_validation() {
        let mut server = ServerConfig::default();
        server.url = "saas.mend.io".to_string();
        assert!(server.is_valid());

        server.url = "ftp://saas.mend.io".to_string();
        assert!(!server.is_valid());

        server.url = "  ".to_string();
        assert!(!server.is_valid());
    }

    #[test]
    fn test_worker_bounds() {
        let mut resolver = ResolverConfig::default();
        assert!(resolver.is_valid());
        resolver.workers = 0;
        assert!(!resolver.is_valid());
        resolver.workers = MAX_WORKERS + 1;
        assert!(!resolver.is_valid());
    }

    #[test]
    fn test_scope_segments_validated() {
        let scope = ScopeConfig {
            scope: Some("a//b//c//d".to_string()),
            ..ScopeConfig::default()
        };
        assert_eq!(scope.validate()[0].field, "scope.scope");
    }

    #[test]
    fn test_output_dir_must_not_be_a_file() {
        let tmp = TempDir::new().unwrap();
        let file = tmp.path().join("taken");
        std::fs::write(&file, "x").unwrap();

        let output = OutputConfig {
            dir: file,
            ..OutputConfig::default()
        };
        assert!(!output.is_valid());

        let output = OutputConfig {
            dir: tmp.path().join("missing-is-fine"),
            ..OutputConfig::default()
        };
        assert!(output.is_valid());
    }
}
