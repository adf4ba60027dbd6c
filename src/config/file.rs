//! Configuration file loading and discovery.
//!
//! Supports loading configuration from YAML files with automatic discovery.

use super::types::ImportConfig;
use crate::model::UpdateType;
use std::path::{Path, PathBuf};

// ============================================================================
// Configuration File Discovery
// ============================================================================

/// Standard config file names to search for.
const CONFIG_FILE_NAMES: &[&str] = &[".sbom-import.yaml", ".sbom-import.yml", "sbom-import.yaml"];

/// Discover a config file by searching standard locations.
///
/// Search order:
/// 1. Explicit path if provided
/// 2. Current directory
/// 3. Git repository root (if in a repo)
/// 4. User config directory (~/.config/sbom-import/)
/// 5. Home directory
#[must_use]
pub fn discover_config_file(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        if path.exists() {
            return Some(path.to_path_buf());
        }
    }

    if let Some(path) = std::env::current_dir()
        .ok()
        .and_then(|cwd| find_config_in_dir(&cwd))
    {
        return Some(path);
    }

    if let Some(path) = find_git_root().and_then(|root| find_config_in_dir(&root)) {
        return Some(path);
    }

    if let Some(path) =
        dirs::config_dir().and_then(|dir| find_config_in_dir(&dir.join("sbom-import")))
    {
        return Some(path);
    }

    dirs::home_dir().and_then(|home| find_config_in_dir(&home))
}

/// Find a config file in a specific directory.
fn find_config_in_dir(dir: &Path) -> Option<PathBuf> {
    CONFIG_FILE_NAMES
        .iter()
        .map(|name| dir.join(name))
        .find(|path| path.exists())
}

/// Find the git repository root by walking up the directory tree.
fn find_git_root() -> Option<PathBuf> {
    let cwd = std::env::current_dir().ok()?;
    cwd.ancestors()
        .find(|dir| dir.join(".git").exists())
        .map(Path::to_path_buf)
}

// ============================================================================
// Configuration File Loading
// ============================================================================

/// Error type for config file operations.
#[derive(Debug, thiserror::Error)]
pub enum ConfigFileError {
    #[error("Config file not found: {}", .0.display())]
    NotFound(PathBuf),
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config file: {0}")]
    Parse(#[from] serde_yaml::Error),
}

/// Load an `ImportConfig` from a YAML file.
pub fn load_config_file(path: &Path) -> Result<ImportConfig, ConfigFileError> {
    if !path.exists() {
        return Err(ConfigFileError::NotFound(path.to_path_buf()));
    }

    let content = std::fs::read_to_string(path)?;
    let config: ImportConfig = serde_yaml::from_str(&content)?;
    Ok(config)
}

/// Load config from the discovered file, or return the default.
///
/// An explicit path that cannot be loaded is an error; a discovered file
/// that cannot be loaded is skipped with a warning.
pub fn load_or_default(
    explicit_path: Option<&Path>,
) -> Result<(ImportConfig, Option<PathBuf>), ConfigFileError> {
    if let Some(path) = explicit_path {
        return load_config_file(path).map(|config| (config, Some(path.to_path_buf())));
    }

    Ok(discover_config_file(None).map_or_else(
        || (ImportConfig::default(), None),
        |path| match load_config_file(&path) {
            Ok(config) => (config, Some(path)),
            Err(e) => {
                tracing::warn!("Failed to load config from {}: {}", path.display(), e);
                (ImportConfig::default(), None)
            }
        },
    ))
}

// ============================================================================
// Configuration Merging
// ============================================================================

impl ImportConfig {
    /// Merge another config into this one, with `other` taking precedence.
    ///
    /// Fields of `other` left at their defaults do not override. Used to
    /// layer CLI and environment values over file config.
    pub fn merge(&mut self, other: &Self) {
        let defaults = Self::default();

        // Server
        if other.server.url != defaults.server.url {
            self.server.url.clone_from(&other.server.url);
        }
        if other.server.user_key.is_some() {
            self.server.user_key.clone_from(&other.server.user_key);
        }
        if other.server.org_token.is_some() {
            self.server.org_token.clone_from(&other.server.org_token);
        }
        if other.server.timeout_secs != defaults.server.timeout_secs {
            self.server.timeout_secs = other.server.timeout_secs;
        }

        // Scope
        if other.scope.scope.is_some() {
            self.scope.scope.clone_from(&other.scope.scope);
        }
        if other.scope.product_token.is_some() {
            self.scope.product_token.clone_from(&other.scope.product_token);
        }
        if other.scope.update_type != UpdateType::default() {
            self.scope.update_type = other.scope.update_type;
        }

        // Resolver
        if other.resolver.multilingual {
            self.resolver.multilingual = true;
        }
        if other.resolver.workers != defaults.resolver.workers {
            self.resolver.workers = other.resolver.workers;
        }
        if !other.resolver.cache_lookups {
            self.resolver.cache_lookups = false;
        }

        // Output
        if other.output.dir != defaults.output.dir {
            self.output.dir.clone_from(&other.output.dir);
        }
        if other.output.file_name != defaults.output.file_name {
            self.output.file_name.clone_from(&other.output.file_name);
        }
        if other.output.offline {
            self.output.offline = true;
        }
    }

    /// Load from file and merge with CLI overrides.
    pub fn from_file_with_overrides(
        config_path: Option<&Path>,
        cli_overrides: &Self,
    ) -> Result<(Self, Option<PathBuf>), ConfigFileError> {
        let (mut config, loaded_from) = load_or_default(config_path)?;
        config.merge(cli_overrides);
        Ok((config, loaded_from))
    }
}

// ============================================================================
// Example Config Generation
// ============================================================================

/// Generate a commented example config file.
#[must_use]
pub fn generate_example_config() -> String {
    r"# SBOM Import Configuration File
# ===============================
#
# Place this file at:
#   - .sbom-import.yaml in your project root
#   - ~/.config/sbom-import/sbom-import.yaml for global config
#
# CLI arguments and environment variables always override file settings.
# Prefer WS_USERKEY / MEND_APIKEY over storing credentials here.

# Inventory server connection
server:
  url: https://saas.mend.io
  # user_key: <user key>
  # org_token: <organization API key>
  timeout_secs: 60

# Target project
scope:
  # Project, Product//Project or Org//Product//Project
  # scope: My Product//My Project
  # Product used when the scope names only a project
  # product_token: My Product
  # OVERRIDE or APPEND
  update_type: OVERRIDE

# Checksum resolution
resolver:
  # Search every ecosystem for every package
  multilingual: false
  # Worker threads; 1 keeps lookups sequential
  workers: 1
  # Answer repeated identical lookups from memory
  cache_lookups: true

# Update request output
output:
  dir: .
  file_name: update-request.txt
  # Write the request without uploading it
  offline: false
"
    .to_string()
}

// ============================================================================
// Tests
// ============================================================================
