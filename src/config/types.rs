//! Configuration types for sbom-import.
//!
//! Provides structured configuration for the import pipeline: the server
//! connection, the target scope, resolver tuning and output handling.

use super::defaults::{
    DEFAULT_OUTPUT_DIR, DEFAULT_OUTPUT_FILE, DEFAULT_SERVER_URL, DEFAULT_TIMEOUT_SECS,
    DEFAULT_WORKERS,
};
use crate::client::{extract_url, MendClientConfig};
use crate::model::UpdateType;
use crate::resolve::EngineOptions;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

// ============================================================================
// Unified Import Configuration
// ============================================================================

/// Unified configuration loaded from config files, CLI args and environment.
///
/// File values are loaded first; CLI and environment values are merged over
/// them (see [`ImportConfig::merge`]).
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct ImportConfig {
    /// Inventory server connection
    pub server: ServerConfig,
    /// Target organization, product and project
    pub scope: ScopeConfig,
    /// Checksum resolution tuning
    pub resolver: ResolverConfig,
    /// Update request output
    pub output: OutputConfig,
}

impl ImportConfig {
    /// Create a new `ImportConfig` with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an `ImportConfig` builder.
    pub fn builder() -> ImportConfigBuilder {
        ImportConfigBuilder::default()
    }

    /// Client settings for this configuration, with the server URL
    /// normalized.
    #[must_use]
    pub fn client_config(&self) -> MendClientConfig {
        MendClientConfig {
            base_url: extract_url(&self.server.url),
            user_key: self.server.user_key.clone().unwrap_or_default(),
            org_token: self.server.org_token.clone().unwrap_or_default(),
            timeout: Duration::from_secs(self.server.timeout_secs),
        }
    }

    /// Copy with credentials replaced by a mask, for display.
    #[must_use]
    pub fn masked(&self) -> Self {
        let mut copy = self.clone();
        copy.server.user_key = copy.server.user_key.as_ref().map(|_| MASK.to_string());
        copy.server.org_token = copy.server.org_token.as_ref().map(|_| MASK.to_string());
        copy
    }
}

/// Replacement shown for secrets
pub const MASK: &str = "******";

// ============================================================================
// Builder for ImportConfig
// ============================================================================

/// Builder for constructing `ImportConfig` with fluent API.
#[derive(Debug, Default)]
#[must_use]
pub struct ImportConfigBuilder {
    config: ImportConfig,
}

impl ImportConfigBuilder {
    /// Set the server URL.
    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.config.server.url = url.into();
        self
    }

    /// Set both credentials.
    pub fn credentials(mut self, user_key: impl Into<String>, org_token: impl Into<String>) -> Self {
        self.config.server.user_key = Some(user_key.into());
        self.config.server.org_token = Some(org_token.into());
        self
    }

    /// Set the scope string.
    pub fn scope(mut self, scope: impl Into<String>) -> Self {
        self.config.scope.scope = Some(scope.into());
        self
    }

    /// Set the update type.
    pub const fn update_type(mut self, update_type: UpdateType) -> Self {
        self.config.scope.update_type = update_type;
        self
    }

    /// Set the number of resolver workers.
    pub const fn workers(mut self, workers: usize) -> Self {
        self.config.resolver.workers = workers;
        self
    }

    /// Search every ecosystem for every package.
    pub const fn multilingual(mut self, multilingual: bool) -> Self {
        self.config.resolver.multilingual = multilingual;
        self
    }

    /// Set the output directory.
    pub fn output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.output.dir = dir.into();
        self
    }

    /// Skip the upload.
    pub const fn offline(mut self, offline: bool) -> Self {
        self.config.output.offline = offline;
        self
    }

    /// Build the configuration.
    #[must_use]
    pub fn build(self) -> ImportConfig {
        self.config
    }
}

// ============================================================================
// Server Configuration
// ============================================================================

/// Inventory server connection settings.
#[derive(Clone, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct ServerConfig {
    /// Server URL; normalized to `https://host[:port]` before use
    pub url: String,
    /// User key
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_key: Option<String>,
    /// Organization API key
    #[serde(skip_serializing_if = "Option::is_none")]
    pub org_token: Option<String>,
    /// HTTP request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_SERVER_URL.to_string(),
            user_key: None,
            org_token: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl fmt::Debug for ServerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServerConfig")
            .field("url", &self.url)
            .field("user_key", &self.user_key.as_ref().map(|_| MASK))
            .field("org_token", &self.org_token.as_ref().map(|_| MASK))
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

// ============================================================================
// Scope Configuration
// ============================================================================

/// Where resolved dependencies are attributed.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct ScopeConfig {
    /// `Project`, `Product//Project` or `Org//Product//Project`; a project
    /// token is accepted in place of the project name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
    /// Product used when the scope names only a project
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_token: Option<String>,
    /// How the service merges the request with existing data
    pub update_type: UpdateType,
}

// ============================================================================
// Resolver Configuration
// ============================================================================

/// Checksum resolution tuning.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct ResolverConfig {
    /// Search every ecosystem instead of narrowing by file extension or
    /// creator tool
    pub multilingual: bool,
    /// Worker threads; 1 resolves sequentially and promotes the last
    /// successful ecosystem
    pub workers: usize,
    /// Answer repeated identical lookups from an in-run memo
    pub cache_lookups: bool,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            multilingual: false,
            workers: DEFAULT_WORKERS,
            cache_lookups: true,
        }
    }
}

impl From<&ResolverConfig> for EngineOptions {
    fn from(config: &ResolverConfig) -> Self {
        Self {
            multilingual: config.multilingual,
            workers: config.workers.max(1),
            cache_lookups: config.cache_lookups,
        }
    }
}

// ============================================================================
// Output Configuration
// ============================================================================

/// Update request output settings.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory the update request is written to; created when missing
    pub dir: PathBuf,
    /// File name of the update request
    pub file_name: String,
    /// Write the update request without uploading it
    pub offline: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            file_name: DEFAULT_OUTPUT_FILE.to_string(),
            offline: false,
        }
    }
}

impl OutputConfig {
    /// Full path of the update request file
    #[must_use]
    pub fn request_path(&self) -> PathBuf {
        self.dir.join(&self.file_name)
    }
}
