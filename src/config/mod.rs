//! Configuration module for sbom-import.
//!
//! This module provides a unified configuration system with:
//! - Type-safe configuration structures
//! - Validation for all configuration values
//! - YAML config file loading and discovery
//! - CLI argument merging
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use sbom_import::config::{ImportConfig, load_or_default};
//!
//! // Use builder
//! let config = ImportConfig::builder()
//!     .scope("My Product//My Project")
//!     .workers(4)
//!     .offline(true)
//!     .build();
//!
//! // Load from file
//! let (config, loaded_from) = load_or_default(None)?;
//! ```
//!
//! # Configuration File
//!
//! Place a `.sbom-import.yaml` file in your project root or
//! `~/.config/sbom-import/`:
//!
//! ```yaml
//! scope:
//!   scope: My Product//My Project
//! resolver:
//!   workers: 4
//! ```

mod defaults;
pub mod file;
mod types;
mod validation;

pub use defaults::{
    DEFAULT_OUTPUT_DIR, DEFAULT_OUTPUT_FILE, DEFAULT_SERVER_URL, DEFAULT_TIMEOUT_SECS,
    DEFAULT_WORKERS, MAX_WORKERS,
};
pub use types::{
    ImportConfig, ImportConfigBuilder, OutputConfig, ResolverConfig, ScopeConfig, ServerConfig,
    MASK,
};
pub use validation::{ConfigError, Validatable};

pub use file::{
    discover_config_file, generate_example_config, load_config_file, load_or_default,
    ConfigFileError,
};

/// Generate a JSON Schema for the `ImportConfig` configuration format.
///
/// This schema documents all configuration options that can be set in
/// `.sbom-import.yaml` config files. It can be used by editors for
/// validation and autocompletion.
pub fn generate_json_schema() -> serde_json::Result<String> {
    let schema = schemars::schema_for!(ImportConfig);
    serde_json::to_string_pretty(&schema)
}
