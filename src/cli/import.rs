//! Import command handler.
//!
//! Implements the `import` subcommand: resolve an SBOM into an update request,
//! write it, and upload it unless offline.

use crate::client::MendClient;
use crate::config::{ImportConfig, Validatable};
use crate::pipeline::{exit_codes, run_import as run_pipeline, ImportServices, NoLookup};
use anyhow::{bail, Context, Result};
use std::path::Path;

/// Environment variables accepted for each setting, in lookup order.
///
/// The first name of each list is also wired to the CLI flag; the rest are
/// read by [`first_env`].
pub mod env_vars {
    pub const USER_KEY: &[&str] = &["WS_USERKEY", "MEND_USERKEY"];
    pub const API_KEY: &[&str] = &["MEND_APIKEY", "WS_APIKEY", "WS_TOKEN"];
    pub const URL: &[&str] = &["WS_WSS_URL", "MEND_WSS_URL", "WS_URL", "MEND_URL"];
    pub const SCOPE: &[&str] = &["WS_SCOPE", "MEND_SCOPE"];
    pub const PRODUCT: &[&str] = &["WS_PRODUCTTOKEN", "MEND_PRODUCTTOKEN"];
}

/// First non-empty value among the given environment variables.
#[must_use]
pub fn first_env(names: &[&str]) -> Option<String> {
    names
        .iter()
        .filter_map(|name| std::env::var(name).ok())
        .find(|value| !value.trim().is_empty())
}

/// Whether the `DEBUG` environment variable asks for debug logging.
#[must_use]
pub fn debug_requested() -> bool {
    std::env::var("DEBUG")
        .map(|v| matches!(v.trim().to_lowercase().as_str(), "true" | "1"))
        .unwrap_or(false)
}

/// Run the import command, returning the desired exit code.
///
/// `overrides` carries CLI and environment values; they are merged over the
/// discovered config file. The caller is responsible for calling
/// `std::process::exit()` with the returned code when it is non-zero.
pub fn run_import(
    sbom_path: &Path,
    overrides: &ImportConfig,
    config_path: Option<&Path>,
) -> Result<i32> {
    let (config, loaded_from) = ImportConfig::from_file_with_overrides(config_path, overrides)
        .context("failed to load configuration")?;
    if let Some(path) = &loaded_from {
        tracing::debug!("Loaded config from {}", path.display());
    }
    tracing::debug!("Configuration: {config:?}");

    let errors = config.validate();
    if !errors.is_empty() {
        let details: Vec<String> = errors.iter().map(ToString::to_string).collect();
        bail!("invalid configuration:\n  {}", details.join("\n  "));
    }

    if !sbom_path.is_file() {
        bail!("Input file does not exist: {}", sbom_path.display());
    }

    let has_credentials = config.server.user_key.is_some() && config.server.org_token.is_some();
    let client = if has_credentials {
        Some(MendClient::new(config.client_config()).context("failed to create HTTP client")?)
    } else {
        tracing::warn!("No credentials configured; only declared checksums will be used");
        None
    };

    let services = match &client {
        Some(client) => ImportServices {
            lookup: client,
            projects: Some(client),
            uploader: Some(client),
        },
        None => ImportServices {
            lookup: &NoLookup,
            projects: None,
            uploader: None,
        },
    };

    tracing::info!("Generating update request");
    match run_pipeline(sbom_path, &config, &services) {
        Ok(report) => {
            tracing::info!(
                dependencies = report.request.dependency_count(),
                uploaded = report.upload.is_some(),
                "Import finished: {}",
                report.request_path.display()
            );
            Ok(exit_codes::SUCCESS)
        }
        Err(err) => {
            tracing::error!("{err}");
            Ok(err.exit_code())
        }
    }
}
