//! sbom-import: resolve SBOM packages into a dependency update request
//!
//! Reads an SPDX JSON or CSV SBOM, resolves package checksums and uploads the
//! resulting update request to the Mend inventory service.

use anyhow::{Context, Result};
use clap::{Args, CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use sbom_import::{
    cli::{self, env_vars, first_env},
    config::{ImportConfig, OutputConfig, ResolverConfig, ScopeConfig, ServerConfig},
    model::UpdateType,
};
use std::io;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Build long version string with format support info
const fn build_long_version() -> &'static str {
    concat!(
        env!("CARGO_PKG_VERSION"),
        "\n\nSupported SBOM Formats:",
        "\n  SPDX: 2.2, 2.3 (JSON)",
        "\n  CSV:  name, versionInfo, packageFileName, sha1 columns",
        "\n\nEcosystems:",
        "\n  maven, pypi, npm, cdnjs, .net, bower, ocaml, go, nuget, rpm, php,",
        "\n  cocoapods, cran, ruby, rust, hex, alpine"
    )
}

#[derive(Parser)]
#[command(name = "sbom-import")]
#[command(version, long_version = build_long_version())]
#[command(about = "Resolve SBOM packages into a Mend dependency update request", long_about = None)]
#[command(after_help = "EXIT CODES:
    0  Update request written (and uploaded unless offline)
    1  Upload failed; the update request file was still written
    2  The lookup service refused the credentials
    3  Error occurred

EXAMPLES:
    # Resolve and upload into Product//Project
    sbom-import --sbom sbom.spdx.json --scope \"My Product//My Project\"

    # Write update-request.txt only
    sbom-import --sbom sbom.csv --scope my-project --offline --out ./out

    # Resolve with four lookup workers
    sbom-import import --sbom sbom.spdx.json --workers 4")]
struct Cli {
    /// Enable verbose output (also enabled by DEBUG=true)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,

    /// Import arguments when no subcommand is given
    #[command(flatten)]
    import: ImportArgs,
}

// ============================================================================
// Command argument structs
// ============================================================================

/// Arguments for the `import` subcommand
#[derive(Args, Clone)]
struct ImportArgs {
    /// SBOM report to import (*.json | *.csv)
    #[arg(long, visible_alias = "input", env = "SBOM")]
    sbom: Option<PathBuf>,

    /// Mend user key
    #[arg(
        long = "user-key",
        visible_alias = "userKey",
        alias = "userkey",
        env = "WS_USERKEY",
        hide_env_values = true
    )]
    user_key: Option<String>,

    /// Mend organization API key
    #[arg(
        long = "api-key",
        visible_aliases = ["apiKey", "orgToken"],
        aliases = ["apikey", "orgtoken"],
        env = "MEND_APIKEY",
        hide_env_values = true
    )]
    api_key: Option<String>,

    /// Mend server URL
    #[arg(long, visible_alias = "mendUrl", alias = "mendurl", env = "WS_WSS_URL")]
    url: Option<String>,

    /// Scope: Project, Product//Project or Org//Product//Project
    #[arg(long, visible_alias = "projectToken", alias = "projecttoken", env = "WS_SCOPE")]
    scope: Option<String>,

    /// Product used when the scope names only a project
    #[arg(
        long,
        visible_alias = "productToken",
        alias = "producttoken",
        env = "WS_PRODUCTTOKEN"
    )]
    product: Option<String>,

    /// How the service merges the request with existing data
    #[arg(
        long = "update-type",
        visible_alias = "updateType",
        alias = "updatetype",
        env = "WS_UPDATETYPE",
        value_enum,
        ignore_case = true
    )]
    update_type: Option<UpdateType>,

    /// Output directory for update-request.txt
    #[arg(long, visible_alias = "dir")]
    out: Option<PathBuf>,

    /// Write the update request without uploading it
    #[arg(long, env = "WS_OFFLINE")]
    offline: bool,

    /// Search every ecosystem for every package
    #[arg(long)]
    multilingual: bool,

    /// Lookup workers; 1 resolves sequentially
    #[arg(long)]
    workers: Option<usize>,

    /// Disable the in-run lookup memo
    #[arg(long)]
    no_cache: bool,

    /// HTTP request timeout in seconds
    #[arg(long)]
    timeout: Option<u64>,
}

impl ImportArgs {
    /// CLI and environment values as a config overlay.
    fn into_overrides(self) -> ImportConfig {
        let server_defaults = ServerConfig::default();
        let resolver_defaults = ResolverConfig::default();
        let output_defaults = OutputConfig::default();

        ImportConfig {
            server: ServerConfig {
                url: self
                    .url
                    .or_else(|| first_env(env_vars::URL))
                    .unwrap_or(server_defaults.url),
                user_key: self.user_key.or_else(|| first_env(env_vars::USER_KEY)),
                org_token: self.api_key.or_else(|| first_env(env_vars::API_KEY)),
                timeout_secs: self.timeout.unwrap_or(server_defaults.timeout_secs),
            },
            scope: ScopeConfig {
                scope: self.scope.or_else(|| first_env(env_vars::SCOPE)),
                product_token: self.product.or_else(|| first_env(env_vars::PRODUCT)),
                update_type: self.update_type.unwrap_or_default(),
            },
            resolver: ResolverConfig {
                multilingual: self.multilingual,
                workers: self.workers.unwrap_or(resolver_defaults.workers),
                cache_lookups: !self.no_cache,
            },
            output: OutputConfig {
                dir: self.out.unwrap_or(output_defaults.dir),
                file_name: output_defaults.file_name,
                offline: self.offline,
            },
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve an SBOM and write (and upload) the update request
    Import(ImportArgs),

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },

    /// Generate JSON Schema for the config file format
    ConfigSchema {
        /// Write schema to file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show, discover, or initialize configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Sub-subcommands for the `config` command
#[derive(Subcommand)]
enum ConfigAction {
    /// Print current effective configuration (credentials masked)
    Show,
    /// Print config file search paths and discovered config file
    Path,
    /// Generate an example .sbom-import.yaml in the current directory
    Init,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose || cli::debug_requested() {
        "debug"
    } else {
        "info"
    };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| log_level.to_string()),
        ))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    tracing::info!("sbom-import {}", env!("CARGO_PKG_VERSION"));

    match cli.command {
        None => run_import(cli.import, cli.config),
        Some(Commands::Import(args)) => run_import(args, cli.config),

        Some(Commands::Completions { shell }) => {
            generate(shell, &mut Cli::command(), "sbom-import", &mut io::stdout());
            Ok(())
        }

        Some(Commands::ConfigSchema { output }) => {
            let schema = sbom_import::config::generate_json_schema()
                .context("failed to serialize schema")?;
            match output {
                Some(path) => {
                    std::fs::write(&path, &schema)
                        .with_context(|| format!("failed to write {}", path.display()))?;
                    eprintln!("Schema written to {}", path.display());
                }
                None => {
                    println!("{schema}");
                }
            }
            Ok(())
        }

        Some(Commands::Config { action }) => match action {
            ConfigAction::Show => {
                let (mut config, loaded_from) =
                    sbom_import::config::load_or_default(cli.config.as_deref())
                        .context("failed to load configuration")?;
                config.merge(&cli.import.into_overrides());
                if let Some(path) = &loaded_from {
                    eprintln!("# Loaded from: {}", path.display());
                } else {
                    eprintln!("# No config file found; showing defaults");
                }
                let yaml =
                    serde_yaml::to_string(&config.masked()).context("failed to serialize config")?;
                print!("{yaml}");
                Ok(())
            }
            ConfigAction::Path => {
                let search_paths: [Option<String>; 3] = [
                    std::env::current_dir()
                        .ok()
                        .map(|p| p.display().to_string()),
                    dirs::config_dir().map(|p| p.join("sbom-import").display().to_string()),
                    dirs::home_dir().map(|p| p.display().to_string()),
                ];
                eprintln!("Config file search paths (in order):");
                for path in search_paths.into_iter().flatten() {
                    eprintln!("  {path}");
                }
                eprintln!();
                eprintln!("Recognized file names:");
                for name in &[".sbom-import.yaml", ".sbom-import.yml", "sbom-import.yaml"] {
                    eprintln!("  {name}");
                }
                eprintln!();
                match sbom_import::config::discover_config_file(cli.config.as_deref()) {
                    Some(path) => eprintln!("Active config file: {}", path.display()),
                    None => eprintln!("No config file found."),
                }
                Ok(())
            }
            ConfigAction::Init => {
                let target = std::env::current_dir()
                    .context("cannot determine current directory")?
                    .join(".sbom-import.yaml");
                if target.exists() {
                    anyhow::bail!(
                        "{} already exists. Remove it first to re-initialize.",
                        target.display()
                    );
                }
                let content = sbom_import::config::generate_example_config();
                std::fs::write(&target, content)
                    .with_context(|| format!("failed to write {}", target.display()))?;
                eprintln!("Created {}", target.display());
                Ok(())
            }
        },
    }
}

fn run_import(args: ImportArgs, config_path: Option<PathBuf>) -> Result<()> {
    let Some(sbom) = args.sbom.clone() else {
        Cli::command()
            .error(
                clap::error::ErrorKind::MissingRequiredArgument,
                "the --sbom <SBOM> argument is required",
            )
            .exit();
    };

    let exit_code = cli::run_import(&sbom, &args.into_overrides(), config_path.as_deref())?;
    if exit_code != 0 {
        std::process::exit(exit_code);
    }
    Ok(())
}
