//! Default values for sbom-import configuration.

/// Inventory server used when none is configured
pub const DEFAULT_SERVER_URL: &str = "https://saas.mend.io";

/// HTTP request timeout
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Output directory (the working directory)
pub const DEFAULT_OUTPUT_DIR: &str = ".";

/// File the update request is written to
pub const DEFAULT_OUTPUT_FILE: &str = "update-request.txt";

/// Resolver workers; one keeps lookups sequential
pub const DEFAULT_WORKERS: usize = 1;

/// Upper bound accepted for resolver workers
pub const MAX_WORKERS: usize = 64;
