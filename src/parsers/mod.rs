//! SBOM input loaders.
//!
//! Two input formats are accepted and normalized into an [`SbomDocument`]:
//! SPDX JSON documents and flat CSV package lists. The format is picked from
//! the file extension: `.csv` selects the tabular loader, anything else is
//! read as JSON.
//!
//! ## Usage
//!
//! ```no_run
//! use sbom_import::parsers::load_sbom;
//! use std::path::Path;
//!
//! let sbom = load_sbom(Path::new("sbom.json")).unwrap();
//! println!("{} packages", sbom.package_count());
//! ```

mod csv;
mod spdx;
mod traits;

pub use self::csv::{CsvLoader, REQUIRED_COLUMNS};
pub use spdx::SpdxJsonLoader;
pub use traits::{ParseError, SbomLoader};

use crate::model::{InputFormat, SbomDocument};
use std::path::Path;

/// Maximum SBOM file size (512 MB)
const MAX_SBOM_FILE_SIZE: u64 = 512 * 1024 * 1024;

/// Loader for a given input format
#[must_use]
pub fn loader_for(format: InputFormat) -> Box<dyn SbomLoader> {
    match format {
        InputFormat::SpdxJson => Box::new(SpdxJsonLoader::new()),
        InputFormat::Csv => Box::new(CsvLoader::new()),
    }
}

/// Load an SBOM file, picking the loader from its extension.
///
/// Every error names the file.
pub fn load_sbom(path: &Path) -> Result<SbomDocument, ParseError> {
    let metadata = std::fs::metadata(path).map_err(|e| ParseError::from(e).in_file(path))?;
    if metadata.len() > MAX_SBOM_FILE_SIZE {
        return Err(ParseError::InvalidStructure(format!(
            "SBOM file is {} MB, exceeding the {} MB limit",
            metadata.len() / (1024 * 1024),
            MAX_SBOM_FILE_SIZE / (1024 * 1024),
        ))
        .in_file(path));
    }

    let format = InputFormat::from_path(path);
    tracing::debug!(path = %path.display(), %format, "Loading SBOM");
    loader_for(format).load(path)
}

/// Parse SBOM content in a known format
pub fn parse_sbom_str(content: &str, format: InputFormat) -> Result<SbomDocument, ParseError> {
    loader_for(format).parse_str(content)
}
