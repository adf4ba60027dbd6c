//! Inventory service collaborators.
//!
//! The resolution engine talks to three services through traits:
//! - [`LibraryLookup`]: checksum lookup by ecosystem, name and version
//! - [`ProjectLookup`]: project token lookup by name
//! - [`UpdateUploader`]: hand-off of the finished update request
//!
//! [`MendClient`] implements all three over blocking HTTP.

mod mend;
pub mod response;
mod traits;

pub use mend::{MendClient, MendClientConfig};
pub use traits::{
    LibraryLookup, LibraryMatch, LibraryQuery, LookupOutcome, ProjectLookup, UpdateUploader,
    UploadResult,
};

/// Error codes returned by the lookup service
pub mod codes {
    /// Too many libraries matched; a later ecosystem may still succeed
    pub const AMBIGUOUS_MATCH: i64 = 3028;
    /// The credentials may not query this organization; aborts the run
    pub const NO_PERMISSION: i64 = 5001;
}

/// Normalize a server URL to `https://host[:port]`.
///
/// A missing scheme defaults to https, an `http://` scheme is upgraded, and
/// any path suffix is dropped.
#[must_use]
pub fn extract_url(url: &str) -> String {
    let trimmed = url.trim();
    let without_scheme = trimmed
        .strip_prefix("https://")
        .or_else(|| trimmed.strip_prefix("http://"))
        .unwrap_or(trimmed);
    let host = without_scheme
        .split('/')
        .next()
        .unwrap_or(without_scheme);
    format!("https://{host}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_url() {
        assert_eq!(extract_url("saas.mend.io"), "https://saas.mend.io");
        assert_eq!(extract_url("https://saas.mend.io/"), "https://saas.mend.io");
        assert_eq!(extract_url("http://saas.mend.io"), "https://saas.mend.io");
        assert_eq!(
            extract_url("https://app-eu.whitesourcesoftware.com/Wss/WSS.html"),
            "https://app-eu.whitesourcesoftware.com"
        );
        assert_eq!(extract_url(" mend.local:8443/agent "), "https://mend.local:8443");
    }
}
