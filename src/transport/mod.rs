//! Restore submission transport
//!
//! A transport takes one `ArchiveRecord` and asks the remote store to
//! recreate it. The store exposes its restore operation under a fixed
//! namespace:
//!
//! ```text
//! POST <base>/.cbfs/backup/restore/<path>
//! Content-Type: application/json
//!
//! <record metadata>
//! ```
//!
//! `201 Created` is the only successful answer. Anything else is reported
//! as a per-item failure; it never aborts the run.

pub mod http;

use crate::archive::ArchiveRecord;
use crate::error::{ConfigError, RestoreOutcome, SubmitFailure};
use url::Url;

pub use http::HttpTransport;

/// URL path segments under which the store exposes restore
pub const RESTORE_NAMESPACE: [&str; 3] = [".cbfs", "backup", "restore"];

/// Submits a single record to the remote store
///
/// Implementations must be safe to call from several workers at once for
/// disjoint paths.
pub trait RestoreTransport: Send + Sync {
    /// Restore one record and classify the result
    fn submit(&self, record: &ArchiveRecord) -> RestoreOutcome;
}

/// Parse and validate the base URL of the remote store
pub fn parse_base_url(input: &str) -> Result<Url, ConfigError> {
    let invalid = |reason: String| ConfigError::InvalidBaseUrl {
        url: input.to_string(),
        reason,
    };

    let url = Url::parse(input.trim()).map_err(|e| invalid(e.to_string()))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid(format!(
            "unsupported scheme '{}', expected http or https",
            url.scheme()
        )));
    }
    if url.host_str().map_or(true, str::is_empty) {
        return Err(invalid("missing host".into()));
    }
    if url.query().is_some() || url.fragment().is_some() {
        return Err(invalid("query strings and fragments are not allowed".into()));
    }

    Ok(url)
}

/// Build the restore endpoint for a store path
///
/// The base path is kept; each `/`-separated component of `path` is
/// percent-escaped as its own segment. URL parsing collapses `.` and `..`
/// segments, so paths containing them, and empty paths, are refused rather
/// than sent to a different location.
pub fn restore_url(base: &Url, path: &str) -> Result<Url, SubmitFailure> {
    if path.is_empty() {
        return Err(SubmitFailure::InvalidPath {
            path: path.to_string(),
            reason: "empty path".into(),
        });
    }
    if path.split('/').any(|segment| matches!(segment, "." | "..")) {
        return Err(SubmitFailure::InvalidPath {
            path: path.to_string(),
            reason: "dot segments cannot be addressed".into(),
        });
    }

    let mut url = base.clone();
    if let Ok(mut segments) = url.path_segments_mut() {
        segments
            .pop_if_empty()
            .extend(RESTORE_NAMESPACE)
            .extend(path.split('/'));
    }
    Ok(url)
}
