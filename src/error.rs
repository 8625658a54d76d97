//! Error types for cbfs-restore
//!
//! Two classes of failure exist and they are kept in separate types:
//! - Fatal errors (`RestoreError` and its sub-enums) abort the whole run.
//!   They cover configuration, archive opening and record decoding.
//! - Per-item outcomes (`RestoreOutcome`) describe a single restore
//!   submission. A failed submission is logged and the run carries on.
//!
//! Design philosophy:
//! - Use thiserror for structured error types in library code
//! - Errors should be actionable - include the offending path or value
//! - Preserve error chains for debugging

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type for a restore run
#[derive(Error, Debug)]
pub enum RestoreError {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Archive opening and decoding errors
    #[error("Archive error: {0}")]
    Archive(#[from] ArchiveError),

    /// Worker/concurrency errors
    #[error("Worker error: {0}")]
    Worker(#[from] WorkerError),
}

/// Configuration and validation errors
#[derive(Error, Debug, Clone)]
pub enum ConfigError {
    /// Invalid worker count
    #[error("Invalid worker count {count}: must be between 1 and {max}")]
    InvalidWorkerCount { count: usize, max: usize },

    /// Invalid handoff queue size
    #[error("Invalid queue size {size}: must be at most {max}")]
    InvalidQueueSize { size: usize, max: usize },

    /// Path pattern failed to compile
    #[error("Invalid match pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    /// Base URL is malformed or unusable
    #[error("Invalid base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },
}

/// Archive opening and decoding errors
///
/// Every variant is fatal: once the decoder has lost its place in the
/// stream nothing after it can be trusted.
#[derive(Error, Debug)]
pub enum ArchiveError {
    /// Archive file could not be opened
    #[error("Failed to open archive '{path}': {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Archive is not a gzip stream (or is empty)
    #[error("Failed to decompress archive: {reason}")]
    Decompress { reason: String },

    /// A record could not be decoded
    #[error("Failed to decode record {record}: {source}")]
    Decode {
        /// 1-based index of the record that failed
        record: u64,
        #[source]
        source: serde_json::Error,
    },
}

/// Worker thread errors
#[derive(Error, Debug, Clone)]
pub enum WorkerError {
    /// Worker thread could not be started
    #[error("Worker {id} failed to start: {reason}")]
    SpawnFailed { id: usize, reason: String },

    /// Worker panicked
    #[error("Worker {id} panicked: {message}")]
    Panicked { id: usize, message: String },

    /// Every worker exited while records were still being dispatched
    #[error("Handoff queue closed unexpectedly")]
    QueueClosed,
}

/// Result type alias for RestoreError
pub type Result<T> = std::result::Result<T, RestoreError>;

/// Result type alias for ArchiveError
pub type ArchiveResult<T> = std::result::Result<T, ArchiveError>;

/// Outcome of restoring a single archive record
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RestoreOutcome {
    /// The remote store accepted the record
    Success,

    /// The submission failed; the run continues
    Failed { reason: SubmitFailure },
}

/// Why a single restore submission failed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitFailure {
    /// The endpoint answered with something other than 201 Created
    Status {
        code: u16,
        status_text: String,
        /// Response body, kept as diagnostic text
        body: String,
    },

    /// The endpoint could not be reached
    Transport(String),

    /// The path cannot be expressed as a restore URL
    InvalidPath { path: String, reason: String },
}

impl fmt::Display for SubmitFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubmitFailure::Status {
                code,
                status_text,
                body,
            } => {
                write!(f, "HTTP {} {}", code, status_text)?;
                let body = body.trim();
                if !body.is_empty() {
                    write!(f, ": {}", body)?;
                }
                Ok(())
            }
            SubmitFailure::Transport(message) => write!(f, "transport error: {}", message),
            SubmitFailure::InvalidPath { path, reason } => {
                write!(f, "invalid path '{}': {}", path, reason)
            }
        }
    }
}
