//! Configuration types for cbfs-restore
//!
//! This module defines:
//! - CLI argument parsing using clap derive macros
//! - Runtime configuration with validation

use crate::error::ConfigError;
use crate::filter::{PathFilter, DEFAULT_PATTERN};
use crate::transport::parse_base_url;
use clap::Parser;
use std::path::PathBuf;
use url::Url;

/// Default number of restore workers
pub const DEFAULT_WORKERS: usize = 4;

/// Maximum reasonable worker count
pub const MAX_WORKERS: usize = 512;

/// Maximum handoff queue capacity
pub const MAX_QUEUE_SIZE: usize = 65_536;

/// Restore a cbfs store from a backup archive
#[derive(Parser, Debug, Clone)]
#[command(
    name = "cbfs-restore",
    version,
    about = "Restore a cbfs store from a backup archive",
    long_about = "Reads a gzip-compressed cbfs backup archive and replays every file record \
                  against the store's restore endpoint.\n\n\
                  Records are filtered by path in archive order and submitted by a pool of \
                  workers. A failed restore is logged and skipped; a damaged archive aborts \
                  the whole run.",
    after_help = "EXAMPLES:\n    \
        cbfs-restore http://cbfs:8484/ backup.json.gz\n    \
        cbfs-restore http://cbfs:8484/ backup.json.gz -w 16\n    \
        cbfs-restore http://cbfs:8484/ backup.json.gz --match '^photos/' -n"
)]
pub struct CliArgs {
    /// Base URL of the cbfs store (http://server:port/)
    #[arg(value_name = "BASE_URL")]
    pub base_url: String,

    /// Backup archive to restore from
    #[arg(value_name = "ARCHIVE")]
    pub archive: PathBuf,

    /// Dry run - decode and filter, but send nothing
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Regex for paths to restore
    #[arg(
        short = 'm',
        long = "match",
        default_value = DEFAULT_PATTERN,
        value_name = "REGEX"
    )]
    pub pattern: String,

    /// Number of restore workers
    #[arg(short = 'w', long, default_value_t = DEFAULT_WORKERS, value_name = "NUM")]
    pub workers: usize,

    /// Records buffered between the archive scan and the workers
    #[arg(long, default_value_t = 0, value_name = "NUM")]
    pub queue_size: usize,

    /// Quiet mode - suppress progress output
    #[arg(short = 'q', long)]
    pub quiet: bool,

    /// Verbose output (debug logging)
    #[arg(short = 'v', long)]
    pub verbose: bool,
}

/// Validated runtime configuration
#[derive(Debug, Clone)]
pub struct RestoreConfig {
    /// Store base URL
    pub base_url: Url,

    /// Archive to read
    pub archive_path: PathBuf,

    /// Skip all submissions
    pub dry_run: bool,

    /// Compiled path filter
    pub filter: PathFilter,

    /// Number of worker threads
    pub worker_count: usize,

    /// Handoff queue capacity (0 = rendezvous)
    pub queue_size: usize,

    /// Show progress indicator
    pub show_progress: bool,
}

impl RestoreConfig {
    /// Create and validate configuration from CLI arguments
    pub fn from_args(args: CliArgs) -> Result<Self, ConfigError> {
        // Compile the pattern first so a typo never touches the archive
        let filter = PathFilter::new(&args.pattern)?;

        let base_url = parse_base_url(&args.base_url)?;

        if args.workers == 0 || args.workers > MAX_WORKERS {
            return Err(ConfigError::InvalidWorkerCount {
                count: args.workers,
                max: MAX_WORKERS,
            });
        }

        if args.queue_size > MAX_QUEUE_SIZE {
            return Err(ConfigError::InvalidQueueSize {
                size: args.queue_size,
                max: MAX_QUEUE_SIZE,
            });
        }

        Ok(Self {
            base_url,
            archive_path: args.archive,
            dry_run: args.dry_run,
            filter,
            worker_count: args.workers,
            queue_size: args.queue_size,
            show_progress: !args.quiet,
        })
    }

    /// Configuration with defaults for everything but the endpoints
    pub fn new(base_url: Url, archive_path: impl Into<PathBuf>) -> Self {
        Self {
            base_url,
            archive_path: archive_path.into(),
            dry_run: false,
            filter: PathFilter::default(),
            worker_count: DEFAULT_WORKERS,
            queue_size: 0,
            show_progress: false,
        }
    }
}
