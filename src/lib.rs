//! cbfs-restore - Restore a cbfs store from a backup archive
//!
//! Reads a gzip-compressed backup archive of per-file metadata records and
//! replays each record against the store's restore endpoint, recreating the
//! files. A path pattern can limit the restore to part of the store.
//!
//! # Features
//!
//! - **Streaming Decode**: Records are decoded one at a time; the archive
//!   is never loaded into memory.
//!
//! - **Parallel Restore**: A fixed pool of worker threads overlaps the
//!   network latency of independent submissions.
//!
//! - **Backpressure**: The scan blocks while every worker is busy instead
//!   of queueing an unbounded number of pending restores.
//!
//! - **Failure Isolation**: A failed restore is logged and skipped. Only a
//!   damaged archive or bad configuration aborts the run.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐    ┌────────────┐    ┌──────────────┐    ┌──────────┐
//! │ backup.json  │───▶│ PathFilter │───▶│ Handoff Queue│───▶│ Workers  │
//! │ .gz          │    │  (regex)   │    │  (bounded)   │    │  1..N    │
//! └──────────────┘    └────────────┘    └──────────────┘    └────┬─────┘
//!                                                                │
//!                                     POST /.cbfs/backup/restore/<path>
//!                                                                │
//!                                                                ▼
//!                                                        ┌──────────────┐
//!                                                        │  cbfs store  │
//!                                                        └──────────────┘
//! ```
//!
//! # Example
//!
//! ```bash
//! # Restore everything
//! cbfs-restore http://cbfs:8484/ backup.json.gz
//!
//! # Check what would be restored under photos/
//! cbfs-restore http://cbfs:8484/ backup.json.gz --match '^photos/' -n
//! ```

pub mod archive;
pub mod config;
pub mod error;
pub mod filter;
pub mod progress;
pub mod restore;
pub mod transport;

pub use archive::{ArchiveReader, ArchiveRecord};
pub use config::{CliArgs, RestoreConfig};
pub use error::{RestoreError, RestoreOutcome, Result, SubmitFailure};
pub use filter::PathFilter;
pub use restore::{RunSummary, Supervisor};
pub use transport::{HttpTransport, RestoreTransport};
