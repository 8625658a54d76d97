//! Backup archive access
//!
//! A backup archive is a gzip stream holding a sequence of JSON objects,
//! one per file in the store:
//!
//! ```text
//! ┌──────────────────────── gzip ────────────────────────┐
//! │ {"Path":"a/1.txt","Meta":{...}}                      │
//! │ {"Path":"b/2.txt","Meta":{...}}                      │
//! │ ...                                                  │
//! └──────────────────────────────────────────────────────┘
//! ```
//!
//! There is no framing beyond what the JSON decoder needs to find the next
//! value. `ArchiveReader` decodes one record at a time and stops for good
//! on the first malformed record.
//!
//! # Example
//!
//! ```no_run
//! use cbfs_restore::archive::ArchiveReader;
//!
//! let reader = ArchiveReader::open("backup.json.gz").unwrap();
//! for record in reader {
//!     let record = record.unwrap();
//!     println!("{}", record.path);
//! }
//! ```

pub mod reader;
pub mod record;

pub use reader::ArchiveReader;
pub use record::ArchiveRecord;
