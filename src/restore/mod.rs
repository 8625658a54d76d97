//! Restore pipeline
//!
//! A single scanning thread decodes and filters the archive and hands
//! matching records to a fixed pool of worker threads.
//!
//! # Architecture
//!
//! ```text
//!                     ┌─────────────────────────┐
//!                     │       Supervisor        │
//!                     │  - ArchiveReader        │
//!                     │  - PathFilter           │
//!                     └───────────┬─────────────┘
//!                                 │
//!                     ┌───────────▼─────────────┐
//!                     │      Handoff Queue      │
//!                     │  (crossbeam bounded)    │
//!                     └───────────┬─────────────┘
//!       ┌─────────────────────────┼─────────────────────────┐
//!       │                         │                         │
//! ┌─────▼─────┐             ┌─────▼─────┐             ┌─────▼─────┐
//! │  Worker 1 │             │  Worker 2 │             │  Worker N │
//! │   POST    │             │   POST    │             │   POST    │
//! └───────────┘             └───────────┘             └───────────┘
//! ```

pub mod queue;
pub mod supervisor;
pub mod worker;

pub use supervisor::{RunSummary, Supervisor};
pub use worker::WorkerReport;
