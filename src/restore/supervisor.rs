//! Restore supervisor - drives a complete restore run
//!
//! The supervisor is responsible for:
//! - Opening the archive and starting the workers
//! - Scanning records in archive order and applying the path filter
//! - Feeding matching records to the workers
//! - Waiting for the workers to drain and reporting totals
//!
//! A run moves through `Init → Scanning → Draining → Done`. A decode error
//! during the scan aborts the run without a summary.

use crate::archive::ArchiveReader;
use crate::config::RestoreConfig;
use crate::error::{RestoreError, Result, WorkerError};
use crate::restore::queue::{HandoffQueue, QueueReceiver, QueueSender};
use crate::restore::worker::{Worker, WorkerReport};
use crate::transport::{HttpTransport, RestoreTransport};
use std::io::Read;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, trace, warn};

/// How often (in records read) the progress callback fires
const PROGRESS_INTERVAL: u64 = 256;

/// Totals for a finished run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Records decoded from the archive
    pub records_read: u64,

    /// Records whose path matched the filter
    pub matched: u64,

    /// Records handed to a worker
    pub dispatched: u64,

    /// Wall-clock time of the run
    pub elapsed: Duration,
}

impl RunSummary {
    /// Matched records per second
    pub fn records_per_second(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.matched as f64 / secs
        } else {
            0.0
        }
    }
}

/// Lifecycle of a restore run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RestorePhase {
    /// Validating inputs and opening the archive
    Init,
    /// Reading, filtering and dispatching records
    Scanning,
    /// Queue closed, waiting for workers to exit
    Draining,
    /// All workers have exited
    Done,
}

/// Callback invoked with running totals while scanning
pub type ProgressCallback = Box<dyn Fn(&RunSummary)>;

/// Coordinates a restore run
pub struct Supervisor {
    /// Configuration
    config: Arc<RestoreConfig>,

    /// Transport shared by every worker
    transport: Arc<dyn RestoreTransport>,

    /// Set on a fatal scan error so workers stop taking records
    abort: Arc<AtomicBool>,

    /// Current phase
    phase: RestorePhase,

    /// Optional progress hook
    progress: Option<ProgressCallback>,
}

impl Supervisor {
    /// Create a supervisor that restores over HTTP
    pub fn new(config: RestoreConfig) -> Self {
        let transport = HttpTransport::new(config.base_url.clone(), config.dry_run);
        Self::with_transport(config, Arc::new(transport))
    }

    /// Create a supervisor with a custom transport
    pub fn with_transport(config: RestoreConfig, transport: Arc<dyn RestoreTransport>) -> Self {
        Self {
            config: Arc::new(config),
            transport,
            abort: Arc::new(AtomicBool::new(false)),
            phase: RestorePhase::Init,
            progress: None,
        }
    }

    /// Install a callback that receives running totals during the scan
    pub fn on_progress(mut self, callback: impl Fn(&RunSummary) + 'static) -> Self {
        self.progress = Some(Box::new(callback));
        self
    }

    /// Open the configured archive and run the restore
    pub fn run(self) -> Result<RunSummary> {
        let start = Instant::now();
        let reader = ArchiveReader::open(&self.config.archive_path)?;
        self.run_from(reader, start)
    }

    /// Run the restore over an already opened archive
    pub fn run_archive<R: Read>(self, reader: ArchiveReader<R>) -> Result<RunSummary> {
        self.run_from(reader, Instant::now())
    }

    fn run_from<R: Read>(mut self, reader: ArchiveReader<R>, start: Instant) -> Result<RunSummary> {
        info!(
            archive = %self.config.archive_path.display(),
            base = %self.config.base_url,
            workers = self.config.worker_count,
            pattern = self.config.filter.as_str(),
            dry_run = self.config.dry_run,
            "Starting restore"
        );

        let queue = HandoffQueue::new(self.config.queue_size);
        debug!(capacity = queue.capacity(), "Handoff queue created");
        let (sender, receiver) = queue.split();
        let workers = self.spawn_workers(receiver)?;

        self.enter(RestorePhase::Scanning);
        let mut summary = match self.scan(reader, &sender, start) {
            Ok(summary) => summary,
            Err(ScanError::Archive(e)) => {
                // Nothing read after a bad record can be trusted
                self.abort.store(true, Ordering::SeqCst);
                sender.close();
                return Err(e);
            }
            Err(ScanError::WorkersGone) => {
                sender.close();
                Self::join_workers(workers)?;
                return Err(WorkerError::QueueClosed.into());
            }
        };

        self.enter(RestorePhase::Draining);
        sender.close();
        let reports = Self::join_workers(workers)?;
        for report in &reports {
            debug!(
                worker = report.id,
                submitted = report.submitted,
                failed = report.failed,
                "Worker finished"
            );
        }

        self.enter(RestorePhase::Done);
        summary.elapsed = start.elapsed();

        info!(
            read = summary.records_read,
            matched = summary.matched,
            elapsed_ms = summary.elapsed.as_millis() as u64,
            "Restored {} files in {:?}",
            summary.matched,
            summary.elapsed
        );

        Ok(summary)
    }

    /// Read, filter and dispatch every record in archive order
    fn scan<R: Read>(
        &self,
        mut reader: ArchiveReader<R>,
        sender: &QueueSender,
        start: Instant,
    ) -> std::result::Result<RunSummary, ScanError> {
        let mut summary = RunSummary::default();

        while let Some(record) = reader.next() {
            let record = record.map_err(|e| ScanError::Archive(e.into()))?;
            summary.records_read = reader.records_read();

            if self.config.filter.matches(&record.path) {
                summary.matched += 1;
                // Blocks while every worker is busy
                sender.send(record).map_err(|_| ScanError::WorkersGone)?;
                summary.dispatched += 1;
            } else {
                trace!(path = %record.path, "Skipping unmatched path");
            }

            if summary.records_read % PROGRESS_INTERVAL == 0 {
                self.report_progress(&mut summary, start);
            }
        }

        self.report_progress(&mut summary, start);
        Ok(summary)
    }

    fn report_progress(&self, summary: &mut RunSummary, start: Instant) {
        if let Some(ref callback) = self.progress {
            summary.elapsed = start.elapsed();
            callback(summary);
        }
    }

    /// Spawn worker threads
    fn spawn_workers(&self, receiver: QueueReceiver) -> Result<Vec<Worker>> {
        let mut workers = Vec::with_capacity(self.config.worker_count);

        // On failure the workers already running exit once the sender drops
        for id in 0..self.config.worker_count {
            let worker = Worker::spawn(
                id,
                Arc::clone(&self.transport),
                receiver.clone(),
                Arc::clone(&self.abort),
            )?;
            workers.push(worker);
        }

        debug!(count = workers.len(), "Workers spawned");
        Ok(workers)
    }

    /// Join all worker threads; the first failure wins
    fn join_workers(workers: Vec<Worker>) -> Result<Vec<WorkerReport>> {
        let mut reports = Vec::with_capacity(workers.len());
        let mut first_error = None;

        for worker in workers {
            let id = worker.id();
            match worker.join() {
                Ok(report) => reports.push(report),
                Err(e) => {
                    warn!(worker = id, error = %e, "Worker failed to join cleanly");
                    first_error.get_or_insert(e);
                }
            }
        }

        match first_error {
            Some(e) => Err(e.into()),
            None => Ok(reports),
        }
    }

    fn enter(&mut self, phase: RestorePhase) {
        debug!(from = ?self.phase, to = ?phase, "Restore phase");
        self.phase = phase;
    }
}

/// Why the scan stopped early
enum ScanError {
    /// The archive could not be decoded
    Archive(RestoreError),
    /// No worker is left to take records
    WorkersGone,
}
