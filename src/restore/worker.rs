//! Restore worker threads
//!
//! Each worker:
//! - Pulls one record at a time from the handoff queue
//! - Submits it through the shared transport
//! - Logs the outcome and moves on, whatever it was
//!
//! Workers share no mutable state. Each keeps its own `WorkerReport`,
//! handed back through the thread's join handle.

use crate::error::{RestoreOutcome, WorkerError};
use crate::restore::queue::QueueReceiver;
use crate::transport::RestoreTransport;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use tracing::{debug, info, warn};

/// What a single worker did during the run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkerReport {
    /// Worker ID
    pub id: usize,

    /// Records handed to the transport
    pub submitted: u64,

    /// Submissions that did not succeed
    pub failed: u64,
}

/// A worker thread that restores records
pub struct Worker {
    /// Worker ID
    id: usize,

    /// Thread handle
    handle: Option<JoinHandle<WorkerReport>>,
}

impl Worker {
    /// Spawn a new worker thread
    pub fn spawn(
        id: usize,
        transport: Arc<dyn RestoreTransport>,
        queue_rx: QueueReceiver,
        abort: Arc<AtomicBool>,
    ) -> Result<Self, WorkerError> {
        let handle = thread::Builder::new()
            .name(format!("restore-{}", id))
            .spawn(move || worker_loop(id, transport, queue_rx, abort))
            .map_err(|e| WorkerError::SpawnFailed {
                id,
                reason: e.to_string(),
            })?;

        Ok(Self {
            id,
            handle: Some(handle),
        })
    }

    /// Get worker ID
    pub fn id(&self) -> usize {
        self.id
    }

    /// Wait for the worker to finish
    pub fn join(mut self) -> Result<WorkerReport, WorkerError> {
        match self.handle.take() {
            Some(handle) => handle.join().map_err(|panic| WorkerError::Panicked {
                id: self.id,
                message: panic_message(panic.as_ref()),
            }),
            None => Ok(WorkerReport {
                id: self.id,
                ..Default::default()
            }),
        }
    }
}

/// Main worker loop
fn worker_loop(
    id: usize,
    transport: Arc<dyn RestoreTransport>,
    queue_rx: QueueReceiver,
    abort: Arc<AtomicBool>,
) -> WorkerReport {
    debug!(worker = id, "Worker starting");

    let mut report = WorkerReport {
        id,
        ..Default::default()
    };

    while let Some(record) = queue_rx.recv() {
        if abort.load(Ordering::SeqCst) {
            debug!(worker = id, "Run aborted, dropping remaining records");
            break;
        }

        info!(worker = id, path = %record.path, "Restoring");
        let outcome = transport.submit(&record);
        report.submitted += 1;

        match outcome {
            RestoreOutcome::Success => {
                debug!(worker = id, path = %record.path, "Restored");
            }
            RestoreOutcome::Failed { reason } => {
                report.failed += 1;
                warn!(worker = id, path = %record.path, reason = %reason, "Restore failed");
            }
        }
    }

    debug!(
        worker = id,
        submitted = report.submitted,
        failed = report.failed,
        "Worker shutting down"
    );

    report
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "Worker thread panicked".into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archive::ArchiveRecord;
    use crate::error::SubmitFailure;
    use crate::restore::queue::HandoffQueue;
    use std::sync::Mutex;

    /// Fails every path that starts with "bad"
    #[derive(Default)]
    struct PickyTransport {
        seen: Mutex<Vec<String>>,
    }

    impl RestoreTransport for PickyTransport {
        fn submit(&self, record: &ArchiveRecord) -> RestoreOutcome {
            self.seen.lock().unwrap().push(record.path.clone());
            if record.path.starts_with("bad") {
                RestoreOutcome::Failed {
                    reason: SubmitFailure::Transport("refused".into()),
                }
            } else {
                RestoreOutcome::Success
            }
        }
    }

    #[test]
    fn test_worker_continues_after_failure() {
        let transport = Arc::new(PickyTransport::default());
        let (tx, rx) = HandoffQueue::new(8).split();
        for path in ["bad/1", "good/2", "bad/3", "good/4"] {
            tx.send(ArchiveRecord::new(path, "{}").unwrap()).unwrap();
        }
        tx.close();

        let worker = Worker::spawn(7, transport.clone(), rx, Arc::new(AtomicBool::new(false)))
            .unwrap();
        assert_eq!(worker.id(), 7);
        let report = worker.join().unwrap();

        assert_eq!(
            report,
            WorkerReport {
                id: 7,
                submitted: 4,
                failed: 2
            }
        );
        assert_eq!(
            *transport.seen.lock().unwrap(),
            vec!["bad/1", "good/2", "bad/3", "good/4"]
        );
    }

    #[test]
    fn test_worker_stops_when_aborted() {
        let transport = Arc::new(PickyTransport::default());
        let (tx, rx) = HandoffQueue::new(8).split();
        tx.send(ArchiveRecord::new("good/1", "{}").unwrap()).unwrap();
        tx.close();

        let worker = Worker::spawn(0, transport.clone(), rx, Arc::new(AtomicBool::new(true)))
            .unwrap();
        let report = worker.join().unwrap();

        assert_eq!(report.submitted, 0);
        assert!(transport.seen.lock().unwrap().is_empty());
    }

    #[derive(Clone, Default)]
    struct LogBuffer(Arc<Mutex<Vec<u8>>>);

    impl std::io::Write for LogBuffer {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_each_record_is_logged_at_info() {
        let logs = LogBuffer::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::INFO)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();

        let transport: Arc<dyn RestoreTransport> = Arc::new(PickyTransport::default());
        let (tx, rx) = HandoffQueue::new(4).split();
        tx.send(ArchiveRecord::new("good/1.txt", "{}").unwrap()).unwrap();
        tx.close();

        let report = tracing::subscriber::with_default(subscriber, || {
            worker_loop(3, transport, rx, Arc::new(AtomicBool::new(false)))
        });
        assert_eq!(report.submitted, 1);

        let text = String::from_utf8(logs.0.lock().unwrap().clone()).unwrap();
        let line = text
            .lines()
            .find(|l| l.contains("Restoring"))
            .expect("no Restoring line");
        assert!(line.contains("INFO"), "{}", line);
        assert!(line.contains("good/1.txt"), "{}", line);
    }

    #[test]
    fn test_panic_message() {
        let boxed: Box<dyn std::any::Any + Send> = Box::new("boom");
        assert_eq!(panic_message(boxed.as_ref()), "boom");
        let boxed: Box<dyn std::any::Any + Send> = Box::new(String::from("bang"));
        assert_eq!(panic_message(boxed.as_ref()), "bang");
    }
}
