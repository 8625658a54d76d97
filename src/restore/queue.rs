//! Handoff queue between the archive scan and the restore workers
//!
//! A crossbeam bounded channel with a single producer. Capacity 0 makes it
//! a rendezvous channel: the scan blocks until a worker is free to take the
//! record. This is the only place where backpressure is applied.
//!
//! Each record is received by exactly one worker. Dropping the sender
//! closes the queue; workers drain what is left and then see `None`.

use crate::archive::ArchiveRecord;
use crossbeam_channel::{bounded, Receiver, Sender};

/// Bounded single-producer, multi-consumer queue of records
pub struct HandoffQueue {
    /// Sender for adding records
    sender: Sender<ArchiveRecord>,

    /// Receiver for taking records
    receiver: Receiver<ArchiveRecord>,

    /// Queue capacity
    capacity: usize,
}

impl HandoffQueue {
    /// Create a new queue with the specified capacity
    pub fn new(capacity: usize) -> Self {
        let (sender, receiver) = bounded(capacity);

        Self {
            sender,
            receiver,
            capacity,
        }
    }

    /// Get queue capacity
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Split into the producer handle and a cloneable consumer handle
    pub fn split(self) -> (QueueSender, QueueReceiver) {
        (
            QueueSender {
                sender: self.sender,
            },
            QueueReceiver {
                receiver: self.receiver,
            },
        )
    }
}

/// Producer side, owned by the supervisor
pub struct QueueSender {
    sender: Sender<ArchiveRecord>,
}

impl QueueSender {
    /// Send a record, blocking until there is room
    ///
    /// Hands the record back if every receiver is gone.
    pub fn send(&self, record: ArchiveRecord) -> Result<(), ArchiveRecord> {
        self.sender.send(record).map_err(|e| e.into_inner())
    }

    /// Close the queue; workers finish what is buffered and exit
    pub fn close(self) {
        drop(self);
    }
}

/// Consumer side, one clone per worker
#[derive(Clone)]
pub struct QueueReceiver {
    receiver: Receiver<ArchiveRecord>,
}

impl QueueReceiver {
    /// Receive a record from the queue
    ///
    /// Blocks until a record is available. Returns `None` once the queue
    /// is closed and empty.
    pub fn recv(&self) -> Option<ArchiveRecord> {
        self.receiver.recv().ok()
    }
}
