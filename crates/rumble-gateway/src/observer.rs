//! A connected observer and its outbound queue.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

/// What a connection is allowed to do. Chosen by the endpoint the
/// connection arrived on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Capability {
    /// May enroll; receives public events.
    Participant,
    /// Never a participant; additionally receives admin log entries.
    Admin,
}

pub(crate) struct Observer {
    pub(crate) capability: Capability,
    tx: mpsc::Sender<Arc<String>>,
    dropped: AtomicU64,
}

impl Observer {
    pub(crate) fn new(capability: Capability, tx: mpsc::Sender<Arc<String>>) -> Self {
        Self {
            capability,
            tx,
            dropped: AtomicU64::new(0),
        }
    }

    /// Queues a message without waiting. Returns `false` and counts a drop
    /// when the queue is full or closed.
    pub(crate) fn send(&self, message: Arc<String>) -> bool {
        if self.tx.try_send(message).is_ok() {
            true
        } else {
            self.dropped.fetch_add(1, Ordering::Relaxed);
            false
        }
    }

    pub(crate) fn drop_count(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}
