//! Event fan-out to connected observers.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use rumble_core::event::{EventSink, ServerEvent};
use rumble_core::participant::ParticipantId;
use serde::Serialize;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::observer::{Capability, Observer};

/// Default per-observer queue length.
const DEFAULT_QUEUE_CAPACITY: usize = 256;

/// Fans events out to every connected observer.
///
/// Each observer gets a bounded queue drained by its connection's writer
/// task. Publishing never waits. An observer whose queue is full is
/// detached instead of being left with a gap in its stream. The gateway
/// holds the only sender for each queue, so detaching closes the
/// connection, and a reconnect starts again from the latest snapshot.
pub struct BroadcastGateway {
    observers: RwLock<HashMap<ParticipantId, Observer>>,
    latest_snapshot: RwLock<Option<Arc<String>>>,
    queue_capacity: usize,
    dropped_total: AtomicUsize,
}

impl BroadcastGateway {
    /// Creates a gateway with the default queue capacity.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_QUEUE_CAPACITY)
    }

    /// Creates a gateway whose observer queues hold `queue_capacity`
    /// messages.
    #[must_use]
    pub fn with_capacity(queue_capacity: usize) -> Self {
        Self {
            observers: RwLock::new(HashMap::new()),
            latest_snapshot: RwLock::new(None),
            queue_capacity: queue_capacity.max(1),
            dropped_total: AtomicUsize::new(0),
        }
    }

    /// Registers an observer and returns its message queue. The latest
    /// snapshot, if any, is queued first so the observer never starts
    /// without the current phase.
    pub fn attach(&self, id: ParticipantId, capability: Capability) -> mpsc::Receiver<Arc<String>> {
        let (tx, rx) = mpsc::channel(self.queue_capacity);
        let observer = Observer::new(capability, tx);

        // Held across the snapshot send so no publish can slip in between.
        let mut observers = self.observers.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(snapshot) = self.latest_snapshot() {
            observer.send(snapshot);
        }
        if observers.insert(id, observer).is_some() {
            warn!(observer = %id, "observer replaced an existing connection");
        }
        debug!(observer = %id, ?capability, observers = observers.len(), "observer attached");
        rx
    }

    /// Removes an observer, closing its queue. Returns whether it was
    /// attached.
    pub fn detach(&self, id: ParticipantId) -> bool {
        let removed = self
            .observers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&id);
        if let Some(observer) = &removed {
            debug!(observer = %id, dropped = observer.drop_count(), "observer detached");
        }
        removed.is_some()
    }

    /// Sends a message to one observer only. An observer that cannot take
    /// the message is detached.
    pub fn send_to(&self, id: ParticipantId, message: Arc<String>) -> bool {
        let mut observers = self.observers.write().unwrap_or_else(PoisonError::into_inner);
        let Some(observer) = observers.get(&id) else {
            return false;
        };
        let sent = observer.send(message);
        if !sent {
            self.dropped_total.fetch_add(1, Ordering::Relaxed);
            observers.remove(&id);
            warn!(observer = %id, "direct reply dropped, observer detached");
        }
        sent
    }

    /// Serializes `value` and sends it to one observer only.
    pub fn send_json<T: Serialize>(&self, id: ParticipantId, value: &T) -> bool {
        match serde_json::to_string(value) {
            Ok(json) => self.send_to(id, Arc::new(json)),
            Err(e) => {
                warn!(observer = %id, error = %e, "failed to serialize direct reply");
                false
            }
        }
    }

    /// Number of attached observers.
    #[must_use]
    pub fn observer_count(&self) -> usize {
        self.observers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Messages dropped across all observers since start-up.
    #[must_use]
    pub fn dropped_total(&self) -> usize {
        self.dropped_total.load(Ordering::Relaxed)
    }

    /// The most recent state snapshot, serialized.
    #[must_use]
    pub fn latest_snapshot(&self) -> Option<Arc<String>> {
        self.latest_snapshot
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Default for BroadcastGateway {
    fn default() -> Self {
        Self::new()
    }
}

/// Whether an observer with `capability` should receive `event`.
fn reaches(capability: Capability, event: &ServerEvent) -> bool {
    match event {
        ServerEvent::AdminLog { .. } => capability == Capability::Admin,
        _ => true,
    }
}

impl EventSink for BroadcastGateway {
    fn publish(&self, event: &ServerEvent) {
        let json = match serde_json::to_string(event) {
            Ok(json) => Arc::new(json),
            Err(e) => {
                warn!(event_type = event.event_type(), error = %e, "failed to serialize event");
                return;
            }
        };

        let mut observers = self.observers.write().unwrap_or_else(PoisonError::into_inner);
        if event.is_snapshot() {
            *self
                .latest_snapshot
                .write()
                .unwrap_or_else(PoisonError::into_inner) = Some(Arc::clone(&json));
        }

        let mut recipients = 0u32;
        observers.retain(|id, observer| {
            if !reaches(observer.capability, event) {
                return true;
            }
            recipients += 1;
            if observer.send(Arc::clone(&json)) {
                return true;
            }
            self.dropped_total.fetch_add(1, Ordering::Relaxed);
            warn!(
                observer = %id,
                event_type = event.event_type(),
                "observer fell behind, detaching"
            );
            false
        });
        debug!(event_type = event.event_type(), recipients, "broadcast event");
    }

    fn disconnect_participants(&self) {
        let mut observers = self.observers.write().unwrap_or_else(PoisonError::into_inner);
        let before = observers.len();
        observers.retain(|_, observer| observer.capability != Capability::Participant);
        debug!(disconnected = before - observers.len(), "participant observers disconnected");
    }
}
