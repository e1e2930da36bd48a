//! Test sink — records every published event.

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use rumble_core::event::{EventSink, ServerEvent};
use rumble_core::state::RoundState;

/// An `EventSink` that records all published events in order.
#[derive(Debug, Default)]
pub struct RecordingEventSink {
    events: Mutex<Vec<ServerEvent>>,
    disconnects: AtomicUsize,
}

impl RecordingEventSink {
    /// Creates an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a snapshot of every event published so far.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn events(&self) -> Vec<ServerEvent> {
        self.events.lock().unwrap().clone()
    }

    /// Returns the published events of the given wire type.
    pub fn of_type(&self, event_type: &str) -> Vec<ServerEvent> {
        self.events()
            .into_iter()
            .filter(|e| e.event_type() == event_type)
            .collect()
    }

    /// Countdown values in broadcast order.
    pub fn countdown_values(&self) -> Vec<u32> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                ServerEvent::Countdown { remaining_seconds } => Some(remaining_seconds),
                _ => None,
            })
            .collect()
    }

    /// Narrative lines in broadcast order.
    pub fn narrative_lines(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                ServerEvent::NarrativeLine { text } => Some(text),
                _ => None,
            })
            .collect()
    }

    /// The state carried by the most recent snapshot.
    pub fn last_snapshot_state(&self) -> Option<RoundState> {
        self.events().into_iter().rev().find_map(|e| match e {
            ServerEvent::PlayersUpdate { state, .. } => Some(state),
            _ => None,
        })
    }

    /// Number of snapshots published so far.
    pub fn snapshot_count(&self) -> usize {
        self.events().iter().filter(|e| e.is_snapshot()).count()
    }

    /// Number of `disconnect_participants` calls.
    pub fn disconnect_count(&self) -> usize {
        self.disconnects.load(Ordering::SeqCst)
    }

    /// Forgets every recorded event.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn clear(&self) {
        self.events.lock().unwrap().clear();
    }
}

impl EventSink for RecordingEventSink {
    fn publish(&self, event: &ServerEvent) {
        self.events.lock().unwrap().push(event.clone());
    }

    fn disconnect_participants(&self) {
        self.disconnects.fetch_add(1, Ordering::SeqCst);
    }
}
