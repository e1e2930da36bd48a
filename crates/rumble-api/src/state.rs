//! Shared application state.

use std::sync::Arc;

use rumble_gateway::BroadcastGateway;
use rumble_round::RoundHandle;

/// Application state shared across all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// Client of the round service task.
    pub round: RoundHandle,
    /// Fan-out to connected observers; also the round's event sink.
    pub gateway: Arc<BroadcastGateway>,
}

impl AppState {
    /// Create new application state.
    #[must_use]
    pub fn new(round: RoundHandle, gateway: Arc<BroadcastGateway>) -> Self {
        Self { round, gateway }
    }
}
