//! Rumble — Broadcast Gateway.
//!
//! Fans every event the round core emits out to connected observers,
//! caches the latest state snapshot for late joiners, and carries direct
//! replies to a single connection.

mod gateway;
mod observer;

pub use gateway::BroadcastGateway;
pub use observer::Capability;
