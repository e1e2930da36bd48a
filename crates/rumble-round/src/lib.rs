//! Rumble — round lifecycle orchestration bounded context.
//!
//! Responsible for the round state machine: when enrollment opens, how
//! join/leave events interact with a pending or running round, how timers
//! drive transitions, and what gets broadcast at each step. Administrative
//! overrides enter through the same transition table.

pub mod application;
pub mod domain;

pub use application::clock::RoundClock;
pub use application::orchestrator::{Collaborators, RoundOrchestrator, RoundStatus, RoundTimings};
pub use application::service::{RoundHandle, RoundService};
pub use domain::commands::{AdminCommand, AdminOutcome};
