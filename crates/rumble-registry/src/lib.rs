//! Rumble — Participant Registry bounded context.
//!
//! Responsible for the set of currently connected identities, their
//! enrollment state and display names, and hourly unique-player counts.

pub mod domain;

pub use domain::registry::ParticipantRegistry;
pub use domain::stats::HourlyPlayerStats;
