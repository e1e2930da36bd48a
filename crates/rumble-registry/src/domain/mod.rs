//! Domain model for the Participant Registry context.

pub mod participant;
pub mod registry;
pub mod stats;
