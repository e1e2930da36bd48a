//! Rumble Core — shared round-lifecycle abstractions.
//!
//! This crate defines the identities, wire events, collaborator traits and
//! determinism seams that every other Rumble crate depends on. It contains
//! no timers, no transport and no I/O.

pub mod clock;
pub mod error;
pub mod event;
pub mod narrator;
pub mod participant;
pub mod rng;
pub mod state;
