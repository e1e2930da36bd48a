//! Shared test doubles and utilities for the Rumble arena server.

mod clock;
mod narrator;
mod rng;
mod sink;

pub use clock::FixedClock;
pub use narrator::{FailingNarrator, HangingNarrator, ScriptedNarrator};
pub use rng::{MockRng, SequenceRng};
pub use sink::RecordingEventSink;
