//! Rumble — round narration bounded context.
//!
//! Responsible for drawing a round's narrative plan (encounter pairs and
//! winner), producing one line per plan slot through the external narrator,
//! and falling back to the event description when the narrator fails.

pub mod application;
pub mod domain;
