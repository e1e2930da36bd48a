//! Domain model for the narration context.

pub mod plan;
