//! Domain model for the round lifecycle context.

pub mod commands;
pub mod round;
