//! Application services for the round lifecycle context.

pub mod admin;
pub mod clock;
pub mod orchestrator;
pub mod service;
