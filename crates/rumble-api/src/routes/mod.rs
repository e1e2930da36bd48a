//! Route modules organized by concern.

pub mod admin;
pub mod health;
pub mod round;
pub mod ws;
