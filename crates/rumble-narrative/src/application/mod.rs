//! Application services for the narration context.

pub mod narration;
pub mod openai;
