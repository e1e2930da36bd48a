//! Fail-open narration.
//!
//! Every plan slot must yield exactly one broadcastable line. A failing or
//! slow narrator is replaced by the event description itself.

use std::time::Duration;

use async_trait::async_trait;
use rumble_core::error::RoundError;
use rumble_core::narrator::Narrator;
use tracing::{debug, warn};

/// Asks `narrator` for a line, waiting at most `timeout`. On failure or
/// timeout the prompt is returned verbatim.
pub async fn narrate_or_fallback(narrator: &dyn Narrator, prompt: &str, timeout: Duration) -> String {
    match tokio::time::timeout(timeout, narrator.generate_line(prompt)).await {
        Ok(Ok(line)) => {
            debug!(prompt, "narrator produced line");
            line
        }
        Ok(Err(error)) => {
            warn!(prompt, %error, "narrator failed, falling back to prompt");
            prompt.to_owned()
        }
        Err(_) => {
            let error = RoundError::CollaboratorFailure(format!(
                "no answer within {}ms",
                timeout.as_millis()
            ));
            warn!(prompt, %error, "narrator timed out, falling back to prompt");
            prompt.to_owned()
        }
    }
}

/// Narrator used when no text-generation service is configured: every
/// line is its own event description.
#[derive(Debug, Clone, Copy, Default)]
pub struct PromptEchoNarrator;

#[async_trait]
impl Narrator for PromptEchoNarrator {
    async fn generate_line(&self, prompt: &str) -> Result<String, RoundError> {
        Ok(prompt.to_owned())
    }
}
