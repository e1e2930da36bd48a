//! Test narrators — scripted `Narrator` implementations for tests.

use std::sync::Mutex;

use async_trait::async_trait;
use rumble_core::error::RoundError;
use rumble_core::narrator::Narrator;

/// A narrator that answers every prompt with `"{prefix}{prompt}"` and
/// records the prompts it was given.
#[derive(Debug)]
pub struct ScriptedNarrator {
    prefix: String,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedNarrator {
    /// Creates a narrator that prepends `prefix` to every prompt.
    #[must_use]
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Prompts received so far, in call order.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl Narrator for ScriptedNarrator {
    async fn generate_line(&self, prompt: &str) -> Result<String, RoundError> {
        self.prompts.lock().unwrap().push(prompt.to_owned());
        Ok(format!("{}{prompt}", self.prefix))
    }
}

/// A narrator that always fails.
#[derive(Debug)]
pub struct FailingNarrator;

#[async_trait]
impl Narrator for FailingNarrator {
    async fn generate_line(&self, _prompt: &str) -> Result<String, RoundError> {
        Err(RoundError::CollaboratorFailure("connection refused".into()))
    }
}

/// A narrator that never answers.
#[derive(Debug)]
pub struct HangingNarrator;

#[async_trait]
impl Narrator for HangingNarrator {
    async fn generate_line(&self, _prompt: &str) -> Result<String, RoundError> {
        std::future::pending().await
    }
}
