//! External narrative collaborator contract.

use async_trait::async_trait;

use crate::error::RoundError;

/// Turns an event description into one line of narration.
///
/// Calls may fail or hang; callers bound the wait and substitute the
/// prompt verbatim on failure.
#[async_trait]
pub trait Narrator: Send + Sync {
    /// Generates a line for `prompt`.
    ///
    /// # Errors
    ///
    /// Returns `RoundError::CollaboratorFailure` if the collaborator cannot
    /// produce a line.
    async fn generate_line(&self, prompt: &str) -> Result<String, RoundError>;
}
