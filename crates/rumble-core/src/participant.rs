//! Participant identities and their read-only views.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque per-connection identity, issued when a connection is established.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParticipantId(Uuid);

impl ParticipantId {
    /// Issues a fresh random identity.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ParticipantId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// An enrolled participant as captured in a round roster or as a winner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contender {
    /// The participant identity.
    pub identity: ParticipantId,
    /// The display name chosen for this enrollment cycle.
    pub name: String,
}

/// Broadcast view of a registered participant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticipantView {
    /// The participant identity.
    pub identity: ParticipantId,
    /// The display name, if enrolled.
    pub name: Option<String>,
    /// Whether the participant is enrolled for the next round.
    pub enrolled: bool,
}
