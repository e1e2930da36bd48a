//! Administrative commands and their outcomes.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A privileged override of the round lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdminCommand {
    /// End the current round immediately with no winner.
    ForceEnd,
    /// Clear all state and return to `WAITING`.
    Reset,
    /// Disconnect every participant.
    KickAll,
    /// Skip the rest of an active countdown.
    StartNow,
}

impl AdminCommand {
    /// Kebab-case name, matching the admin route segment.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ForceEnd => "force-end",
            Self::Reset => "reset",
            Self::KickAll => "kick-all",
            Self::StartNow => "start-round",
        }
    }
}

impl fmt::Display for AdminCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of an administrative command, returned to the caller verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminOutcome {
    /// Whether the command took effect.
    pub success: bool,
    /// Human-readable message.
    pub message: String,
}

impl AdminOutcome {
    /// A successful outcome.
    #[must_use]
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }

    /// A rejected outcome.
    #[must_use]
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}
