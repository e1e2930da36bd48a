//! Round lifecycle states.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The phase a round is in. The machine cycles indefinitely; there is no
/// terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RoundState {
    /// No countdown active, enrollment open.
    #[default]
    Waiting,
    /// Countdown running, enrollment still open.
    Countdown,
    /// Countdown elapsed, short delay before combat, enrollment closed.
    Commencing,
    /// Narrative playback in progress, enrollment closed.
    InProgress,
    /// Winner decided, short delay before returning to `Waiting`.
    GameOver,
}

impl RoundState {
    /// Whether participants may enroll in this state.
    #[must_use]
    pub fn enrollment_open(self) -> bool {
        !matches!(self, Self::Commencing | Self::InProgress)
    }

    /// Wire name of the state.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Waiting => "WAITING",
            Self::Countdown => "COUNTDOWN",
            Self::Commencing => "COMMENCING",
            Self::InProgress => "IN_PROGRESS",
            Self::GameOver => "GAME_OVER",
        }
    }
}

impl fmt::Display for RoundState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
