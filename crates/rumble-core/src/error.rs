//! Round lifecycle error types.

use thiserror::Error;

use crate::participant::ParticipantId;

/// A rejected participant request. Reported to the originating connection
/// only; never fatal.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// The identity is already registered.
    #[error("participant {0} is already registered")]
    DuplicateIdentity(ParticipantId),

    /// The identity is not (or no longer) registered.
    #[error("participant {0} is not connected")]
    UnknownParticipant(ParticipantId),

    /// The display name is shorter than the minimum length.
    #[error("name must be at least {min} characters")]
    NameTooShort {
        /// Minimum accepted length, in characters.
        min: usize,
    },

    /// Another connected participant already holds the display name.
    #[error("name '{0}' is already taken")]
    NameTaken(String),

    /// The participant already set a name this enrollment cycle.
    #[error("participant {0} is already enrolled")]
    AlreadyEnrolled(ParticipantId),
}

/// Top-level error type for the round lifecycle.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RoundError {
    /// A participant request failed validation.
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    /// The request is not legal in the current round state.
    #[error("state conflict: {0}")]
    StateConflict(String),

    /// A timer was armed while another timer chain was still alive.
    #[error("round clock is busy")]
    ClockBusy,

    /// The external narrative collaborator failed or timed out.
    #[error("narrative collaborator failure: {0}")]
    CollaboratorFailure(String),

    /// The round service task is no longer running.
    #[error("round service unavailable")]
    Unavailable,
}

impl RoundError {
    /// Returns `true` for internal invariant breaches that force the round
    /// back to `WAITING`.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::ClockBusy)
    }

    /// Machine-readable code used in rejection payloads and API bodies.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation(ValidationError::DuplicateIdentity(_)) => "duplicate_identity",
            Self::Validation(ValidationError::UnknownParticipant(_)) => "unknown_participant",
            Self::Validation(ValidationError::NameTooShort { .. }) => "name_too_short",
            Self::Validation(ValidationError::NameTaken(_)) => "name_taken",
            Self::Validation(ValidationError::AlreadyEnrolled(_)) => "already_enrolled",
            Self::StateConflict(_) => "state_conflict",
            Self::ClockBusy => "clock_busy",
            Self::CollaboratorFailure(_) => "collaborator_failure",
            Self::Unavailable => "unavailable",
        }
    }
}
