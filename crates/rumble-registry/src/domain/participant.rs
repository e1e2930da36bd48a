//! The participant entity.

use rumble_core::error::ValidationError;
use rumble_core::participant::{Contender, ParticipantId, ParticipantView};

/// Minimum display-name length, in characters.
pub const MIN_NAME_LEN: usize = 3;

/// A connected participant. Enrolled exactly when a display name is set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Participant {
    /// Connection identity.
    pub id: ParticipantId,
    /// Display name for the current enrollment cycle.
    pub(crate) name: Option<String>,
}

impl Participant {
    /// Creates an unenrolled participant.
    #[must_use]
    pub fn new(id: ParticipantId) -> Self {
        Self { id, name: None }
    }

    /// Current display name.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Whether the participant is enrolled.
    #[must_use]
    pub fn is_enrolled(&self) -> bool {
        self.name.is_some()
    }

    /// Broadcast view.
    #[must_use]
    pub fn to_view(&self) -> ParticipantView {
        ParticipantView {
            identity: self.id,
            name: self.name.clone(),
            enrolled: self.is_enrolled(),
        }
    }

    /// Roster entry, if enrolled.
    #[must_use]
    pub fn to_contender(&self) -> Option<Contender> {
        self.name.as_ref().map(|name| Contender {
            identity: self.id,
            name: name.clone(),
        })
    }
}

/// Normalizes a requested display name.
///
/// Surrounding whitespace is dropped; length is counted in characters.
///
/// # Errors
///
/// Returns `ValidationError::NameTooShort` if fewer than `MIN_NAME_LEN`
/// characters remain.
pub fn normalize_name(raw: &str) -> Result<String, ValidationError> {
    let name = raw.trim();
    if name.chars().count() < MIN_NAME_LEN {
        return Err(ValidationError::NameTooShort { min: MIN_NAME_LEN });
    }
    Ok(name.to_owned())
}
