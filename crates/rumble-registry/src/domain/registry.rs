//! The participant registry.

use rumble_core::error::ValidationError;
use rumble_core::participant::{Contender, ParticipantId, ParticipantView};
use tracing::debug;

use super::participant::{Participant, normalize_name};

/// The set of currently connected participants, in insertion order.
#[derive(Debug, Default)]
pub struct ParticipantRegistry {
    participants: Vec<Participant>,
}

impl ParticipantRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn position(&self, id: ParticipantId) -> Option<usize> {
        self.participants.iter().position(|p| p.id == id)
    }

    /// Inserts an unenrolled participant.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::DuplicateIdentity` if `id` is already present.
    pub fn add_participant(&mut self, id: ParticipantId) -> Result<(), ValidationError> {
        if self.contains(id) {
            return Err(ValidationError::DuplicateIdentity(id));
        }
        self.participants.push(Participant::new(id));
        debug!(participant = %id, total = self.participants.len(), "participant registered");
        Ok(())
    }

    /// Enrolls `id` under `name`. Callers must re-evaluate round eligibility
    /// afterwards. Returns the normalized name.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::UnknownParticipant` if `id` is not registered,
    /// `ValidationError::AlreadyEnrolled` if it already holds a name,
    /// `ValidationError::NameTooShort` for names under three characters, and
    /// `ValidationError::NameTaken` if another connected participant holds it.
    pub fn set_name(&mut self, id: ParticipantId, name: &str) -> Result<String, ValidationError> {
        let index = self
            .position(id)
            .ok_or(ValidationError::UnknownParticipant(id))?;
        if self.participants[index].is_enrolled() {
            return Err(ValidationError::AlreadyEnrolled(id));
        }
        let name = normalize_name(name)?;
        if self
            .participants
            .iter()
            .any(|p| p.id != id && p.name() == Some(name.as_str()))
        {
            return Err(ValidationError::NameTaken(name));
        }
        self.participants[index].name = Some(name.clone());
        Ok(name)
    }

    /// Unenrolls `id`. Returns the name it held, or `None` if it was not
    /// registered or not enrolled.
    pub fn clear_name(&mut self, id: ParticipantId) -> Option<String> {
        let index = self.position(id)?;
        self.participants[index].name.take()
    }

    /// Unenrolls every participant. Returns how many were enrolled.
    pub fn clear_all_names(&mut self) -> usize {
        self.participants
            .iter_mut()
            .filter_map(|p| p.name.take())
            .count()
    }

    /// Deletes `id` entirely.
    pub fn remove(&mut self, id: ParticipantId) -> Option<Participant> {
        let index = self.position(id)?;
        Some(self.participants.remove(index))
    }

    /// Deletes every participant. Returns how many were removed.
    pub fn clear(&mut self) -> usize {
        let removed = self.participants.len();
        self.participants.clear();
        removed
    }

    /// Whether `id` is registered.
    #[must_use]
    pub fn contains(&self, id: ParticipantId) -> bool {
        self.position(id).is_some()
    }

    /// Looks up a participant.
    #[must_use]
    pub fn get(&self, id: ParticipantId) -> Option<&Participant> {
        self.participants.iter().find(|p| p.id == id)
    }

    /// Immutable ordered view of every participant.
    #[must_use]
    pub fn snapshot(&self) -> Vec<ParticipantView> {
        self.participants.iter().map(Participant::to_view).collect()
    }

    /// The enrolled subset, in insertion order.
    #[must_use]
    pub fn enrolled_list(&self) -> Vec<Contender> {
        self.participants
            .iter()
            .filter_map(Participant::to_contender)
            .collect()
    }

    /// Number of enrolled participants.
    #[must_use]
    pub fn enrolled_count(&self) -> usize {
        self.participants.iter().filter(|p| p.is_enrolled()).count()
    }

    /// Number of registered participants.
    #[must_use]
    pub fn len(&self) -> usize {
        self.participants.len()
    }

    /// Whether no participant is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.participants.is_empty()
    }
}
