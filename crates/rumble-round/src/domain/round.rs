//! The round aggregate: current state, sequence number, captured roster,
//! winner and narrative log.
//!
//! Every transition is guarded by the current state. An illegal transition
//! is reported as `RoundError::StateConflict` and leaves the round untouched.

use rumble_core::error::RoundError;
use rumble_core::participant::Contender;
use rumble_core::state::RoundState;

/// Minimum number of enrolled participants needed to run a round.
pub const MIN_CONTENDERS: usize = 2;

/// The single live round.
#[derive(Debug, Clone, Default)]
pub struct Round {
    sequence: u64,
    state: RoundState,
    winner: Option<Contender>,
    roster: Vec<Contender>,
    narrative_log: Vec<String>,
}

impl Round {
    /// Creates a round in `WAITING` with sequence zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> RoundState {
        self.state
    }

    /// Number of rounds that have entered combat.
    #[must_use]
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    /// The winner, present only in `GAME_OVER` after a natural finish.
    #[must_use]
    pub fn winner(&self) -> Option<&Contender> {
        self.winner.as_ref()
    }

    /// Contenders captured when combat began.
    #[must_use]
    pub fn roster(&self) -> &[Contender] {
        &self.roster
    }

    /// Lines narrated so far this round.
    #[must_use]
    pub fn narrative_log(&self) -> &[String] {
        &self.narrative_log
    }

    fn guard(&self, allowed: &[RoundState], action: &str) -> Result<(), RoundError> {
        if allowed.contains(&self.state) {
            Ok(())
        } else {
            Err(RoundError::StateConflict(format!(
                "cannot {action} while the round is {}",
                self.state
            )))
        }
    }

    /// `WAITING` → `COUNTDOWN`.
    ///
    /// # Errors
    ///
    /// Returns `RoundError::StateConflict` outside `WAITING`.
    pub fn begin_countdown(&mut self) -> Result<(), RoundError> {
        self.guard(&[RoundState::Waiting], "begin a countdown")?;
        self.state = RoundState::Countdown;
        Ok(())
    }

    /// `COUNTDOWN` → `WAITING` when eligibility is lost.
    ///
    /// # Errors
    ///
    /// Returns `RoundError::StateConflict` outside `COUNTDOWN`.
    pub fn fall_back_to_waiting(&mut self) -> Result<(), RoundError> {
        self.guard(&[RoundState::Countdown], "cancel the countdown")?;
        self.state = RoundState::Waiting;
        Ok(())
    }

    /// `COUNTDOWN` → `COMMENCING`.
    ///
    /// # Errors
    ///
    /// Returns `RoundError::StateConflict` outside `COUNTDOWN`.
    pub fn commence(&mut self) -> Result<(), RoundError> {
        self.guard(&[RoundState::Countdown], "commence")?;
        self.state = RoundState::Commencing;
        Ok(())
    }

    /// `COMMENCING` → `WAITING` when too few contenders remain at the
    /// commence instant.
    ///
    /// # Errors
    ///
    /// Returns `RoundError::StateConflict` outside `COMMENCING`.
    pub fn abort_commencement(&mut self) -> Result<(), RoundError> {
        self.guard(&[RoundState::Commencing], "abort commencement")?;
        self.state = RoundState::Waiting;
        Ok(())
    }

    /// `COMMENCING` → `IN_PROGRESS`. Captures the roster, clears the
    /// previous narrative and increments the sequence.
    ///
    /// Returns the new sequence number.
    ///
    /// # Errors
    ///
    /// Returns `RoundError::StateConflict` outside `COMMENCING` or when the
    /// roster is smaller than [`MIN_CONTENDERS`].
    pub fn start_combat(&mut self, roster: Vec<Contender>) -> Result<u64, RoundError> {
        self.guard(&[RoundState::Commencing], "start combat")?;
        if roster.len() < MIN_CONTENDERS {
            return Err(RoundError::StateConflict(format!(
                "a round needs at least {MIN_CONTENDERS} contenders, got {}",
                roster.len()
            )));
        }
        self.sequence += 1;
        self.state = RoundState::InProgress;
        self.roster = roster;
        self.narrative_log.clear();
        self.winner = None;
        Ok(self.sequence)
    }

    /// Appends a narrated line.
    ///
    /// # Errors
    ///
    /// Returns `RoundError::StateConflict` outside `IN_PROGRESS`.
    pub fn record_line(&mut self, line: String) -> Result<(), RoundError> {
        self.guard(&[RoundState::InProgress], "record narration")?;
        self.narrative_log.push(line);
        Ok(())
    }

    /// `IN_PROGRESS` → `GAME_OVER` with a winner from the roster.
    ///
    /// # Errors
    ///
    /// Returns `RoundError::StateConflict` outside `IN_PROGRESS` or when the
    /// winner is not part of the captured roster.
    pub fn finish(&mut self, winner: Contender) -> Result<(), RoundError> {
        self.guard(&[RoundState::InProgress], "finish")?;
        if !self.roster.contains(&winner) {
            return Err(RoundError::StateConflict(format!(
                "winner '{}' is not in the round roster",
                winner.name
            )));
        }
        self.state = RoundState::GameOver;
        self.winner = Some(winner);
        Ok(())
    }

    /// Any state → `GAME_OVER` with no winner.
    pub fn force_end(&mut self) {
        self.state = RoundState::GameOver;
        self.winner = None;
    }

    /// `GAME_OVER` → `WAITING` after the cooldown. Clears winner, roster and
    /// narrative.
    ///
    /// # Errors
    ///
    /// Returns `RoundError::StateConflict` outside `GAME_OVER`.
    pub fn return_to_waiting(&mut self) -> Result<(), RoundError> {
        self.guard(&[RoundState::GameOver], "return to waiting")?;
        self.clear_round_data();
        Ok(())
    }

    /// Any state → `WAITING`. The sequence number is kept.
    pub fn reset(&mut self) {
        self.clear_round_data();
    }

    fn clear_round_data(&mut self) {
        self.state = RoundState::Waiting;
        self.winner = None;
        self.roster.clear();
        self.narrative_log.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rumble_core::participant::ParticipantId;

    fn contender(name: &str) -> Contender {
        Contender {
            identity: ParticipantId::new(),
            name: name.to_owned(),
        }
    }

    fn in_progress(roster: Vec<Contender>) -> Round {
        let mut round = Round::new();
        round.begin_countdown().unwrap();
        round.commence().unwrap();
        round.start_combat(roster).unwrap();
        round
    }

    #[test]
    fn test_new_round_is_waiting_with_sequence_zero() {
        let round = Round::new();

        assert_eq!(round.state(), RoundState::Waiting);
        assert_eq!(round.sequence(), 0);
        assert!(round.winner().is_none());
        assert!(round.roster().is_empty());
    }

    #[test]
    fn test_full_cycle_increments_sequence_once() {
        // Arrange
        let alice = contender("Alice");
        let bob = contender("Bob");
        let mut round = in_progress(vec![alice.clone(), bob]);

        // Act
        round.record_line("Alice swings".into()).unwrap();
        round.finish(alice.clone()).unwrap();

        // Assert
        assert_eq!(round.state(), RoundState::GameOver);
        assert_eq!(round.sequence(), 1);
        assert_eq!(round.winner(), Some(&alice));
        assert_eq!(round.narrative_log(), ["Alice swings".to_owned()]);

        round.return_to_waiting().unwrap();
        assert_eq!(round.state(), RoundState::Waiting);
        assert!(round.winner().is_none());
        assert!(round.roster().is_empty());
        assert!(round.narrative_log().is_empty());
        assert_eq!(round.sequence(), 1);
    }

    #[test]
    fn test_commence_requires_countdown() {
        let mut round = Round::new();

        let result = round.commence();

        assert!(matches!(result, Err(RoundError::StateConflict(_))));
        assert_eq!(round.state(), RoundState::Waiting);
    }

    #[test]
    fn test_countdown_cannot_begin_twice() {
        let mut round = Round::new();
        round.begin_countdown().unwrap();

        let result = round.begin_countdown();

        assert!(matches!(result, Err(RoundError::StateConflict(_))));
    }

    #[test]
    fn test_start_combat_rejects_single_contender() {
        let mut round = Round::new();
        round.begin_countdown().unwrap();
        round.commence().unwrap();

        let result = round.start_combat(vec![contender("Solo")]);

        assert!(matches!(result, Err(RoundError::StateConflict(_))));
        assert_eq!(round.state(), RoundState::Commencing);
        assert_eq!(round.sequence(), 0);
    }

    #[test]
    fn test_finish_rejects_winner_outside_roster() {
        let mut round = in_progress(vec![contender("Alice"), contender("Bob")]);

        let result = round.finish(contender("Mallory"));

        assert!(matches!(result, Err(RoundError::StateConflict(_))));
        assert_eq!(round.state(), RoundState::InProgress);
    }

    #[test]
    fn test_winner_is_set_only_once() {
        let alice = contender("Alice");
        let mut round = in_progress(vec![alice.clone(), contender("Bob")]);
        round.finish(alice.clone()).unwrap();

        let result = round.finish(alice);

        assert!(matches!(result, Err(RoundError::StateConflict(_))));
    }

    #[test]
    fn test_record_line_outside_combat_is_rejected() {
        let mut round = Round::new();

        assert!(round.record_line("stray".into()).is_err());
        assert!(round.narrative_log().is_empty());
    }

    #[test]
    fn test_force_end_clears_winner_from_any_state() {
        let alice = contender("Alice");
        let mut round = in_progress(vec![alice.clone(), contender("Bob")]);
        round.finish(alice).unwrap();

        round.force_end();

        assert_eq!(round.state(), RoundState::GameOver);
        assert!(round.winner().is_none());
        assert_eq!(round.sequence(), 1);
    }

    #[test]
    fn test_abort_commencement_returns_to_waiting() {
        let mut round = Round::new();
        round.begin_countdown().unwrap();
        round.commence().unwrap();

        round.abort_commencement().unwrap();

        assert_eq!(round.state(), RoundState::Waiting);
        assert_eq!(round.sequence(), 0);
    }

    #[test]
    fn test_reset_keeps_sequence() {
        let mut round = in_progress(vec![contender("Alice"), contender("Bob")]);
        round.record_line("line".into()).unwrap();

        round.reset();

        assert_eq!(round.state(), RoundState::Waiting);
        assert_eq!(round.sequence(), 1);
        assert!(round.narrative_log().is_empty());
        assert!(round.roster().is_empty());
    }
}
