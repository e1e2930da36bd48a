//! Administrative overrides of the round lifecycle.
//!
//! Each command goes through the same transition rules as timer-driven
//! changes and publishes exactly one snapshot when done.

use rumble_core::event::{LogCategory, ServerEvent};
use rumble_core::state::RoundState;
use tracing::{info, warn};

use super::orchestrator::RoundOrchestrator;
use crate::domain::commands::{AdminCommand, AdminOutcome};

const FORCED_END_MESSAGE: &str = "Round forcefully ended by admin";
const RESET_ANNOUNCEMENT: &str = "Game has been reset by admin";

impl RoundOrchestrator {
    /// Dispatches an admin command.
    pub fn apply_admin(&mut self, command: AdminCommand) -> AdminOutcome {
        info!(command = %command, state = %self.round.state(), "admin command");
        match command {
            AdminCommand::ForceEnd => self.force_end(),
            AdminCommand::Reset => self.reset(),
            AdminCommand::KickAll => self.kick_all(),
            AdminCommand::StartNow => self.start_now(),
        }
    }

    /// Ends the current round immediately with no winner, from any state.
    /// The usual `GAME_OVER` cooldown follows.
    pub fn force_end(&mut self) -> AdminOutcome {
        self.halt_round();
        self.round.force_end();

        warn!(round = self.round.sequence(), "round forcefully ended");
        self.publish(ServerEvent::RoundEnded {
            message: FORCED_END_MESSAGE.to_owned(),
            winner: None,
        });
        self.admin_log(LogCategory::Admin, "Round forcefully ended");
        self.schedule_cooldown();
        self.publish_snapshot();
        AdminOutcome::success("Round ended successfully")
    }

    /// Cancels every timer, forgets every participant and returns the round
    /// to `WAITING`. Observers stay connected; they must reconnect to take
    /// part again.
    pub fn reset(&mut self) -> AdminOutcome {
        self.halt_round();
        let removed = self.registry.clear();
        self.round.reset();

        warn!(removed, "game reset");
        self.publish(ServerEvent::Announcement {
            message: RESET_ANNOUNCEMENT.to_owned(),
        });
        self.admin_log(LogCategory::Admin, "Game state reset");
        self.publish_snapshot();
        AdminOutcome::success("Game reset successfully")
    }

    /// Disconnects every participant. A running round keeps its roster.
    pub fn kick_all(&mut self) -> AdminOutcome {
        let removed = self.registry.clear();
        self.sink.disconnect_participants();

        warn!(removed, "all participants kicked");
        self.admin_log(
            LogCategory::Admin,
            format!("All players kicked ({removed} disconnected)"),
        );
        self.reevaluate_eligibility();
        self.publish_snapshot();
        AdminOutcome::success("All players kicked successfully")
    }

    /// Skips the rest of an active countdown.
    pub fn start_now(&mut self) -> AdminOutcome {
        if self.round.state() != RoundState::Countdown {
            return AdminOutcome::failure("No active round to start");
        }
        self.timers.cancel_countdown();
        self.countdown_remaining = None;

        self.admin_log(LogCategory::Admin, "Round started by admin");
        self.begin_commencing();
        self.publish_snapshot();
        AdminOutcome::success("Round started successfully")
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use rumble_core::participant::ParticipantId;

    use super::*;
    use crate::application::orchestrator::tests::{enroll_pair, orchestrator, run_for};

    fn secs(value: f64) -> Duration {
        Duration::from_secs_f64(value)
    }

    #[tokio::test(start_paused = true)]
    async fn test_force_end_during_combat_has_no_winner_then_cools_down() {
        // Arrange
        let (mut orch, mut rx, sink) = orchestrator();
        let (alice, bob) = enroll_pair(&mut orch);
        run_for(&mut orch, &mut rx, secs(184.5)).await;
        assert_eq!(orch.status().state, RoundState::InProgress);
        let lines_before = sink.narrative_lines().len();

        // Act
        let outcome = orch.apply_admin(AdminCommand::ForceEnd);

        // Assert
        assert!(outcome.success);
        let status = orch.status();
        assert_eq!(status.state, RoundState::GameOver);
        assert!(status.winner.is_none());
        assert_eq!(
            sink.of_type("roundEnded").last(),
            Some(&ServerEvent::RoundEnded {
                message: FORCED_END_MESSAGE.into(),
                winner: None,
            })
        );

        run_for(&mut orch, &mut rx, secs(5.5)).await;
        assert_eq!(sink.narrative_lines().len(), lines_before);
        // Forced ends keep enrollment, so the next countdown starts at once
        assert_eq!(orch.status().state, RoundState::Countdown);
        assert!(orch.status().players.iter().any(|p| p.identity == alice && p.enrolled));
        assert!(orch.status().players.iter().any(|p| p.identity == bob && p.enrolled));
    }

    #[tokio::test(start_paused = true)]
    async fn test_force_end_during_countdown_stops_ticks() {
        // Arrange
        let (mut orch, mut rx, sink) = orchestrator();
        enroll_pair(&mut orch);
        run_for(&mut orch, &mut rx, secs(5.5)).await;
        let ticks = sink.countdown_values().len();

        // Act
        orch.force_end();

        // Assert
        assert_eq!(orch.status().state, RoundState::GameOver);
        assert!(orch.status().winner.is_none());
        assert!(orch.status().countdown_remaining.is_none());
        run_for(&mut orch, &mut rx, secs(4.0)).await;
        assert_eq!(sink.countdown_values().len(), ticks);
        assert_eq!(orch.status().state, RoundState::GameOver);
        run_for(&mut orch, &mut rx, secs(1.5)).await;
        assert_ne!(orch.status().state, RoundState::GameOver);
    }

    #[tokio::test(start_paused = true)]
    async fn test_force_end_in_waiting_still_returns_to_waiting_after_cooldown() {
        let (mut orch, mut rx, sink) = orchestrator();

        orch.force_end();
        assert_eq!(orch.status().state, RoundState::GameOver);
        run_for(&mut orch, &mut rx, secs(5.5)).await;

        assert_eq!(orch.status().state, RoundState::Waiting);
        assert_eq!(sink.last_snapshot_state(), Some(RoundState::Waiting));
    }

    #[tokio::test(start_paused = true)]
    async fn test_force_end_twice_leaves_sequence_and_winner_unchanged() {
        let (mut orch, mut rx, _sink) = orchestrator();
        enroll_pair(&mut orch);
        run_for(&mut orch, &mut rx, secs(182.5)).await;

        orch.force_end();
        let first = orch.status();
        orch.force_end();
        let second = orch.status();

        assert_eq!(first.round_sequence, second.round_sequence);
        assert_eq!(second.state, RoundState::GameOver);
        assert!(second.winner.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_reset_mid_combat_stops_narration_and_clears_registry() {
        // Arrange
        let (mut orch, mut rx, sink) = orchestrator();
        enroll_pair(&mut orch);
        run_for(&mut orch, &mut rx, secs(184.5)).await;
        let lines_before = sink.narrative_lines().len();

        // Act
        let outcome = orch.reset();
        run_for(&mut orch, &mut rx, secs(30.0)).await;

        // Assert
        assert!(outcome.success);
        let status = orch.status();
        assert_eq!(status.state, RoundState::Waiting);
        assert!(status.players.is_empty());
        assert!(status.roster.is_empty());
        assert_eq!(status.round_sequence, 1);
        assert_eq!(sink.narrative_lines().len(), lines_before);
        assert!(sink.of_type("roundEnded").is_empty());
        assert_eq!(sink.of_type("announcement").len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_enroll_after_reset_requires_reconnect() {
        let (mut orch, _rx, _sink) = orchestrator();
        let (alice, _bob) = enroll_pair(&mut orch);
        orch.reset();

        assert!(orch.enroll(alice, "Alice").is_err());
        orch.connect(alice).unwrap();
        assert!(orch.enroll(alice, "Alice").is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn test_kick_all_publishes_one_snapshot_and_cancels_countdown() {
        // Arrange
        let (mut orch, mut rx, sink) = orchestrator();
        enroll_pair(&mut orch);
        run_for(&mut orch, &mut rx, secs(3.5)).await;
        sink.clear();

        // Act
        let outcome = orch.kick_all();

        // Assert
        assert!(outcome.success);
        assert_eq!(sink.snapshot_count(), 1);
        assert_eq!(sink.disconnect_count(), 1);
        assert_eq!(sink.last_snapshot_state(), Some(RoundState::Waiting));
        assert!(orch.status().players.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_kick_all_during_combat_keeps_the_roster() {
        let (mut orch, mut rx, _sink) = orchestrator();
        enroll_pair(&mut orch);
        run_for(&mut orch, &mut rx, secs(182.5)).await;

        orch.kick_all();
        run_for(&mut orch, &mut rx, secs(10.0)).await;

        let status = orch.status();
        assert_eq!(status.state, RoundState::GameOver);
        assert_eq!(status.roster.len(), 2);
        assert!(status.winner.is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_now_skips_remaining_countdown() {
        // Arrange
        let (mut orch, mut rx, sink) = orchestrator();
        enroll_pair(&mut orch);
        run_for(&mut orch, &mut rx, secs(20.5)).await;

        // Act
        let outcome = orch.apply_admin(AdminCommand::StartNow);

        // Assert
        assert!(outcome.success);
        assert_eq!(orch.status().state, RoundState::Commencing);
        let ticks = sink.countdown_values().len();
        run_for(&mut orch, &mut rx, secs(2.5)).await;
        assert_eq!(orch.status().state, RoundState::InProgress);
        assert_eq!(sink.countdown_values().len(), ticks);
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_now_without_countdown_fails() {
        let (mut orch, _rx, sink) = orchestrator();
        let alice = ParticipantId::new();
        orch.connect(alice).unwrap();
        sink.clear();

        let outcome = orch.start_now();

        assert_eq!(outcome, AdminOutcome::failure("No active round to start"));
        assert_eq!(orch.status().state, RoundState::Waiting);
        assert!(sink.events().is_empty());
    }
}
