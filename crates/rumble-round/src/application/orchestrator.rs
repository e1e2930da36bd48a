//! Round orchestrator — the state machine at the centre of the server.
//!
//! Owns the participant registry, the round aggregate and the round clock.
//! Every input (connection events, enrollment requests, timer reports and
//! admin commands) is applied here one at a time by the owning service
//! task, so no two transitions ever interleave.
//!
//! Each top-level handler publishes a state snapshot after its mutations
//! are done, one per resulting phase. Only the cooldown handler can pass
//! through two phases (`WAITING`, then straight into `COUNTDOWN`), so it
//! publishes both. Internal helpers never publish snapshots.

use std::sync::Arc;
use std::time::Duration;

use rumble_core::clock::Clock;
use rumble_core::error::RoundError;
use rumble_core::event::{EventSink, LogCategory, ServerEvent};
use rumble_core::narrator::Narrator;
use rumble_core::participant::{Contender, ParticipantId, ParticipantView};
use rumble_core::rng::DeterministicRng;
use rumble_core::state::RoundState;
use rumble_narrative::application::narration::narrate_or_fallback;
use rumble_narrative::domain::plan::NarrativePlan;
use rumble_registry::{HourlyPlayerStats, ParticipantRegistry};
use serde::Serialize;
use tokio::sync::mpsc;
use tracing::{debug, error, info};

use super::clock::{ClockEvent, ClockMessage, RoundClock};
use crate::domain::round::{MIN_CONTENDERS, Round};

/// Durations that drive the round lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoundTimings {
    /// Countdown length once two participants are enrolled.
    pub countdown_secs: u32,
    /// Delay between the countdown elapsing and combat starting.
    pub commence_delay: Duration,
    /// Pause between narrative lines.
    pub line_pacing: Duration,
    /// Delay between `GAME_OVER` and the return to `WAITING`.
    pub cooldown: Duration,
    /// Upper bound on a single narrator call.
    pub narrative_timeout: Duration,
}

impl Default for RoundTimings {
    fn default() -> Self {
        Self {
            countdown_secs: 180,
            commence_delay: Duration::from_millis(2000),
            line_pacing: Duration::from_millis(2000),
            cooldown: Duration::from_millis(5000),
            narrative_timeout: Duration::from_millis(8000),
        }
    }
}

/// Signals carried by the round clock's chains.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoundSignal {
    /// The commence delay elapsed.
    Commence,
    /// A narrative line is ready for broadcast.
    Line(String),
    /// Every planned line has been broadcast and paced.
    PlaybackFinished,
    /// The `GAME_OVER` cooldown elapsed.
    CooldownElapsed,
}

/// External collaborators the orchestrator publishes to and draws from.
pub struct Collaborators {
    /// Destination for every outbound event.
    pub sink: Arc<dyn EventSink>,
    /// Produces narrative lines.
    pub narrator: Arc<dyn Narrator>,
    /// Timestamps admin log entries and hourly stats.
    pub clock: Arc<dyn Clock>,
    /// Draws encounter pairs and winners.
    pub rng: Box<dyn DeterministicRng>,
}

/// Read-only view of the round for status queries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundStatus {
    pub state: RoundState,
    pub round_sequence: u64,
    pub winner: Option<Contender>,
    pub players: Vec<ParticipantView>,
    pub roster: Vec<Contender>,
    pub narrative_log: Vec<String>,
    pub countdown_remaining: Option<u32>,
}

/// The round state machine.
pub struct RoundOrchestrator {
    pub(crate) registry: ParticipantRegistry,
    pub(crate) stats: HourlyPlayerStats,
    pub(crate) round: Round,
    pub(crate) timers: RoundClock<RoundSignal>,
    pub(crate) pending_winner: Option<Contender>,
    pub(crate) countdown_remaining: Option<u32>,
    pub(crate) timings: RoundTimings,
    pub(crate) sink: Arc<dyn EventSink>,
    narrator: Arc<dyn Narrator>,
    clock: Arc<dyn Clock>,
    rng: Box<dyn DeterministicRng>,
}

impl RoundOrchestrator {
    /// Creates an orchestrator in `WAITING` with an empty registry, and the
    /// receiver its timers report to.
    #[must_use]
    pub fn new(
        timings: RoundTimings,
        collaborators: Collaborators,
    ) -> (Self, mpsc::UnboundedReceiver<ClockMessage<RoundSignal>>) {
        let (timers, clock_rx) = RoundClock::new();
        let orchestrator = Self {
            registry: ParticipantRegistry::new(),
            stats: HourlyPlayerStats::new(),
            round: Round::new(),
            timers,
            pending_winner: None,
            countdown_remaining: None,
            timings,
            sink: collaborators.sink,
            narrator: collaborators.narrator,
            clock: collaborators.clock,
            rng: collaborators.rng,
        };
        (orchestrator, clock_rx)
    }

    /// Current state and registry contents.
    #[must_use]
    pub fn status(&self) -> RoundStatus {
        RoundStatus {
            state: self.round.state(),
            round_sequence: self.round.sequence(),
            winner: self.round.winner().cloned(),
            players: self.registry.snapshot(),
            roster: self.round.roster().to_vec(),
            narrative_log: self.round.narrative_log().to_vec(),
            countdown_remaining: self.countdown_remaining,
        }
    }

    // ------------------------------------------------------------------
    // Connection events
    // ------------------------------------------------------------------

    /// Registers a new connection.
    ///
    /// # Errors
    ///
    /// Returns `RoundError::Validation` if the identity is already
    /// registered.
    pub fn connect(&mut self, id: ParticipantId) -> Result<(), RoundError> {
        self.registry.add_participant(id)?;
        let now = self.clock.now();
        self.stats.record(id, now);

        info!(participant = %id, connected = self.registry.len(), "participant connected");
        self.admin_log(LogCategory::Connection, format!("New client connected: {id}"));
        self.publish(ServerEvent::PlayerStats {
            hourly_stats: self.stats.hourly_counts(now),
        });
        self.publish_snapshot();
        Ok(())
    }

    /// Removes a closed connection. Unknown identities are ignored.
    pub fn disconnect(&mut self, id: ParticipantId) {
        let Some(participant) = self.registry.remove(id) else {
            debug!(participant = %id, "disconnect for unknown participant ignored");
            return;
        };

        info!(participant = %id, "participant disconnected");
        let label = participant.name().map_or_else(|| id.to_string(), ToOwned::to_owned);
        self.admin_log(LogCategory::Connection, format!("Client disconnected: {label}"));
        self.reevaluate_eligibility();
        self.publish_snapshot();
    }

    /// Enrolls a connected participant under `name`.
    ///
    /// # Errors
    ///
    /// Returns `RoundError::StateConflict` while the round is commencing or
    /// in progress, and `RoundError::Validation` for unknown identities,
    /// short or taken names, or a second enrollment.
    pub fn enroll(&mut self, id: ParticipantId, name: &str) -> Result<(), RoundError> {
        let state = self.round.state();
        if !state.enrollment_open() {
            return Err(RoundError::StateConflict(format!(
                "enrollment is closed while the round is {state}"
            )));
        }
        let name = self.registry.set_name(id, name)?;

        info!(participant = %id, name = %name, "participant enrolled");
        self.admin_log(LogCategory::Player, format!("{name} joined the game"));
        self.reevaluate_eligibility();
        self.publish_snapshot();
        Ok(())
    }

    /// Withdraws a participant's enrollment. A no-op when not enrolled.
    pub fn unenroll(&mut self, id: ParticipantId) {
        let Some(name) = self.registry.clear_name(id) else {
            return;
        };

        info!(participant = %id, name = %name, "participant unenrolled");
        self.admin_log(LogCategory::Player, format!("{name} left the game"));
        self.reevaluate_eligibility();
        self.publish_snapshot();
    }

    // ------------------------------------------------------------------
    // Timer reports
    // ------------------------------------------------------------------

    /// Applies a report from the round clock. Reports from cancelled timers
    /// are dropped.
    pub fn on_clock(&mut self, message: ClockMessage<RoundSignal>) {
        let Some(event) = self.timers.accept(message) else {
            return;
        };
        match event {
            ClockEvent::Tick { remaining } => self.on_countdown_tick(remaining),
            ClockEvent::Elapsed => self.on_countdown_elapsed(),
            ClockEvent::Step { signal, .. } => match signal {
                RoundSignal::Commence => self.on_commence(),
                RoundSignal::Line(text) => self.on_line(text),
                RoundSignal::PlaybackFinished => self.on_playback_finished(),
                RoundSignal::CooldownElapsed => self.on_cooldown_elapsed(),
            },
        }
    }

    fn on_countdown_tick(&mut self, remaining: u32) {
        self.countdown_remaining = Some(remaining);
        self.publish(ServerEvent::Countdown {
            remaining_seconds: remaining,
        });
    }

    fn on_countdown_elapsed(&mut self) {
        self.countdown_remaining = None;
        self.begin_commencing();
        self.publish_snapshot();
    }

    fn on_commence(&mut self) {
        let roster = self.registry.enrolled_list();
        if roster.len() < MIN_CONTENDERS {
            if let Err(err) = self.round.abort_commencement() {
                self.recover(&err);
            } else {
                info!(enrolled = roster.len(), "not enough contenders at commence");
                self.admin_log(
                    LogCategory::Game,
                    "Not enough players ready for this round. Waiting for next round...",
                );
            }
            self.reevaluate_eligibility();
            self.publish_snapshot();
            return;
        }

        self.start_combat(roster);
        self.publish_snapshot();
    }

    fn on_line(&mut self, text: String) {
        if let Err(err) = self.round.record_line(text.clone()) {
            debug!(error = %err, "narrative line outside combat dropped");
            return;
        }
        self.admin_log(LogCategory::Narrative, text.clone());
        self.publish(ServerEvent::NarrativeLine { text });
    }

    fn on_playback_finished(&mut self) {
        let Some(winner) = self.pending_winner.take() else {
            self.recover(&RoundError::StateConflict(
                "playback finished without a drawn winner".to_owned(),
            ));
            self.publish_snapshot();
            return;
        };
        if let Err(err) = self.round.finish(winner.clone()) {
            self.recover(&err);
            self.publish_snapshot();
            return;
        }

        let cleared = self.registry.clear_all_names();
        let sequence = self.round.sequence();
        info!(round = sequence, winner = %winner.name, unenrolled = cleared, "round over");
        self.publish(ServerEvent::RoundEnded {
            message: format!("Round {sequence} over! Join the battle for the next round!"),
            winner: Some(winner.clone()),
        });
        self.admin_log(
            LogCategory::Game,
            format!("Round {sequence} over - Winner: {}", winner.name),
        );
        self.schedule_cooldown();
        self.publish_snapshot();
    }

    fn on_cooldown_elapsed(&mut self) {
        if let Err(err) = self.round.return_to_waiting() {
            self.recover(&err);
            self.publish_snapshot();
            return;
        }
        info!(round = self.round.sequence(), "round reset, waiting for players");
        self.publish_snapshot();

        self.reevaluate_eligibility();
        if self.round.state() != RoundState::Waiting {
            self.publish_snapshot();
        }
    }

    // ------------------------------------------------------------------
    // Transitions shared by several handlers
    // ------------------------------------------------------------------

    /// Starts or abandons the countdown to match the enrolled count.
    pub(crate) fn reevaluate_eligibility(&mut self) {
        let enrolled = self.registry.enrolled_count();
        match self.round.state() {
            RoundState::Waiting if enrolled >= MIN_CONTENDERS => self.enter_countdown(),
            RoundState::Countdown if enrolled < MIN_CONTENDERS => self.abandon_countdown(),
            _ => {}
        }
    }

    fn enter_countdown(&mut self) {
        if let Err(err) = self.round.begin_countdown() {
            self.recover(&err);
            return;
        }
        if let Err(err) = self.timers.start_countdown(self.timings.countdown_secs) {
            self.recover(&err);
            return;
        }
        self.countdown_remaining = Some(self.timings.countdown_secs);

        info!(seconds = self.timings.countdown_secs, "countdown started");
        self.admin_log(
            LogCategory::Game,
            format!(
                "Countdown started: round begins in {}s",
                self.timings.countdown_secs
            ),
        );
    }

    fn abandon_countdown(&mut self) {
        self.timers.cancel_countdown();
        self.countdown_remaining = None;
        if let Err(err) = self.round.fall_back_to_waiting() {
            self.recover(&err);
            return;
        }
        info!("countdown cancelled, not enough players");
        self.admin_log(LogCategory::Game, "Countdown cancelled: not enough players");
    }

    /// `COUNTDOWN` → `COMMENCING` and arm the commence delay. The countdown
    /// timer must already be retired or cancelled.
    pub(crate) fn begin_commencing(&mut self) {
        if let Err(err) = self.round.commence() {
            self.recover(&err);
            return;
        }
        self.publish(ServerEvent::Commencing);
        let steps = vec![(self.timings.commence_delay, RoundSignal::Commence)];
        if let Err(err) = self.timers.schedule_chain(steps) {
            self.recover(&err);
            return;
        }
        info!("round commencing");
        self.admin_log(LogCategory::Game, "Round commencing");
    }

    fn start_combat(&mut self, roster: Vec<Contender>) {
        let sequence = match self.round.start_combat(roster.clone()) {
            Ok(sequence) => sequence,
            Err(err) => {
                self.recover(&err);
                return;
            }
        };
        let plan = match NarrativePlan::draw(sequence, &roster, self.rng.as_mut()) {
            Ok(plan) => plan,
            Err(err) => {
                self.recover(&err);
                return;
            }
        };
        let (winner, prompts) = plan.into_parts();
        self.pending_winner = Some(winner);

        self.publish(ServerEvent::DrawStarted);
        info!(round = sequence, contenders = roster.len(), lines = prompts.len(), "round started");
        self.admin_log(
            LogCategory::Game,
            format!(
                "Round {sequence} started automatically with {} players",
                roster.len()
            ),
        );

        let narrator = Arc::clone(&self.narrator);
        let pacing = self.timings.line_pacing;
        let timeout = self.timings.narrative_timeout;
        let spawned = self.timers.spawn_chain(move |ctx| async move {
            for prompt in prompts {
                let line = narrate_or_fallback(narrator.as_ref(), &prompt, timeout).await;
                if !ctx.emit(RoundSignal::Line(line)) {
                    return;
                }
                if !ctx.sleep(pacing).await {
                    return;
                }
            }
            ctx.finish(RoundSignal::PlaybackFinished);
        });
        if let Err(err) = spawned {
            self.recover(&err);
        }
    }

    /// Arms the `GAME_OVER` → `WAITING` delay.
    pub(crate) fn schedule_cooldown(&mut self) {
        let steps = vec![(self.timings.cooldown, RoundSignal::CooldownElapsed)];
        if let Err(err) = self.timers.schedule_chain(steps) {
            self.recover(&err);
        }
    }

    /// Cancels every timer and clears in-flight round data. Registry is
    /// left alone.
    pub(crate) fn halt_round(&mut self) {
        self.timers.cancel_all();
        self.pending_winner = None;
        self.countdown_remaining = None;
    }

    /// Forces the round back to `WAITING` after an internal invariant
    /// breach. The registry is kept.
    fn recover(&mut self, err: &RoundError) {
        error!(
            error = %err,
            fatal = err.is_fatal(),
            state = %self.round.state(),
            "round invariant breached, returning to WAITING"
        );
        self.halt_round();
        self.round.reset();
        self.admin_log(LogCategory::Error, format!("Round reset after error: {err}"));
    }

    // ------------------------------------------------------------------
    // Publishing
    // ------------------------------------------------------------------

    pub(crate) fn publish(&self, event: ServerEvent) {
        debug!(event = event.event_type(), "publishing");
        self.sink.publish(&event);
    }

    pub(crate) fn publish_snapshot(&self) {
        self.publish(ServerEvent::PlayersUpdate {
            players: self.registry.snapshot(),
            state: self.round.state(),
            winner: self.round.winner().cloned(),
            round_sequence: self.round.sequence(),
        });
    }

    pub(crate) fn admin_log(&self, category: LogCategory, message: impl Into<String>) {
        self.publish(ServerEvent::AdminLog {
            category,
            message: message.into(),
            timestamp: self.clock.now(),
        });
    }
}
