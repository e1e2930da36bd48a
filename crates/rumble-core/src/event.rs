//! Outbound events and the sink they are published to.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::participant::{Contender, ParticipantView};
use crate::state::RoundState;

/// Category attached to an admin log entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LogCategory {
    /// Connections opened or closed.
    Connection,
    /// Enrollment changes.
    Player,
    /// Round lifecycle transitions.
    Game,
    /// Narrative lines as they are broadcast.
    Narrative,
    /// Administrative actions.
    Admin,
    /// Internal failures.
    Error,
}

/// Every message the round core broadcasts to observers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum ServerEvent {
    /// One countdown tick.
    Countdown {
        /// Seconds left before the round commences.
        remaining_seconds: u32,
    },
    /// The countdown elapsed; combat begins after a short delay.
    Commencing,
    /// The roster has been captured and narration is starting.
    DrawStarted,
    /// One line of round narration.
    NarrativeLine {
        /// The narrated text.
        text: String,
    },
    /// The round ended, naturally or by force.
    RoundEnded {
        /// Human-readable end message.
        message: String,
        /// The winner, absent for forced ends.
        winner: Option<Contender>,
    },
    /// Full state snapshot.
    PlayersUpdate {
        /// All registered participants in insertion order.
        players: Vec<ParticipantView>,
        /// Current round state.
        state: RoundState,
        /// Current winner, if any.
        winner: Option<Contender>,
        /// Number of rounds that have entered combat.
        round_sequence: u64,
    },
    /// Administrative log entry.
    AdminLog {
        /// Log category.
        category: LogCategory,
        /// Log message.
        message: String,
        /// When the entry was produced.
        timestamp: DateTime<Utc>,
    },
    /// Free-text lobby notice.
    Announcement {
        /// The notice.
        message: String,
    },
    /// Unique participants seen per hour of day (UTC).
    PlayerStats {
        /// 24 counts, index = hour.
        hourly_stats: Vec<usize>,
    },
}

impl ServerEvent {
    /// Returns the wire type name (used for logging).
    #[must_use]
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::Countdown { .. } => "countdown",
            Self::Commencing => "commencing",
            Self::DrawStarted => "drawStarted",
            Self::NarrativeLine { .. } => "narrativeLine",
            Self::RoundEnded { .. } => "roundEnded",
            Self::PlayersUpdate { .. } => "playersUpdate",
            Self::AdminLog { .. } => "adminLog",
            Self::Announcement { .. } => "announcement",
            Self::PlayerStats { .. } => "playerStats",
        }
    }

    /// Whether this event is a full state snapshot.
    #[must_use]
    pub fn is_snapshot(&self) -> bool {
        matches!(self, Self::PlayersUpdate { .. })
    }
}

/// Destination for everything the round core emits.
///
/// Implementations must not block: `publish` is called from the single
/// orchestrator task, in emission order.
pub trait EventSink: Send + Sync {
    /// Delivers an event to every connected observer.
    fn publish(&self, event: &ServerEvent);

    /// Closes every participant connection (admin kick-all). Privileged
    /// observers stay connected.
    fn disconnect_participants(&self) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::participant::ParticipantId;
    use serde_json::Value;

    #[test]
    fn test_countdown_serializes_with_camel_case_tag_and_fields() {
        let json: Value =
            serde_json::to_value(ServerEvent::Countdown { remaining_seconds: 42 }).unwrap();
        assert_eq!(json["type"], "countdown");
        assert_eq!(json["remainingSeconds"], 42);
    }

    #[test]
    fn test_players_update_carries_state_and_winner() {
        let identity = ParticipantId::new();
        let event = ServerEvent::PlayersUpdate {
            players: vec![ParticipantView {
                identity,
                name: Some("Alice".into()),
                enrolled: true,
            }],
            state: RoundState::GameOver,
            winner: Some(Contender {
                identity,
                name: "Alice".into(),
            }),
            round_sequence: 3,
        };

        let json: Value = serde_json::to_value(&event).unwrap();

        assert_eq!(json["type"], "playersUpdate");
        assert_eq!(json["state"], "GAME_OVER");
        assert_eq!(json["roundSequence"], 3);
        assert_eq!(json["players"][0]["identity"], identity.to_string());
        assert_eq!(json["winner"]["name"], "Alice");
        assert!(event.is_snapshot());
    }

    #[test]
    fn test_unit_variants_serialize_as_bare_tag() {
        let json: Value = serde_json::to_value(ServerEvent::DrawStarted).unwrap();
        assert_eq!(json, serde_json::json!({ "type": "drawStarted" }));
        assert_eq!(ServerEvent::Commencing.event_type(), "commencing");
    }
}
