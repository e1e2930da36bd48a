//! Narrative plan: which lines a round will narrate, and who wins.

use rumble_core::error::RoundError;
use rumble_core::participant::Contender;
use rumble_core::rng::DeterministicRng;

/// Fewest encounter lines narrated per round.
pub const MIN_ENCOUNTERS: usize = 3;

/// Most encounter lines narrated per round.
pub const MAX_ENCOUNTERS: usize = 5;

/// Number of encounter lines for a roster of `roster_len` contenders.
#[must_use]
pub fn encounter_count(roster_len: usize) -> usize {
    roster_len.clamp(MIN_ENCOUNTERS, MAX_ENCOUNTERS)
}

/// Event description for the round introduction.
#[must_use]
pub fn intro_prompt(contenders: usize, round: u64) -> String {
    format!("{contenders} warriors enter the arena for Round {round}!")
}

/// Event description for an encounter between two contenders.
#[must_use]
pub fn encounter_prompt(first: &str, second: &str) -> String {
    format!("{first} encounters {second} in battle!")
}

/// Event description for the round's victory line.
#[must_use]
pub fn victory_prompt(winner: &str, round: u64) -> String {
    format!("{winner} emerges victorious from Round {round}!")
}

/// Draws two distinct indices in `[0, len)`, uniformly over ordered pairs.
fn draw_pair(len: usize, rng: &mut dyn DeterministicRng) -> (usize, usize) {
    let first = rng.next_index(len);
    let mut second = rng.next_index(len - 1);
    if second >= first {
        second += 1;
    }
    (first, second)
}

/// Everything a round narrates, decided up front when combat begins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NarrativePlan {
    round: u64,
    winner: Contender,
    prompts: Vec<String>,
}

impl NarrativePlan {
    /// Draws a plan for `roster`: one introduction, `encounter_count`
    /// encounters between distinct contenders, and a victory line for a
    /// uniformly chosen winner.
    ///
    /// # Errors
    ///
    /// Returns `RoundError::StateConflict` if the roster has fewer than two
    /// contenders.
    pub fn draw(
        round: u64,
        roster: &[Contender],
        rng: &mut dyn DeterministicRng,
    ) -> Result<Self, RoundError> {
        if roster.len() < 2 {
            return Err(RoundError::StateConflict(
                "a round needs at least two contenders".to_owned(),
            ));
        }

        let encounters = encounter_count(roster.len());
        let mut prompts = Vec::with_capacity(encounters + 2);
        prompts.push(intro_prompt(roster.len(), round));
        for _ in 0..encounters {
            let (first, second) = draw_pair(roster.len(), rng);
            prompts.push(encounter_prompt(&roster[first].name, &roster[second].name));
        }

        let winner = roster[rng.next_index(roster.len())].clone();
        prompts.push(victory_prompt(&winner.name, round));

        Ok(Self {
            round,
            winner,
            prompts,
        })
    }

    /// The round sequence number this plan narrates.
    #[must_use]
    pub fn round(&self) -> u64 {
        self.round
    }

    /// The pre-drawn winner.
    #[must_use]
    pub fn winner(&self) -> &Contender {
        &self.winner
    }

    /// Event descriptions, in narration order.
    #[must_use]
    pub fn prompts(&self) -> &[String] {
        &self.prompts
    }

    /// Splits the plan into its winner and prompts.
    #[must_use]
    pub fn into_parts(self) -> (Contender, Vec<String>) {
        (self.winner, self.prompts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rumble_core::participant::ParticipantId;
    use rumble_core::rng::SystemRng;
    use rumble_test_support::{MockRng, SequenceRng};

    fn roster(names: &[&str]) -> Vec<Contender> {
        names
            .iter()
            .map(|name| Contender {
                identity: ParticipantId::new(),
                name: (*name).to_owned(),
            })
            .collect()
    }

    #[test]
    fn test_encounter_count_is_clamped_between_three_and_five() {
        assert_eq!(encounter_count(2), 3);
        assert_eq!(encounter_count(3), 3);
        assert_eq!(encounter_count(4), 4);
        assert_eq!(encounter_count(5), 5);
        assert_eq!(encounter_count(11), 5);
    }

    #[test]
    fn test_draw_produces_intro_encounters_and_victory_in_order() {
        // Arrange
        let roster = roster(&["Alice", "Bob", "Carol"]);
        let mut rng = SequenceRng::new(vec![0, 0, 2, 1, 1, 1, 2]);

        // Act
        let plan = NarrativePlan::draw(7, &roster, &mut rng).unwrap();

        // Assert
        assert_eq!(
            plan.prompts(),
            &[
                "3 warriors enter the arena for Round 7!",
                "Alice encounters Bob in battle!",
                "Carol encounters Bob in battle!",
                "Bob encounters Carol in battle!",
                "Carol emerges victorious from Round 7!",
            ]
        );
        assert_eq!(plan.winner(), &roster[2]);
        assert_eq!(plan.round(), 7);
    }

    #[test]
    fn test_two_contender_roster_still_gets_three_encounters() {
        let roster = roster(&["Alice", "Bob"]);

        let plan = NarrativePlan::draw(1, &roster, &mut MockRng).unwrap();

        assert_eq!(plan.prompts().len(), 5);
        for prompt in &plan.prompts()[1..4] {
            assert_eq!(prompt, "Alice encounters Bob in battle!");
        }
        assert_eq!(plan.winner().name, "Alice");
    }

    #[test]
    fn test_encounters_always_name_two_distinct_contenders() {
        let roster = roster(&["Alice", "Bob", "Carol", "Dave"]);
        let mut rng = SystemRng::seeded(11);

        for round in 0..200 {
            let plan = NarrativePlan::draw(round, &roster, &mut rng).unwrap();
            for prompt in &plan.prompts()[1..plan.prompts().len() - 1] {
                let (first, rest) = prompt.split_once(" encounters ").unwrap();
                let second = rest.trim_end_matches(" in battle!");
                assert_ne!(first, second);
            }
            assert!(roster.contains(plan.winner()));
        }
    }

    #[test]
    fn test_draw_rejects_roster_of_one() {
        let roster = roster(&["Alice"]);

        let result = NarrativePlan::draw(1, &roster, &mut MockRng);

        assert!(matches!(result, Err(RoundError::StateConflict(_))));
    }
}
