use super::state::GameState;
use crate::model::claim::Claim;
use crate::model::history::{TurnRecord, TurnResult};
use crate::model::player::Actor;
use crate::model::strength::Strength;
use rand::Rng;
use tracing::{Level, event};

/// The opponent's own move. Drawn from a fixed bluff rate; it never looks at what the
/// belief model has learned about the human.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpponentPlay {
    pub strength: Strength,
    pub claim: Claim,
    pub bluffed: bool,
}

impl OpponentPlay {
    /// Bluffs play the weakest card and over-claim (medium or high); honest plays show
    /// the strongest card under any claim.
    pub fn choose<R: Rng + ?Sized>(
        weakest: Strength,
        strongest: Strength,
        bluff_rate: f64,
        rng: &mut R,
    ) -> Self {
        let bluffed = rng.gen_bool(bluff_rate);
        if bluffed {
            let claim = Claim::UPWARD[rng.gen_range(0..Claim::UPWARD.len())];
            Self {
                strength: weakest,
                claim,
                bluffed,
            }
        } else {
            let claim = Claim::ALL[rng.gen_range(0..Claim::ALL.len())];
            Self {
                strength: strongest,
                claim,
                bluffed,
            }
        }
    }

    pub const fn result(self) -> TurnResult {
        if self.bluffed {
            TurnResult::OpponentBluffSucceeded
        } else {
            TurnResult::OpponentHonest
        }
    }
}

impl GameState {
    /// Play the opponent's move for the current round. Its plays are never called, so a
    /// bluff always scores.
    pub(crate) fn apply_opponent_play(&mut self, play: OpponentPlay) -> TurnRecord {
        let result = play.result();
        let side = self.side_mut(Actor::Opponent);
        side.hand_mut().remove(play.strength);
        if result.scorer() == Some(Actor::Opponent) {
            side.award_point();
        }

        let record = TurnRecord {
            round: self.round_number(),
            actor: Actor::Opponent,
            actual_strength: play.strength,
            claim: play.claim,
            did_bluff: play.bluffed,
            bot_called: false,
            result,
        };
        self.history_mut().append(record);

        event!(
            target: "bluff_core::opponent",
            Level::DEBUG,
            round = record.round,
            strength = play.strength.value(),
            claim = %play.claim,
            bluffed = play.bluffed,
        );

        record
    }
}

#[cfg(test)]
mod tests {
    use super::OpponentPlay;
    use crate::model::claim::Claim;
    use crate::model::history::TurnResult;
    use crate::model::strength::Strength;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn s(value: u8) -> Strength {
        Strength::new(value).unwrap()
    }

    #[test]
    fn bluffs_play_weak_and_never_claim_low() {
        let mut rng = StdRng::seed_from_u64(8);
        for _ in 0..200 {
            let play = OpponentPlay::choose(s(2), s(9), 1.0, &mut rng);
            assert!(play.bluffed);
            assert_eq!(play.strength, s(2));
            assert_ne!(play.claim, Claim::Low);
            assert_eq!(play.result(), TurnResult::OpponentBluffSucceeded);
        }
    }

    #[test]
    fn honest_plays_use_strongest_card() {
        let mut rng = StdRng::seed_from_u64(8);
        let mut claims = std::collections::HashSet::new();
        for _ in 0..200 {
            let play = OpponentPlay::choose(s(2), s(9), 0.0, &mut rng);
            assert!(!play.bluffed);
            assert_eq!(play.strength, s(9));
            claims.insert(play.claim);
        }
        assert_eq!(claims.len(), 3);
    }

    #[test]
    fn bluff_rate_is_roughly_thirty_percent() {
        let mut rng = StdRng::seed_from_u64(2024);
        let trials = 5_000;
        let bluffs = (0..trials)
            .filter(|_| OpponentPlay::choose(s(1), s(10), 0.30, &mut rng).bluffed)
            .count();
        let rate = bluffs as f64 / trials as f64;
        assert!((rate - 0.30).abs() < 0.03, "rate {rate}");
    }
}
