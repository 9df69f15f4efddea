use super::error::TurnError;
use super::opponent::OpponentPlay;
use super::state::GameState;
use crate::belief::BeliefModel;
use crate::model::claim::Claim;
use crate::model::history::{TurnRecord, TurnResult};
use crate::model::player::Actor;
use crate::model::strength::Strength;
use tracing::{Level, event};

/// Everything the table shows after a full round.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TurnReport {
    pub player: TurnRecord,
    pub opponent: TurnRecord,
    /// Bluff estimate the opponent acted on.
    pub estimate: f64,
    pub confidence: u8,
    pub terminal: bool,
}

impl GameState {
    /// Resolve one full round: the player's claimed play, the opponent's call decision,
    /// the opponent's own move and the round transition.
    ///
    /// Bluffing plays the weakest card in hand, honest play the strongest. The belief
    /// model learns from the true intention whether or not the play was called.
    pub fn play_player_turn(
        &mut self,
        belief: &mut BeliefModel,
        claim: Claim,
        bluff: bool,
    ) -> Result<TurnReport, TurnError> {
        if self.is_terminal() {
            return Err(TurnError::GameOver);
        }

        let hand = self.player().hand();
        let played = if bluff {
            hand.weakest()
        } else {
            hand.strongest()
        }
        .ok_or(TurnError::EmptyHand {
            actor: Actor::Player,
        })?;

        let opponent_hand = self.opponent().hand();
        let (Some(opponent_weakest), Some(opponent_strongest)) =
            (opponent_hand.weakest(), opponent_hand.strongest())
        else {
            return Err(TurnError::EmptyHand {
                actor: Actor::Opponent,
            });
        };

        let estimate = belief.estimate(played, claim);
        let policy = self.rules().policy;
        let bluff_rate = self.rules().opponent_bluff_rate;
        let decision = policy.decide(estimate, self.rng_mut());
        let opponent_play =
            OpponentPlay::choose(opponent_weakest, opponent_strongest, bluff_rate, self.rng_mut());

        let result = TurnResult::for_player(bluff, decision.called);
        let side = self.side_mut(Actor::Player);
        side.hand_mut().remove(played);
        if let Some(scorer) = result.scorer() {
            self.side_mut(scorer).award_point();
        }
        self.set_last_message(player_message(result, decision.confidence));

        belief.observe(played, claim, bluff);

        let player = TurnRecord {
            round: self.round_number(),
            actor: Actor::Player,
            actual_strength: played,
            claim,
            did_bluff: bluff,
            bot_called: decision.called,
            result,
        };
        self.history_mut().append(player);
        log_player_turn(&player, estimate, decision.confidence);

        let opponent = self.apply_opponent_play(opponent_play);
        self.advance_round();

        Ok(TurnReport {
            player,
            opponent,
            estimate,
            confidence: decision.confidence,
            terminal: self.is_terminal(),
        })
    }

    /// Same as [`GameState::play_player_turn`] with the claim given as text, as a form or
    /// prompt would submit it.
    pub fn play_declared_turn(
        &mut self,
        belief: &mut BeliefModel,
        claim: &str,
        bluff: bool,
    ) -> Result<TurnReport, TurnError> {
        let claim: Claim = claim.parse()?;
        self.play_player_turn(belief, claim, bluff)
    }

    /// Card a play with the given intention would use, without playing it.
    pub fn preview_card(&self, bluff: bool) -> Option<Strength> {
        let hand = self.player().hand();
        if bluff {
            hand.weakest()
        } else {
            hand.strongest()
        }
    }
}

fn player_message(result: TurnResult, confidence: u8) -> String {
    let verdict = match result {
        TurnResult::BluffCaught => "Bot called bluff! Caught you.",
        TurnResult::FalseAccusation => "Bot called bluff! You were honest.",
        TurnResult::BluffSucceeded => "Bot accepted. Bluff worked!",
        _ => "Bot accepted. Honest play.",
    };
    format!("{verdict} (Suspicion {confidence}%)")
}

fn log_player_turn(record: &TurnRecord, estimate: f64, confidence: u8) {
    if !tracing::enabled!(target: "bluff_core::turn", Level::INFO) {
        return;
    }

    event!(
        target: "bluff_core::turn",
        Level::INFO,
        round = record.round,
        strength = record.actual_strength.value(),
        bucket = %record.actual_strength.bucket(),
        claim = %record.claim,
        bluffed = record.did_bluff,
        called = record.bot_called,
        estimate,
        confidence,
        result = %record.result,
    );
}

#[cfg(test)]
mod tests {
    use super::player_message;
    use crate::belief::BeliefModel;
    use crate::game::error::TurnError;
    use crate::game::rules::GameRules;
    use crate::game::state::GameState;
    use crate::model::claim::Claim;
    use crate::model::hand::Hand;
    use crate::model::history::TurnResult;
    use crate::model::player::Actor;
    use crate::model::strength::Strength;
    use crate::policy::DecisionPolicy;
    use rand::RngCore;

    fn hand(values: &[u8]) -> Hand {
        Hand::with_cards(values.iter().map(|v| Strength::new(*v).unwrap()).collect())
    }

    fn game_with(player: &[u8], opponent: &[u8], rules: GameRules, seed: u64) -> GameState {
        GameState::with_hands(rules, seed, hand(player), hand(opponent)).unwrap()
    }

    fn always_call() -> GameRules {
        GameRules {
            policy: DecisionPolicy::new(0.01, 0.0),
            ..GameRules::default()
        }
    }

    fn never_call() -> GameRules {
        GameRules {
            policy: DecisionPolicy::new(0.99, 0.0),
            ..GameRules::default()
        }
    }

    #[test]
    fn honest_play_uses_strongest_card_and_bluff_uses_weakest() {
        let mut belief = BeliefModel::new();
        let mut game = game_with(&[2, 9, 5], &[4, 4, 4], never_call(), 1);
        let report = game.play_player_turn(&mut belief, Claim::High, false).unwrap();
        assert_eq!(report.player.actual_strength.value(), 9);

        let report = game.play_player_turn(&mut belief, Claim::High, true).unwrap();
        assert_eq!(report.player.actual_strength.value(), 2);
        assert_eq!(game.player().hand().cards(), &[Strength::new(5).unwrap()]);
    }

    #[test]
    fn caught_bluff_scores_for_opponent() {
        let rules = GameRules {
            opponent_bluff_rate: 0.0,
            ..always_call()
        };
        let mut belief = BeliefModel::new();
        let mut game = game_with(&[1, 8], &[5, 6], rules, 2);
        let report = game.play_player_turn(&mut belief, Claim::High, true).unwrap();
        assert!(report.player.bot_called);
        assert_eq!(report.player.result, TurnResult::BluffCaught);
        assert_eq!(game.opponent().score(), 1);
        assert_eq!(game.player().score(), 0);
        assert!(game.last_message().starts_with("Bot called bluff! Caught you."));
    }

    #[test]
    fn false_accusation_scores_for_player() {
        let rules = GameRules {
            opponent_bluff_rate: 0.0,
            ..always_call()
        };
        let mut belief = BeliefModel::new();
        let mut game = game_with(&[1, 8], &[5, 6], rules, 2);
        let report = game.play_player_turn(&mut belief, Claim::High, false).unwrap();
        assert_eq!(report.player.result, TurnResult::FalseAccusation);
        assert_eq!(game.player().score(), 1);
        assert_eq!(game.opponent().score(), 0);
    }

    #[test]
    fn uncalled_bluff_scores_for_player_and_honest_play_scores_nothing() {
        let rules = GameRules {
            opponent_bluff_rate: 0.0,
            ..never_call()
        };
        let mut belief = BeliefModel::new();
        let mut game = game_with(&[1, 8], &[5, 6], rules, 2);
        let report = game.play_player_turn(&mut belief, Claim::Medium, true).unwrap();
        assert_eq!(report.player.result, TurnResult::BluffSucceeded);
        assert_eq!(game.player().score(), 1);

        let report = game.play_player_turn(&mut belief, Claim::Medium, false).unwrap();
        assert_eq!(report.player.result, TurnResult::HonestAccepted);
        assert_eq!(game.player().score(), 1);
        assert_eq!(game.opponent().score(), 0);
    }

    #[test]
    fn belief_learns_true_intention_even_when_not_called() {
        let mut belief = BeliefModel::new();
        let mut game = game_with(&[1, 2], &[5, 6], never_call(), 4);
        game.play_player_turn(&mut belief, Claim::High, true).unwrap();
        let estimate = belief.estimate(Strength::new(1).unwrap(), Claim::High);
        assert!((estimate - 0.5).abs() < 1e-12);
        assert_eq!(belief.total_observations(), 1);
    }

    #[test]
    fn opponent_bluff_always_scores() {
        let rules = GameRules {
            opponent_bluff_rate: 1.0,
            ..never_call()
        };
        let mut belief = BeliefModel::new();
        let mut game = game_with(&[5], &[3, 10], rules, 6);
        let report = game.play_player_turn(&mut belief, Claim::Medium, false).unwrap();
        assert_eq!(report.opponent.actor, Actor::Opponent);
        assert_eq!(report.opponent.actual_strength.value(), 3);
        assert!(report.opponent.did_bluff);
        assert!(!report.opponent.bot_called);
        assert_eq!(report.opponent.result, TurnResult::OpponentBluffSucceeded);
        assert_eq!(game.opponent().score(), 1);
    }

    #[test]
    fn one_round_appends_two_records_with_same_round() {
        let mut belief = BeliefModel::new();
        let mut game = GameState::with_seed(12);
        game.play_player_turn(&mut belief, Claim::Low, false).unwrap();
        let rounds: Vec<_> = game.history().iter().map(|r| (r.round, r.actor)).collect();
        assert_eq!(rounds, vec![(1, Actor::Player), (1, Actor::Opponent)]);
        assert_eq!(game.round_number(), 2);
    }

    #[test]
    fn terminal_game_rejects_turns_without_changes() {
        let mut belief = BeliefModel::new();
        let mut game = game_with(&[3], &[7], GameRules::default(), 9);
        game.play_player_turn(&mut belief, Claim::Low, false).unwrap();
        assert!(game.is_terminal());

        let history_len = game.history().len();
        let scores = (game.player().score(), game.opponent().score());
        let observed = belief.total_observations();
        let err = game.play_player_turn(&mut belief, Claim::High, true).unwrap_err();
        assert_eq!(err, TurnError::GameOver);
        assert_eq!(game.history().len(), history_len);
        assert_eq!((game.player().score(), game.opponent().score()), scores);
        assert_eq!(belief.total_observations(), observed);
    }

    #[test]
    fn empty_player_hand_is_an_invalid_turn() {
        let mut belief = BeliefModel::new();
        let mut game = game_with(&[], &[7], GameRules::default(), 9);
        let err = game.play_player_turn(&mut belief, Claim::Low, false).unwrap_err();
        assert_eq!(
            err,
            TurnError::EmptyHand {
                actor: Actor::Player
            }
        );
        assert!(game.history().is_empty());
        assert_eq!(game.round_number(), 1);
    }

    #[test]
    fn empty_opponent_hand_rejects_before_touching_player_hand() {
        let mut belief = BeliefModel::new();
        let mut game = game_with(&[4, 6], &[], GameRules::default(), 9);
        let err = game.play_player_turn(&mut belief, Claim::Low, false).unwrap_err();
        assert_eq!(
            err,
            TurnError::EmptyHand {
                actor: Actor::Opponent
            }
        );
        assert_eq!(game.player().hand().len(), 2);
        assert!(belief.is_empty());
    }

    #[test]
    fn unknown_claim_text_is_rejected() {
        let mut belief = BeliefModel::new();
        let mut game = GameState::with_seed(5);
        let err = game.play_declared_turn(&mut belief, "enormous", true).unwrap_err();
        assert!(matches!(err, TurnError::UnknownClaim(_)));
        assert!(err.to_string().starts_with("invalid turn"));
        assert_eq!(game.player().hand().len(), 5);

        game.play_declared_turn(&mut belief, "HIGH", true).unwrap();
        assert_eq!(game.history().len(), 2);
    }

    #[test]
    fn rejected_claim_leaves_random_stream_in_place() {
        let mut belief = BeliefModel::new();
        let mut game = GameState::with_seed(77);
        let mut untouched = game.clone();
        let mut untouched_belief = belief.clone();

        game.play_declared_turn(&mut belief, "sideways", true).unwrap_err();

        let plays = [(Claim::High, true), (Claim::Low, false), (Claim::Medium, true)];
        for (claim, bluff) in plays {
            let report = game.play_player_turn(&mut belief, claim, bluff).unwrap();
            let expected = untouched
                .play_player_turn(&mut untouched_belief, claim, bluff)
                .unwrap();
            assert_eq!(report, expected);
        }
        assert_eq!(game.history(), untouched.history());
        assert_eq!(belief, untouched_belief);
    }

    #[test]
    fn rejected_turns_do_not_draw_from_the_rng() {
        let rules = GameRules::default();
        let cases = [
            (game_with(&[4, 6], &[], rules, 21), Actor::Opponent),
            (game_with(&[], &[4, 6], rules, 21), Actor::Player),
        ];
        for (mut game, actor) in cases {
            let mut untouched = game.clone();
            let mut belief = BeliefModel::new();
            let err = game.play_player_turn(&mut belief, Claim::Low, true).unwrap_err();
            assert_eq!(err, TurnError::EmptyHand { actor });
            assert_eq!(game.rng_mut().next_u64(), untouched.rng_mut().next_u64());
        }
    }

    #[test]
    fn preview_matches_played_card() {
        let mut belief = BeliefModel::new();
        let mut game = game_with(&[2, 6, 8], &[1, 1, 1], GameRules::default(), 3);
        let preview = game.preview_card(true);
        let report = game.play_player_turn(&mut belief, Claim::High, true).unwrap();
        assert_eq!(preview, Some(report.player.actual_strength));
    }

    #[test]
    fn message_includes_suspicion_percent() {
        assert_eq!(
            player_message(TurnResult::HonestAccepted, 35),
            "Bot accepted. Honest play. (Suspicion 35%)"
        );
    }
}
