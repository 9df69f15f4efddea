use super::rules::{GameRules, RulesError};
use crate::model::hand::Hand;
use crate::model::history::HistoryLog;
use crate::model::player::{Actor, PlayerState};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{Level, event};

pub const NEW_GAME_MESSAGE: &str = "New game started. Your move!";
pub const GAME_OVER_SUFFIX: &str = " | Game Over!";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    PlayerWins,
    OpponentWins,
    Tie,
}

/// One game between the human and the adaptive opponent.
///
/// The state is `active` until the end of a round finds the round counter past the limit
/// or both hands empty; from then on it is `terminal` and every turn request is refused.
#[derive(Debug, Clone)]
pub struct GameState {
    rules: GameRules,
    round_number: u32,
    player: PlayerState,
    opponent: PlayerState,
    history: HistoryLog,
    last_message: String,
    terminal: bool,
    rng: StdRng,
    seed: u64,
}

impl GameState {
    pub fn new() -> Self {
        let seed: u64 = rand::random();
        Self::with_seed(seed)
    }

    pub fn with_seed(seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let rules = GameRules::default();
        let player = Hand::deal(rules.hand_size, &mut rng);
        let opponent = Hand::deal(rules.hand_size, &mut rng);
        Self::assemble(rules, seed, rng, player, opponent)
    }

    pub fn with_rules(rules: GameRules, seed: u64) -> Result<Self, RulesError> {
        rules.validate()?;
        let mut rng = StdRng::seed_from_u64(seed);
        let player = Hand::deal(rules.hand_size, &mut rng);
        let opponent = Hand::deal(rules.hand_size, &mut rng);
        Ok(Self::assemble(rules, seed, rng, player, opponent))
    }

    /// Start from fixed hands instead of a random deal.
    pub fn with_hands(
        rules: GameRules,
        seed: u64,
        player: Hand,
        opponent: Hand,
    ) -> Result<Self, RulesError> {
        rules.validate()?;
        let rng = StdRng::seed_from_u64(seed);
        Ok(Self::assemble(rules, seed, rng, player, opponent))
    }

    fn assemble(rules: GameRules, seed: u64, rng: StdRng, player: Hand, opponent: Hand) -> Self {
        event!(
            target: "bluff_core::game",
            Level::DEBUG,
            seed,
            player_cards = player.len(),
            opponent_cards = opponent.len(),
            "dealt new game"
        );
        Self {
            rules,
            round_number: 1,
            player: PlayerState::new(player),
            opponent: PlayerState::new(opponent),
            history: HistoryLog::new(),
            last_message: NEW_GAME_MESSAGE.to_string(),
            terminal: false,
            rng,
            seed,
        }
    }

    #[allow(clippy::too_many_arguments)]
    pub(crate) fn from_parts(
        rules: GameRules,
        seed: u64,
        rng: StdRng,
        round_number: u32,
        player: PlayerState,
        opponent: PlayerState,
        history: HistoryLog,
        last_message: String,
        terminal: bool,
    ) -> Self {
        Self {
            rules,
            round_number,
            player,
            opponent,
            history,
            last_message,
            terminal,
            rng,
            seed,
        }
    }

    pub fn rules(&self) -> &GameRules {
        &self.rules
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn round_number(&self) -> u32 {
        self.round_number
    }

    /// Round number clamped to the limit, for display after the game ends.
    pub fn display_round(&self) -> u32 {
        self.round_number.min(self.rules.max_rounds)
    }

    pub fn player(&self) -> &PlayerState {
        &self.player
    }

    pub fn opponent(&self) -> &PlayerState {
        &self.opponent
    }

    pub fn side(&self, actor: Actor) -> &PlayerState {
        match actor {
            Actor::Player => &self.player,
            Actor::Opponent => &self.opponent,
        }
    }

    pub(crate) fn side_mut(&mut self, actor: Actor) -> &mut PlayerState {
        match actor {
            Actor::Player => &mut self.player,
            Actor::Opponent => &mut self.opponent,
        }
    }

    pub fn history(&self) -> &HistoryLog {
        &self.history
    }

    pub(crate) fn history_mut(&mut self) -> &mut HistoryLog {
        &mut self.history
    }

    pub fn last_message(&self) -> &str {
        &self.last_message
    }

    pub(crate) fn set_last_message(&mut self, message: String) {
        self.last_message = message;
    }

    pub fn is_terminal(&self) -> bool {
        self.terminal
    }

    /// Final standing; `None` while the game is still running.
    pub fn outcome(&self) -> Option<Outcome> {
        if !self.terminal {
            return None;
        }
        let (player, opponent) = (self.player.score(), self.opponent.score());
        Some(match player.cmp(&opponent) {
            std::cmp::Ordering::Greater => Outcome::PlayerWins,
            std::cmp::Ordering::Less => Outcome::OpponentWins,
            std::cmp::Ordering::Equal => Outcome::Tie,
        })
    }

    pub(crate) fn rng_mut(&mut self) -> &mut StdRng {
        &mut self.rng
    }

    /// Close the current round and check whether the game is finished.
    pub(crate) fn advance_round(&mut self) {
        self.round_number += 1;
        let hands_empty = Actor::BOTH
            .iter()
            .all(|&actor| self.side(actor).hand().is_empty());
        if self.round_number > self.rules.max_rounds || hands_empty {
            self.terminal = true;
            self.last_message.push_str(GAME_OVER_SUFFIX);
            event!(
                target: "bluff_core::game",
                Level::INFO,
                rounds_played = self.round_number - 1,
                player_score = self.player.score(),
                opponent_score = self.opponent.score(),
                hands_empty,
                "game over"
            );
        }
    }
}

impl Default for GameState {
    fn default() -> Self {
        Self::new()
    }
}
