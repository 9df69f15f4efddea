#![deny(warnings)]
pub mod belief;
pub mod game;
pub mod model;
pub mod policy;

use belief::BeliefModel;
use game::error::TurnError;
use game::rules::{GameRules, RulesError};
use game::state::GameState;
use game::turn::TurnReport;
use model::claim::Claim;
use tracing::{Level, event};

pub struct AppInfo;

impl AppInfo {
    pub const fn name() -> &'static str {
        "bluffbot"
    }

    pub const fn version() -> &'static str {
        env!("CARGO_PKG_VERSION")
    }
}

/// Fresh opponent with no statistics.
pub fn new_belief_model() -> BeliefModel {
    BeliefModel::new()
}

/// Deal a new game against `belief`. The model is not modified; whatever it has learned
/// in earlier games carries over through the turns played against it.
pub fn new_game(belief: &BeliefModel) -> GameState {
    let game = GameState::new();
    log_new_game(&game, belief);
    game
}

/// [`new_game`] with explicit rules and deal seed.
pub fn new_game_with_rules(
    belief: &BeliefModel,
    rules: GameRules,
    seed: u64,
) -> Result<GameState, RulesError> {
    let game = GameState::with_rules(rules, seed)?;
    log_new_game(&game, belief);
    Ok(game)
}

fn log_new_game(game: &GameState, belief: &BeliefModel) {
    event!(
        target: "bluff_core::game",
        Level::INFO,
        seed = game.seed(),
        hand_size = game.rules().hand_size,
        known_contexts = belief.contexts().count(),
        observations = belief.total_observations(),
        "new game"
    );
}

pub fn play_player_turn(
    game: &mut GameState,
    belief: &mut BeliefModel,
    claim: Claim,
    bluff: bool,
) -> Result<TurnReport, TurnError> {
    game.play_player_turn(belief, claim, bluff)
}
