use super::rules::{GameRules, RulesError};
use super::state::GameState;
use crate::belief::{BeliefModel, ContextKey, ContextStat};
use crate::model::hand::Hand;
use crate::model::history::{HistoryLog, TurnRecord};
use crate::model::player::PlayerState;
use crate::model::strength::Strength;
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// Serialized form of a session: the learned statistics plus the game in progress.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionSnapshot {
    pub belief: BeliefSnapshot,
    pub game: GameSnapshot,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BeliefSnapshot {
    pub prior: f64,
    #[serde(default)]
    pub contexts: Vec<ContextEntry>,
}

/// Flat entry so the mapping serializes to formats without composite keys.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct ContextEntry {
    #[serde(flatten)]
    pub key: ContextKey,
    pub bluffs: u32,
    pub total: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GameSnapshot {
    pub seed: u64,
    pub rules: GameRules,
    pub round_number: u32,
    pub player: SideSnapshot,
    pub opponent: SideSnapshot,
    pub history: Vec<TurnRecord>,
    pub last_message: String,
    pub terminal: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SideSnapshot {
    pub hand: Vec<Strength>,
    pub score: u32,
}

impl BeliefSnapshot {
    pub fn capture(model: &BeliefModel) -> Self {
        Self {
            prior: model.prior(),
            contexts: model
                .contexts()
                .map(|(key, stat)| ContextEntry {
                    key,
                    bluffs: stat.bluffs(),
                    total: stat.total(),
                })
                .collect(),
        }
    }

    pub fn restore(self) -> Result<BeliefModel, SnapshotError> {
        if !(self.prior > 0.0 && self.prior < 1.0) {
            return Err(SnapshotError::InvalidPrior(self.prior));
        }
        let mut stats = BTreeMap::new();
        for entry in self.contexts {
            let stat = ContextStat::from_counts(entry.bluffs, entry.total).ok_or(
                SnapshotError::InvalidContext {
                    key: entry.key,
                    bluffs: entry.bluffs,
                    total: entry.total,
                },
            )?;
            if stats.insert(entry.key, stat).is_some() {
                return Err(SnapshotError::DuplicateContext(entry.key));
            }
        }
        Ok(BeliefModel::from_parts(self.prior, stats))
    }
}

impl GameSnapshot {
    pub fn capture(state: &GameState) -> Self {
        Self {
            seed: state.seed(),
            rules: *state.rules(),
            round_number: state.round_number(),
            player: SideSnapshot::capture(state.player()),
            opponent: SideSnapshot::capture(state.opponent()),
            history: state.history().records().to_vec(),
            last_message: state.last_message().to_string(),
            terminal: state.is_terminal(),
        }
    }

    /// Rebuild the game. The random stream is re-derived from the seed and the number of
    /// recorded actions, so a restored game continues deterministically but does not
    /// replay the draws the original would have made.
    ///
    /// The snapshot must describe a state play could have reached: the terminal flag agrees
    /// with the round limit and the remaining hands, and every record belongs to a round
    /// that has already been played.
    pub fn restore(self) -> Result<GameState, SnapshotError> {
        self.rules.validate()?;
        let last_round = self.rules.max_rounds.saturating_add(1);
        if self.round_number == 0 || self.round_number > last_round {
            return Err(SnapshotError::InvalidRound {
                round_number: self.round_number,
                last_round,
            });
        }

        let hands_empty = self.player.hand.is_empty() && self.opponent.hand.is_empty();
        let finished = self.round_number > self.rules.max_rounds || hands_empty;
        if finished != self.terminal {
            return Err(SnapshotError::TerminalMismatch {
                terminal: self.terminal,
                round_number: self.round_number,
                hands_empty,
            });
        }

        if let Some(record) = self.history.iter().find(|r| r.round >= self.round_number) {
            return Err(SnapshotError::RecordAfterRound {
                record_round: record.round,
                round_number: self.round_number,
            });
        }

        let rng = StdRng::seed_from_u64(self.seed.wrapping_add(self.history.len() as u64));
        Ok(GameState::from_parts(
            self.rules,
            self.seed,
            rng,
            self.round_number,
            self.player.restore(),
            self.opponent.restore(),
            HistoryLog::from_records(self.history),
            self.last_message,
            self.terminal,
        ))
    }
}

impl SideSnapshot {
    fn capture(side: &PlayerState) -> Self {
        Self {
            hand: side.hand().cards().to_vec(),
            score: side.score(),
        }
    }

    fn restore(self) -> PlayerState {
        PlayerState::with_score(Hand::with_cards(self.hand), self.score)
    }
}

impl SessionSnapshot {
    pub fn capture(state: &GameState, belief: &BeliefModel) -> Self {
        Self {
            belief: BeliefSnapshot::capture(belief),
            game: GameSnapshot::capture(state),
        }
    }

    pub fn restore(self) -> Result<(GameState, BeliefModel), SnapshotError> {
        let belief = self.belief.restore()?;
        let game = self.game.restore()?;
        Ok((game, belief))
    }

    pub fn to_json(state: &GameState, belief: &BeliefModel) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&Self::capture(state, belief))
    }

    pub fn from_json(json: &str) -> Result<Self, SnapshotError> {
        Ok(serde_json::from_str(json)?)
    }
}

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("failed to decode snapshot: {0}")]
    Json(#[from] serde_json::Error),
    #[error("snapshot rules are invalid: {0}")]
    Rules(#[from] RulesError),
    #[error("snapshot prior {0} is not a probability in (0, 1)")]
    InvalidPrior(f64),
    #[error("context {key:?} records {bluffs} bluffs out of {total} plays")]
    InvalidContext {
        key: ContextKey,
        bluffs: u32,
        total: u32,
    },
    #[error("context {0:?} appears more than once")]
    DuplicateContext(ContextKey),
    #[error("round number {round_number} is outside 1..={last_round}")]
    InvalidRound { round_number: u32, last_round: u32 },
    #[error(
        "terminal flag {terminal} contradicts round {round_number} (both hands empty: {hands_empty})"
    )]
    TerminalMismatch {
        terminal: bool,
        round_number: u32,
        hands_empty: bool,
    },
    #[error("history records round {record_round} but the game is only at round {round_number}")]
    RecordAfterRound { record_round: u32, round_number: u32 },
}
