use crate::model::claim::Claim;
use crate::model::player::Actor;
use crate::model::strength::Strength;
use core::fmt;
use serde::{Deserialize, Serialize};

/// Resolution of a single action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnResult {
    BluffCaught,
    FalseAccusation,
    BluffSucceeded,
    HonestAccepted,
    OpponentBluffSucceeded,
    OpponentHonest,
}

impl TurnResult {
    /// Resolution of a player action from (bluffed, called).
    pub const fn for_player(bluffed: bool, called: bool) -> Self {
        match (bluffed, called) {
            (true, true) => TurnResult::BluffCaught,
            (false, true) => TurnResult::FalseAccusation,
            (true, false) => TurnResult::BluffSucceeded,
            (false, false) => TurnResult::HonestAccepted,
        }
    }

    /// Side that scores a point, if any.
    pub const fn scorer(self) -> Option<Actor> {
        match self {
            TurnResult::BluffCaught | TurnResult::OpponentBluffSucceeded => Some(Actor::Opponent),
            TurnResult::FalseAccusation | TurnResult::BluffSucceeded => Some(Actor::Player),
            TurnResult::HonestAccepted | TurnResult::OpponentHonest => None,
        }
    }

    pub const fn description(self) -> &'static str {
        match self {
            TurnResult::BluffCaught => "Bot caught your bluff (+1 Bot)",
            TurnResult::FalseAccusation => "Bot wrongly called bluff (+1 You)",
            TurnResult::BluffSucceeded => "Your bluff succeeded (+1 You)",
            TurnResult::HonestAccepted => "Honest play (no call)",
            TurnResult::OpponentBluffSucceeded => "Bot bluff succeeded (+1 Bot)",
            TurnResult::OpponentHonest => "Bot honest play",
        }
    }
}

impl fmt::Display for TurnResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.description())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnRecord {
    pub round: u32,
    pub actor: Actor,
    pub actual_strength: Strength,
    pub claim: Claim,
    pub did_bluff: bool,
    pub bot_called: bool,
    pub result: TurnResult,
}

/// Append-only record of every action taken in a game.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HistoryLog {
    records: Vec<TurnRecord>,
}

impl HistoryLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn from_records(records: Vec<TurnRecord>) -> Self {
        Self { records }
    }

    pub fn append(&mut self, record: TurnRecord) {
        self.records.push(record);
    }

    pub fn records(&self) -> &[TurnRecord] {
        &self.records
    }

    pub fn iter(&self) -> impl Iterator<Item = &TurnRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn last(&self) -> Option<&TurnRecord> {
        self.records.last()
    }

    pub fn by_actor(&self, actor: Actor) -> impl Iterator<Item = &TurnRecord> {
        self.records.iter().filter(move |r| r.actor == actor)
    }

    /// Share of the player's actions that were bluffs; 0.0 before the first one.
    pub fn player_bluff_rate(&self) -> f64 {
        let (bluffs, total) = self
            .by_actor(Actor::Player)
            .fold((0u32, 0u32), |(b, t), r| (b + u32::from(r.did_bluff), t + 1));
        if total == 0 {
            0.0
        } else {
            f64::from(bluffs) / f64::from(total)
        }
    }

    /// (round, bluffed) for each player action, in play order.
    pub fn bluff_timeline(&self) -> Vec<(u32, bool)> {
        self.by_actor(Actor::Player)
            .map(|r| (r.round, r.did_bluff))
            .collect()
    }
}

impl<'a> IntoIterator for &'a HistoryLog {
    type Item = &'a TurnRecord;
    type IntoIter = std::slice::Iter<'a, TurnRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
