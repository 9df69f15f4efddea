use crate::model::hand::Hand;
use core::fmt;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Actor {
    #[serde(rename = "player")]
    Player,
    #[serde(rename = "bot")]
    Opponent,
}

impl Actor {
    pub const BOTH: [Actor; 2] = [Actor::Player, Actor::Opponent];

    pub const fn as_str(self) -> &'static str {
        match self {
            Actor::Player => "player",
            Actor::Opponent => "bot",
        }
    }
}

impl fmt::Display for Actor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Hand and running score for one side of the table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlayerState {
    hand: Hand,
    score: u32,
}

impl PlayerState {
    pub fn new(hand: Hand) -> Self {
        Self { hand, score: 0 }
    }

    pub(crate) fn with_score(hand: Hand, score: u32) -> Self {
        Self { hand, score }
    }

    pub fn hand(&self) -> &Hand {
        &self.hand
    }

    pub(crate) fn hand_mut(&mut self) -> &mut Hand {
        &mut self.hand
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub(crate) fn award_point(&mut self) {
        self.score += 1;
    }
}
