use crate::model::claim::UnknownClaim;
use crate::model::player::Actor;
use thiserror::Error;

/// Reasons a turn request is refused. A refused turn leaves the game untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TurnError {
    #[error("invalid turn: the game is over")]
    GameOver,
    #[error("invalid turn: {actor} has no cards left")]
    EmptyHand { actor: Actor },
    #[error("invalid turn: {0}")]
    UnknownClaim(#[from] UnknownClaim),
}
