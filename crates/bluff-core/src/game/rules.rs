use crate::policy::DecisionPolicy;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_HAND_SIZE: usize = 5;
pub const DEFAULT_MAX_ROUNDS: u32 = 10;
pub const DEFAULT_OPPONENT_BLUFF_RATE: f64 = 0.30;

/// Table rules shared by every game in a session.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GameRules {
    #[serde(default = "default_hand_size")]
    pub hand_size: usize,
    #[serde(default = "default_max_rounds")]
    pub max_rounds: u32,
    #[serde(default = "default_opponent_bluff_rate")]
    pub opponent_bluff_rate: f64,
    #[serde(default)]
    pub policy: DecisionPolicy,
}

impl Default for GameRules {
    fn default() -> Self {
        Self {
            hand_size: DEFAULT_HAND_SIZE,
            max_rounds: DEFAULT_MAX_ROUNDS,
            opponent_bluff_rate: DEFAULT_OPPONENT_BLUFF_RATE,
            policy: DecisionPolicy::default(),
        }
    }
}

impl GameRules {
    pub fn validate(&self) -> Result<(), RulesError> {
        if self.hand_size == 0 {
            return Err(RulesError::invalid("hand_size", "must be at least 1"));
        }
        if self.max_rounds == 0 {
            return Err(RulesError::invalid("max_rounds", "must be at least 1"));
        }
        if !(0.0..=1.0).contains(&self.opponent_bluff_rate) {
            return Err(RulesError::invalid(
                "opponent_bluff_rate",
                "must lie within [0, 1]",
            ));
        }
        if !(self.policy.call_threshold > 0.0 && self.policy.call_threshold < 1.0) {
            return Err(RulesError::invalid(
                "policy.call_threshold",
                "must lie strictly inside (0, 1)",
            ));
        }
        if !(0.0..0.5).contains(&self.policy.noise) {
            return Err(RulesError::invalid("policy.noise", "must lie within [0, 0.5)"));
        }
        Ok(())
    }
}

fn default_hand_size() -> usize {
    DEFAULT_HAND_SIZE
}

fn default_max_rounds() -> u32 {
    DEFAULT_MAX_ROUNDS
}

fn default_opponent_bluff_rate() -> f64 {
    DEFAULT_OPPONENT_BLUFF_RATE
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RulesError {
    #[error("{field}: {message}")]
    InvalidField { field: String, message: String },
}

impl RulesError {
    fn invalid(field: &str, message: &str) -> Self {
        RulesError::InvalidField {
            field: field.to_string(),
            message: message.to_string(),
        }
    }
}
