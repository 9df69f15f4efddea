use core::fmt;
use core::str::FromStr;
use serde::{Deserialize, Serialize};

/// Strength category an actor declares for the card it plays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Claim {
    Low,
    Medium,
    High,
}

impl Claim {
    pub const ALL: [Claim; 3] = [Claim::Low, Claim::Medium, Claim::High];

    /// Claims a bluffing actor picks from; never under-claims.
    pub const UPWARD: [Claim; 2] = [Claim::Medium, Claim::High];

    /// Nominal strength the claim stands for. Not checked against the card played.
    pub const fn expected_strength(self) -> u8 {
        match self {
            Claim::Low => 3,
            Claim::Medium => 6,
            Claim::High => 9,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Claim::Low => "low",
            Claim::Medium => "medium",
            Claim::High => "high",
        }
    }
}

impl FromStr for Claim {
    type Err = UnknownClaim;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Claim::Low),
            "medium" | "mid" => Ok(Claim::Medium),
            "high" => Ok(Claim::High),
            _ => Err(UnknownClaim(value.to_string())),
        }
    }
}

impl fmt::Display for Claim {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown claim '{0}' (expected low, medium or high)")]
pub struct UnknownClaim(pub String);
