use core::fmt;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Face value of a card on the 1 (weak) to 10 (strong) scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Strength(u8);

impl Strength {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 10;

    pub const fn new(value: u8) -> Option<Self> {
        if value >= Self::MIN && value <= Self::MAX {
            Some(Self(value))
        } else {
            None
        }
    }

    /// Uniform draw over the whole scale.
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self(rng.gen_range(Self::MIN..=Self::MAX))
    }

    pub const fn value(self) -> u8 {
        self.0
    }

    pub const fn bucket(self) -> StrengthBucket {
        StrengthBucket::of(self.0)
    }
}

impl TryFrom<u8> for Strength {
    type Error = StrengthOutOfRange;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Strength::new(value).ok_or(StrengthOutOfRange(value))
    }
}

impl From<Strength> for u8 {
    fn from(value: Strength) -> Self {
        value.0
    }
}

impl fmt::Display for Strength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("card strength {0} is outside 1..=10")]
pub struct StrengthOutOfRange(pub u8);

/// Coarse strength class used as half of a learning context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrengthBucket {
    Weak,
    Medium,
    Strong,
}

impl StrengthBucket {
    pub const ALL: [StrengthBucket; 3] = [
        StrengthBucket::Weak,
        StrengthBucket::Medium,
        StrengthBucket::Strong,
    ];

    /// 1..=3 weak, 4..=7 medium, 8 and up strong.
    pub const fn of(value: u8) -> Self {
        if value <= 3 {
            StrengthBucket::Weak
        } else if value <= 7 {
            StrengthBucket::Medium
        } else {
            StrengthBucket::Strong
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            StrengthBucket::Weak => "weak",
            StrengthBucket::Medium => "medium",
            StrengthBucket::Strong => "strong",
        }
    }
}

impl fmt::Display for StrengthBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}
