use crate::model::claim::Claim;
use crate::model::strength::{Strength, StrengthBucket};
use serde::{Deserialize, Serialize};

/// Unit of adaptive learning: how strong the card really was and what was claimed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ContextKey {
    pub bucket: StrengthBucket,
    pub claim: Claim,
}

impl ContextKey {
    pub const fn new(bucket: StrengthBucket, claim: Claim) -> Self {
        Self { bucket, claim }
    }

    pub const fn of_play(strength: Strength, claim: Claim) -> Self {
        Self::new(strength.bucket(), claim)
    }

    /// Every (bucket, claim) pair in a stable order.
    pub fn all() -> impl Iterator<Item = ContextKey> {
        StrengthBucket::ALL
            .into_iter()
            .flat_map(|bucket| Claim::ALL.into_iter().map(move |claim| Self::new(bucket, claim)))
    }
}

/// Running counts for one context. Both counters only grow.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextStat {
    bluffs: u32,
    total: u32,
}

impl ContextStat {
    /// `None` when `bluffs > total`.
    pub const fn from_counts(bluffs: u32, total: u32) -> Option<Self> {
        if bluffs <= total {
            Some(Self { bluffs, total })
        } else {
            None
        }
    }

    pub const fn bluffs(self) -> u32 {
        self.bluffs
    }

    pub const fn total(self) -> u32 {
        self.total
    }

    pub fn record(&mut self, was_bluff: bool) {
        self.total = self.total.saturating_add(1);
        if was_bluff {
            self.bluffs = self.bluffs.saturating_add(1);
        }
    }

    /// Laplace-smoothed bluff rate, (b + 1) / (t + 3).
    pub fn smoothed_rate(self) -> f64 {
        (f64::from(self.bluffs) + 1.0) / (f64::from(self.total) + 3.0)
    }
}

#[cfg(test)]
mod tests {
    use super::{ContextKey, ContextStat};
    use crate::model::claim::Claim;
    use crate::model::strength::{Strength, StrengthBucket};

    #[test]
    fn key_uses_bucket_of_played_strength() {
        let key = ContextKey::of_play(Strength::new(2).unwrap(), Claim::High);
        assert_eq!(key, ContextKey::new(StrengthBucket::Weak, Claim::High));
    }

    #[test]
    fn all_keys_are_distinct() {
        let keys: Vec<_> = ContextKey::all().collect();
        assert_eq!(keys.len(), 9);
        let mut sorted = keys.clone();
        sorted.sort();
        sorted.dedup();
        assert_eq!(sorted.len(), 9);
    }

    #[test]
    fn record_counts_bluffs_and_totals() {
        let mut stat = ContextStat::default();
        stat.record(true);
        stat.record(false);
        stat.record(true);
        assert_eq!((stat.bluffs(), stat.total()), (2, 3));
        assert!((stat.smoothed_rate() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn smoothed_rate_never_hits_the_edges() {
        for total in 0..200u32 {
            for bluffs in [0, total / 2, total] {
                let rate = ContextStat::from_counts(bluffs, total).unwrap().smoothed_rate();
                assert!(rate > 0.0 && rate < 1.0, "b={bluffs} t={total} -> {rate}");
            }
        }
    }

    #[test]
    fn from_counts_rejects_more_bluffs_than_plays() {
        assert!(ContextStat::from_counts(3, 2).is_none());
    }
}
