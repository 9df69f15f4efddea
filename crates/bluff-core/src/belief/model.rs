use super::context::{ContextKey, ContextStat};
use crate::model::claim::Claim;
use crate::model::strength::Strength;
use std::collections::BTreeMap;
use tracing::{Level, event};

/// Assumed baseline human bluff rate for a context never seen before.
pub const DEFAULT_PRIOR: f64 = 0.35;

/// Per-context statistics of how often the human bluffs.
///
/// One instance belongs to one session and is passed explicitly to every turn. Starting a
/// new game with the same model keeps everything it has learned.
#[derive(Debug, Clone, PartialEq)]
pub struct BeliefModel {
    stats: BTreeMap<ContextKey, ContextStat>,
    prior: f64,
}

impl Default for BeliefModel {
    fn default() -> Self {
        Self::new()
    }
}

impl BeliefModel {
    pub fn new() -> Self {
        Self {
            stats: BTreeMap::new(),
            prior: DEFAULT_PRIOR,
        }
    }

    /// `None` unless `prior` lies strictly inside (0, 1).
    pub fn with_prior(prior: f64) -> Option<Self> {
        (prior > 0.0 && prior < 1.0).then(|| Self {
            stats: BTreeMap::new(),
            prior,
        })
    }

    pub(crate) fn from_parts(prior: f64, stats: BTreeMap<ContextKey, ContextStat>) -> Self {
        Self { stats, prior }
    }

    pub fn prior(&self) -> f64 {
        self.prior
    }

    pub fn observe(&mut self, strength: Strength, claim: Claim, was_bluff: bool) {
        let key = ContextKey::of_play(strength, claim);
        let stat = self.stats.entry(key).or_default();
        stat.record(was_bluff);

        event!(
            target: "bluff_core::belief",
            Level::DEBUG,
            bucket = %key.bucket,
            claim = %key.claim,
            was_bluff,
            bluffs = stat.bluffs(),
            total = stat.total(),
        );
    }

    pub fn estimate(&self, strength: Strength, claim: Claim) -> f64 {
        self.estimate_context(ContextKey::of_play(strength, claim))
    }

    pub fn estimate_context(&self, key: ContextKey) -> f64 {
        match self.stats.get(&key) {
            Some(stat) => stat.smoothed_rate(),
            None => self.prior,
        }
    }

    pub fn stat(&self, key: ContextKey) -> Option<ContextStat> {
        self.stats.get(&key).copied()
    }

    /// Observed contexts in key order.
    pub fn contexts(&self) -> impl Iterator<Item = (ContextKey, ContextStat)> + '_ {
        self.stats.iter().map(|(key, stat)| (*key, *stat))
    }

    pub fn total_observations(&self) -> u64 {
        self.stats.values().map(|s| u64::from(s.total())).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.stats.is_empty()
    }
}
