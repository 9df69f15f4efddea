//! Turns a bluff estimate into a call-or-accept decision.

use rand::Rng;
use serde::{Deserialize, Serialize};

pub const DEFAULT_CALL_THRESHOLD: f64 = 0.55;
pub const DEFAULT_NOISE: f64 = 0.05;

/// Threshold rule with a small uniform jitter so identical histories do not always
/// produce identical calls.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DecisionPolicy {
    #[serde(default = "default_threshold")]
    pub call_threshold: f64,
    #[serde(default = "default_noise")]
    pub noise: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CallDecision {
    pub called: bool,
    /// Estimated bluff probability on a 0..=100 scale.
    pub confidence: u8,
}

impl Default for DecisionPolicy {
    fn default() -> Self {
        Self {
            call_threshold: DEFAULT_CALL_THRESHOLD,
            noise: DEFAULT_NOISE,
        }
    }
}

impl DecisionPolicy {
    pub const fn new(call_threshold: f64, noise: f64) -> Self {
        Self {
            call_threshold,
            noise,
        }
    }

    /// Calls when `probability + U[-noise, noise]` exceeds the threshold.
    pub fn decide<R: Rng + ?Sized>(&self, probability: f64, rng: &mut R) -> CallDecision {
        let jitter = if self.noise > 0.0 {
            rng.gen_range(-self.noise..=self.noise)
        } else {
            0.0
        };
        CallDecision {
            called: probability + jitter > self.call_threshold,
            confidence: confidence(probability),
        }
    }
}

pub fn confidence(probability: f64) -> u8 {
    (probability.clamp(0.0, 1.0) * 100.0).round() as u8
}

fn default_threshold() -> f64 {
    DEFAULT_CALL_THRESHOLD
}

fn default_noise() -> f64 {
    DEFAULT_NOISE
}

#[cfg(test)]
mod tests {
    use super::{DecisionPolicy, confidence};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn call_rate(policy: &DecisionPolicy, probability: f64, trials: u64) -> f64 {
        let calls = (0..trials)
            .filter(|seed| {
                let mut rng = StdRng::seed_from_u64(*seed);
                policy.decide(probability, &mut rng).called
            })
            .count();
        calls as f64 / trials as f64
    }

    #[test]
    fn confidence_rounds_to_percent() {
        assert_eq!(confidence(0.35), 35);
        assert_eq!(confidence(11.0 / 13.0), 85);
        assert_eq!(confidence(0.0), 0);
        assert_eq!(confidence(1.0), 100);
    }

    #[test]
    fn estimates_far_from_threshold_are_deterministic() {
        let policy = DecisionPolicy::default();
        assert_eq!(call_rate(&policy, 0.35, 500), 0.0);
        assert_eq!(call_rate(&policy, 11.0 / 13.0, 500), 1.0);
    }

    #[test]
    fn estimates_inside_noise_band_split() {
        let policy = DecisionPolicy::default();
        let rate = call_rate(&policy, 0.55, 2_000);
        assert!(rate > 0.3 && rate < 0.7, "rate {rate}");
    }

    #[test]
    fn same_seed_same_decision() {
        let policy = DecisionPolicy::default();
        let a = policy.decide(0.56, &mut StdRng::seed_from_u64(77));
        let b = policy.decide(0.56, &mut StdRng::seed_from_u64(77));
        assert_eq!(a, b);
    }

    #[test]
    fn zero_noise_is_a_pure_threshold() {
        let policy = DecisionPolicy::new(0.5, 0.0);
        let mut rng = StdRng::seed_from_u64(0);
        assert!(policy.decide(0.51, &mut rng).called);
        assert!(!policy.decide(0.5, &mut rng).called);
    }
}
