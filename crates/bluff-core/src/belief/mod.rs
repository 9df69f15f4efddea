//! Adaptive estimate of how often the human bluffs.
//!
//! - `context`: the (strength bucket, claim) key and its running counts.
//! - `model`: the per-session store that observes plays and produces smoothed estimates.

mod context;
mod model;

pub use context::{ContextKey, ContextStat};
pub use model::{BeliefModel, DEFAULT_PRIOR};
