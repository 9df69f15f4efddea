use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use bluff_core::belief::{BeliefModel, ContextKey};
use bluff_core::game::error::TurnError;
use bluff_core::game::rules::RulesError;
use bluff_core::game::serialization::SessionSnapshot;
use bluff_core::game::state::{GameState, Outcome};
use bluff_core::model::claim::Claim;
use bluff_core::model::player::Actor;
use bluff_core::model::strength::StrengthBucket;
use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{Level, event};

use crate::config::{ResolvedOutputs, SessionConfig};
use crate::export::{CsvHistoryWriter, ExportError, ensure_parent, write_history_jsonl};

/// Scripted stand-in for the human side.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "kebab-case")]
pub enum Strategy {
    /// Never bluffs; claims the bucket of the card it shows.
    AlwaysHonest,
    /// Always bluffs with a high claim.
    AlwaysBluff,
    /// Bluffs at the configured rate with a uniformly random claim.
    #[default]
    Random,
    /// Always claims high, bluffing whenever the best card is not strong.
    BluffHigh,
}

impl Strategy {
    pub fn choose<R: Rng + ?Sized>(
        self,
        game: &GameState,
        bluff_rate: f64,
        rng: &mut R,
    ) -> (Claim, bool) {
        match self {
            Strategy::AlwaysHonest => (honest_claim(game), false),
            Strategy::AlwaysBluff => (Claim::High, true),
            Strategy::Random => {
                let claim = Claim::ALL[rng.gen_range(0..Claim::ALL.len())];
                (claim, rng.gen_bool(bluff_rate))
            }
            Strategy::BluffHigh => {
                let strong = game
                    .preview_card(false)
                    .is_some_and(|card| card.bucket() == StrengthBucket::Strong);
                (Claim::High, !strong)
            }
        }
    }
}

fn honest_claim(game: &GameState) -> Claim {
    match game.preview_card(false).map(|card| card.bucket()) {
        Some(StrengthBucket::Weak) => Claim::Low,
        Some(StrengthBucket::Medium) | None => Claim::Medium,
        Some(StrengthBucket::Strong) => Claim::High,
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct GameSummary {
    pub game: usize,
    pub seed: u64,
    pub rounds: u32,
    pub player_score: u32,
    pub opponent_score: u32,
    pub outcome: &'static str,
    pub player_bluffs: usize,
    pub calls: usize,
    pub bluffs_caught: usize,
}

impl GameSummary {
    fn from_game(index: usize, game: &GameState) -> Self {
        let player_rows = || game.history().by_actor(Actor::Player);
        Self {
            game: index,
            seed: game.seed(),
            rounds: game.round_number() - 1,
            player_score: game.player().score(),
            opponent_score: game.opponent().score(),
            outcome: outcome_label(game.outcome()),
            player_bluffs: player_rows().filter(|r| r.did_bluff).count(),
            calls: player_rows().filter(|r| r.bot_called).count(),
            bluffs_caught: player_rows().filter(|r| r.did_bluff && r.bot_called).count(),
        }
    }
}

pub fn outcome_label(outcome: Option<Outcome>) -> &'static str {
    match outcome {
        Some(Outcome::PlayerWins) => "player",
        Some(Outcome::OpponentWins) => "bot",
        Some(Outcome::Tie) => "tie",
        None => "unfinished",
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct BeliefRow {
    pub bucket: StrengthBucket,
    pub claim: Claim,
    pub bluffs: u32,
    pub total: u32,
    pub estimate: f64,
}

/// Every context with its counts and current estimate, unseen ones included.
pub fn belief_table(belief: &BeliefModel) -> Vec<BeliefRow> {
    ContextKey::all()
        .map(|key| {
            let stat = belief.stat(key).unwrap_or_default();
            BeliefRow {
                bucket: key.bucket,
                claim: key.claim,
                bluffs: stat.bluffs(),
                total: stat.total(),
                estimate: belief.estimate_context(key),
            }
        })
        .collect()
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SimulationReport {
    pub run_id: String,
    pub strategy: Strategy,
    pub games: Vec<GameSummary>,
    pub belief: Vec<BeliefRow>,
    pub player_wins: usize,
    pub opponent_wins: usize,
    pub ties: usize,
}

impl SimulationReport {
    /// Share of player plays the opponent called, over a range of games.
    pub fn call_rate(&self, games: std::ops::Range<usize>) -> f64 {
        let (calls, rounds) = self.games[games]
            .iter()
            .fold((0usize, 0u32), |(c, r), g| (c + g.calls, r + g.rounds));
        if rounds == 0 {
            0.0
        } else {
            calls as f64 / f64::from(rounds)
        }
    }
}

/// Summary details returned after a run that wrote artifacts.
pub struct RunSummary {
    pub report: SimulationReport,
    pub rows_written: usize,
    pub csv_path: PathBuf,
    pub jsonl_path: PathBuf,
    pub summary_path: PathBuf,
    pub snapshot_path: PathBuf,
}

/// Plays a series of games against one belief model, the way a single session would.
pub struct SimulationRunner {
    config: SessionConfig,
}

impl SimulationRunner {
    pub fn new(config: SessionConfig) -> Self {
        Self { config }
    }

    /// Run entirely in memory.
    pub fn play(&self) -> Result<SimulationReport, RunnerError> {
        let (report, _, _) = self.run_with(|_, _| Ok(()))?;
        Ok(report)
    }

    /// Run and write history CSV/JSONL, a JSON summary and the final session snapshot.
    pub fn run(&self, outputs: &ResolvedOutputs) -> Result<RunSummary, RunnerError> {
        let mut csv = CsvHistoryWriter::create(&outputs.history_csv)?;
        ensure_parent(&outputs.history_jsonl)?;
        let mut jsonl = BufWriter::new(File::create(&outputs.history_jsonl)?);
        let mut jsonl_rows = 0usize;

        let (report, last_game, belief) = self.run_with(|index, game| {
            csv.append_game(index, game.history())?;
            jsonl_rows += write_history_jsonl(&mut jsonl, Some(index), game.history())?;
            Ok(())
        })?;
        jsonl.flush()?;
        let rows_written = csv.finish()?;
        debug_assert_eq!(rows_written, jsonl_rows);

        ensure_parent(&outputs.summary_json)?;
        let mut summary = BufWriter::new(File::create(&outputs.summary_json)?);
        serde_json::to_writer_pretty(&mut summary, &report)?;
        summary.flush()?;

        if let Some(game) = last_game.as_ref() {
            ensure_parent(&outputs.snapshot)?;
            std::fs::write(&outputs.snapshot, SessionSnapshot::to_json(game, &belief)?)?;
        }

        Ok(RunSummary {
            report,
            rows_written,
            csv_path: outputs.history_csv.clone(),
            jsonl_path: outputs.history_jsonl.clone(),
            summary_path: outputs.summary_json.clone(),
            snapshot_path: outputs.snapshot.clone(),
        })
    }

    fn run_with<F>(
        &self,
        mut on_game: F,
    ) -> Result<(SimulationReport, Option<GameState>, BeliefModel), RunnerError>
    where
        F: FnMut(usize, &GameState) -> Result<(), RunnerError>,
    {
        let sim = &self.config.simulation;
        let mut master = StdRng::seed_from_u64(self.config.seed.unwrap_or(0));
        let mut player_rng = StdRng::seed_from_u64(master.next_u64());
        let mut belief = BeliefModel::new();
        let mut games = Vec::with_capacity(sim.games);
        let mut last_game = None;

        for index in 0..sim.games {
            let mut game =
                bluff_core::new_game_with_rules(&belief, self.config.rules, master.next_u64())?;
            while !game.is_terminal() {
                let (claim, bluff) = sim.strategy.choose(&game, sim.bluff_rate, &mut player_rng);
                game.play_player_turn(&mut belief, claim, bluff)?;
            }

            let summary = GameSummary::from_game(index, &game);
            event!(
                target: "bluff_cli::simulation",
                Level::INFO,
                game = index,
                seed = summary.seed,
                player_score = summary.player_score,
                opponent_score = summary.opponent_score,
                calls = summary.calls,
                outcome = summary.outcome,
            );
            on_game(index, &game)?;
            games.push(summary);
            last_game = Some(game);
        }

        let count = |label: &str| games.iter().filter(|g| g.outcome == label).count();
        let report = SimulationReport {
            run_id: self.config.run_id.clone(),
            strategy: sim.strategy,
            player_wins: count("player"),
            opponent_wins: count("bot"),
            ties: count("tie"),
            belief: belief_table(&belief),
            games,
        };
        Ok((report, last_game, belief))
    }
}

#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("invalid rules: {0}")]
    Rules(#[from] RulesError),
    #[error("turn rejected: {0}")]
    Turn(#[from] TurnError),
    #[error("{0}")]
    Export(#[from] ExportError),
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
    #[error("failed to serialize summary: {source}")]
    Serialize {
        #[from]
        source: serde_json::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::{SimulationRunner, Strategy, belief_table};
    use crate::config::SessionConfig;
    use bluff_core::belief::BeliefModel;
    use bluff_core::game::state::GameState;
    use bluff_core::model::claim::Claim;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn config(strategy: Strategy, games: usize, seed: u64) -> SessionConfig {
        let mut cfg = SessionConfig::default();
        cfg.seed = Some(seed);
        cfg.simulation.games = games;
        cfg.simulation.strategy = strategy;
        cfg
    }

    #[test]
    fn honest_strategy_never_bluffs_and_claims_its_bucket() {
        let game = GameState::with_seed(10);
        let mut rng = StdRng::seed_from_u64(0);
        let (claim, bluff) = Strategy::AlwaysHonest.choose(&game, 0.5, &mut rng);
        assert!(!bluff);
        let shown = game.preview_card(false).unwrap();
        let expected = match shown.value() {
            1..=3 => Claim::Low,
            4..=7 => Claim::Medium,
            _ => Claim::High,
        };
        assert_eq!(claim, expected);
    }

    #[test]
    fn same_seed_gives_same_report() {
        let a = SimulationRunner::new(config(Strategy::Random, 4, 9)).play().unwrap();
        let b = SimulationRunner::new(config(Strategy::Random, 4, 9)).play().unwrap();
        assert_eq!(a, b);
        assert_eq!(a.games.len(), 4);
        assert_eq!(a.player_wins + a.opponent_wins + a.ties, 4);
    }

    #[test]
    fn honest_player_is_rarely_called() {
        let report = SimulationRunner::new(config(Strategy::AlwaysHonest, 10, 3))
            .play()
            .unwrap();
        assert_eq!(report.call_rate(0..10), 0.0);
        assert!(report.games.iter().all(|g| g.player_bluffs == 0));
    }

    #[test]
    fn habitual_bluffer_gets_called_more_over_time() {
        let report = SimulationRunner::new(config(Strategy::AlwaysBluff, 10, 5))
            .play()
            .unwrap();
        let early = report.call_rate(0..1);
        let late = report.call_rate(5..10);
        assert!(late > early, "early {early} late {late}");
        assert!(late > 0.8);
    }

    #[test]
    fn belief_table_lists_every_context() {
        let mut belief = BeliefModel::new();
        belief.observe(bluff_core::model::strength::Strength::new(2).unwrap(), Claim::High, true);
        let table = belief_table(&belief);
        assert_eq!(table.len(), 9);
        assert_eq!(table.iter().map(|row| row.total).sum::<u32>(), 1);
        assert!(table.iter().filter(|row| row.total == 0).all(|row| row.estimate == 0.35));
    }
}
