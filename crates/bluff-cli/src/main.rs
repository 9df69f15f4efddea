use std::io;
use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};

use bluff_cli::config::{ResolvedOutputs, SessionConfig};
use bluff_cli::interactive::{self, Session};
use bluff_cli::logging::init_logging;
use bluff_cli::simulation::{SimulationRunner, Strategy};

/// Bluffing card game against an opponent that learns your habits.
#[derive(Debug, Parser)]
#[command(
    name = "bluff",
    author,
    version,
    about = "Bluff against a bot that learns when you lie"
)]
struct Cli {
    /// Path to a YAML configuration file. Defaults apply when omitted.
    #[arg(short, long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Override the RNG seed.
    #[arg(long, value_name = "SEED", global = true)]
    seed: Option<u64>,

    /// Override the run identifier (substitutes {run_id} templates).
    #[arg(long, value_name = "RUN_ID", global = true)]
    run_id: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Play interactively on the terminal (the default).
    Play,
    /// Pit a scripted player against the bot for a series of games.
    Simulate {
        /// Override the number of games.
        #[arg(long, value_name = "GAMES")]
        games: Option<usize>,

        /// Override the scripted player's strategy.
        #[arg(long, value_enum)]
        strategy: Option<Strategy>,

        /// Override the bluff probability of the `random` strategy.
        #[arg(long, value_name = "RATE")]
        bluff_rate: Option<f64>,

        /// Exit after validating the configuration (no games are played).
        #[arg(long)]
        validate_only: bool,
    },
    /// Check the configuration and exit.
    Validate,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut config = match cli.config.as_ref() {
        Some(path) => SessionConfig::from_path(path)?,
        None => SessionConfig::default(),
    };

    if let Some(run_id) = cli.run_id {
        config.run_id = run_id;
    }

    if let Some(seed) = cli.seed {
        config.seed = Some(seed);
    }

    let command = cli.command.unwrap_or(Command::Play);
    let mut validate_only = matches!(command, Command::Validate);
    if let Command::Simulate {
        games,
        strategy,
        bluff_rate,
        validate_only: only,
    } = &command
    {
        if let Some(games) = games {
            config.simulation.games = *games;
        }
        if let Some(strategy) = strategy {
            config.simulation.strategy = *strategy;
        }
        if let Some(rate) = bluff_rate {
            config.simulation.bluff_rate = *rate;
        }
        validate_only |= *only;
    }

    config.validate()?;

    let outputs: ResolvedOutputs = config.resolved_outputs();
    if validate_only {
        println!(
            "Configuration '{}' is valid: hand size {}, {} rounds max.",
            config.run_id, config.rules.hand_size, config.rules.max_rounds
        );
        return Ok(());
    }

    let logging_guard = init_logging(&config.logging, &outputs.dir)?;

    match command {
        Command::Simulate { .. } => {
            let run_id = config.run_id.clone();
            let strategy = config.simulation.strategy;
            let summary = SimulationRunner::new(config)
                .run(&outputs)
                .with_context(|| format!("simulation '{run_id}' failed"))?;
            let report = &summary.report;
            println!(
                "Simulation '{run_id}' ({strategy:?}): {} games, you {} | bot {} | ties {}",
                report.games.len(),
                report.player_wins,
                report.opponent_wins,
                report.ties
            );
            let half = report.games.len() / 2;
            println!(
                "Call rate: first half {:.0}%, second half {:.0}%",
                report.call_rate(0..half) * 100.0,
                report.call_rate(half..report.games.len()) * 100.0
            );
            println!(
                "History: {} rows at {}",
                summary.rows_written,
                summary.csv_path.display()
            );
            println!("History (JSONL): {}", summary.jsonl_path.display());
            println!("Summary: {}", summary.summary_path.display());
            println!("Session snapshot: {}", summary.snapshot_path.display());
        }
        Command::Play | Command::Validate => {
            let seed = config.seed.unwrap_or_else(rand::random);
            let mut session = Session::new(config.rules, seed)?;
            let stdin = io::stdin();
            interactive::run(&mut session, stdin.lock(), io::stdout().lock())
                .context("terminal session failed")?;
        }
    }

    if let Some(guard) = logging_guard.as_ref() {
        println!("Telemetry log: {}", guard.telemetry_path.display());
    }

    Ok(())
}
