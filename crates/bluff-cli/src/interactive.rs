use std::fmt::Write as _;
use std::io::{self, BufRead, Write};
use std::path::Path;

use bluff_core::belief::BeliefModel;
use bluff_core::game::error::TurnError;
use bluff_core::game::rules::{GameRules, RulesError};
use bluff_core::game::serialization::{SessionSnapshot, SnapshotError};
use bluff_core::game::state::{GameState, Outcome};
use bluff_core::model::claim::Claim;
use bluff_core::model::history::HistoryLog;
use bluff_core::model::player::Actor;
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use thiserror::Error;

use crate::export::{ExportError, ensure_parent, write_history_csv};
use crate::simulation::belief_table;

const HELP: &str = "\
commands:
  <low|medium|high> [bluff]   play a card with that claim (add 'bluff' to play your weakest)
  hand                        show your hand and the score
  log                         show this game's history
  timeline                    show when you bluffed this game (B) and played honest (H)
  stats                       show what the bot has learned about you
  new                         start a new game (the bot keeps its memory)
  save <path> / load <path>   write or read the whole session as JSON
  export <path>               write this game's history as CSV
  help                        show this text
  quit                        leave";

/// One human at the table: a belief model that lives for the whole session and the
/// game currently in progress.
pub struct Session {
    belief: BeliefModel,
    game: GameState,
    rules: GameRules,
    deals: StdRng,
}

/// Text to show after a command, and whether the session should end.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub text: String,
    pub quit: bool,
}

impl Reply {
    fn show(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            quit: false,
        }
    }
}

impl Session {
    pub fn new(rules: GameRules, seed: u64) -> Result<Self, RulesError> {
        let mut deals = StdRng::seed_from_u64(seed);
        let belief = bluff_core::new_belief_model();
        let game = bluff_core::new_game_with_rules(&belief, rules, deals.next_u64())?;
        Ok(Self {
            belief,
            game,
            rules,
            deals,
        })
    }

    pub fn game(&self) -> &GameState {
        &self.game
    }

    pub fn belief(&self) -> &BeliefModel {
        &self.belief
    }

    /// Discard the current game and deal a new one against the same belief model.
    pub fn new_game(&mut self) -> Result<(), RulesError> {
        self.game =
            bluff_core::new_game_with_rules(&self.belief, self.rules, self.deals.next_u64())?;
        Ok(())
    }

    pub fn handle(&mut self, line: &str) -> Result<Reply, SessionError> {
        let mut words = line.split_whitespace();
        let Some(command) = words.next() else {
            return Ok(Reply::show(""));
        };
        let argument = words.next();

        match command.to_ascii_lowercase().as_str() {
            "help" | "?" => Ok(Reply::show(HELP)),
            "quit" | "exit" => Ok(Reply {
                text: "bye".to_string(),
                quit: true,
            }),
            "hand" | "status" => Ok(Reply::show(self.status())),
            "log" => Ok(Reply::show(self.log())),
            "timeline" => Ok(Reply::show(format!(
                "Bluff timeline: {}",
                bluff_timeline(self.game.history())
            ))),
            "stats" => Ok(Reply::show(self.stats())),
            "new" => {
                self.new_game()?;
                Ok(Reply::show(format!(
                    "{}\n{}",
                    self.game.last_message(),
                    self.status()
                )))
            }
            "save" => {
                let path = argument.ok_or(SessionError::MissingArgument("path"))?;
                ensure_parent(Path::new(path))?;
                std::fs::write(path, SessionSnapshot::to_json(&self.game, &self.belief)?)?;
                Ok(Reply::show(format!("session saved to {path}")))
            }
            "load" => {
                let path = argument.ok_or(SessionError::MissingArgument("path"))?;
                let json = std::fs::read_to_string(path)?;
                let (game, belief) = SessionSnapshot::from_json(&json)?.restore()?;
                self.rules = *game.rules();
                self.game = game;
                self.belief = belief;
                Ok(Reply::show(format!("session loaded from {path}\n{}", self.status())))
            }
            "export" => {
                let path = argument.ok_or(SessionError::MissingArgument("path"))?;
                let rows = write_history_csv(Path::new(path), self.game.history())?;
                Ok(Reply::show(format!("wrote {rows} rows to {path}")))
            }
            _ => {
                let claim: Claim = command.parse().map_err(TurnError::from)?;
                let bluff = match argument.map(str::to_ascii_lowercase).as_deref() {
                    None | Some("honest") => false,
                    Some("bluff") => true,
                    Some(other) => return Err(SessionError::UnknownIntent(other.to_string())),
                };
                self.play(claim, bluff)
            }
        }
    }

    fn play(&mut self, claim: Claim, bluff: bool) -> Result<Reply, SessionError> {
        let report = self.game.play_player_turn(&mut self.belief, claim, bluff)?;
        let mut text = format!(
            "You played {} claiming {}. {}\nBot played a card claiming {}: {}",
            report.player.actual_strength,
            claim,
            self.game.last_message(),
            report.opponent.claim,
            report.opponent.result,
        );
        let _ = write!(
            text,
            "\nScore: you {} | bot {}",
            self.game.player().score(),
            self.game.opponent().score()
        );
        if let Some(outcome) = self.game.outcome() {
            text.push('\n');
            text.push_str(final_verdict(outcome));
        }
        Ok(Reply::show(text))
    }

    fn status(&self) -> String {
        let game = &self.game;
        let hand = if game.player().hand().is_empty() {
            "empty".to_string()
        } else {
            game.player()
                .hand()
                .iter()
                .map(|card| card.to_string())
                .collect::<Vec<_>>()
                .join(" ")
        };
        let mut text = format!(
            "Round {} / {}\nYour hand: {hand}\nBot hand: {} hidden cards\nScore: you {} | bot {}\nAI suspicion meter (your bluff rate): {:.0}%",
            game.display_round(),
            game.rules().max_rounds,
            game.opponent().hand().len(),
            game.player().score(),
            game.opponent().score(),
            game.history().player_bluff_rate() * 100.0,
        );
        if let Some(outcome) = game.outcome() {
            text.push('\n');
            text.push_str(final_verdict(outcome));
        }
        text
    }

    fn log(&self) -> String {
        if self.game.history().is_empty() {
            return "no moves yet".to_string();
        }
        let mut text = String::from("round actor  card claim  bluff called result");
        for record in self.game.history() {
            let _ = write!(
                text,
                "\n{:>5} {:<6} {:>4} {:<6} {:>5} {:>6} {}",
                record.round,
                record.actor,
                record.actual_strength,
                record.claim,
                u8::from(record.did_bluff),
                u8::from(record.bot_called),
                record.result,
            );
        }
        text
    }

    fn stats(&self) -> String {
        let mut text = format!(
            "bucket  claim   bluffs/plays  estimate (prior {:.0}%)",
            self.belief.prior() * 100.0
        );
        for row in belief_table(&self.belief) {
            let _ = write!(
                text,
                "\n{:<7} {:<7} {:>6}/{:<5} {:>7.0}%",
                row.bucket,
                row.claim,
                row.bluffs,
                row.total,
                row.estimate * 100.0
            );
        }
        let history = self.game.history();
        let player_plays = history.by_actor(Actor::Player).count();
        let _ = write!(
            text,
            "\nplays this game: {player_plays}\nbluff timeline: {}",
            bluff_timeline(history)
        );
        text
    }
}

/// One `r<round> B|H` entry per player action, `-` before the first play.
fn bluff_timeline(history: &HistoryLog) -> String {
    let timeline = history.bluff_timeline();
    if timeline.is_empty() {
        return "-".to_string();
    }
    timeline
        .iter()
        .map(|&(round, bluffed)| format!("r{round} {}", if bluffed { 'B' } else { 'H' }))
        .collect::<Vec<_>>()
        .join(" ")
}

fn final_verdict(outcome: Outcome) -> &'static str {
    match outcome {
        Outcome::PlayerWins => "Game finished! You outbluffed the AI!",
        Outcome::OpponentWins => "Game finished! BluffBot wins, it learned your patterns!",
        Outcome::Tie => "Game finished! Tie game!",
    }
}

/// Read commands line by line until `quit` or end of input.
pub fn run<R: BufRead, W: Write>(
    session: &mut Session,
    input: R,
    mut output: W,
) -> io::Result<()> {
    writeln!(output, "{}\n{}", session.game().last_message(), session.status())?;
    writeln!(output, "type 'help' for commands")?;
    for line in input.lines() {
        let line = line?;
        match session.handle(&line) {
            Ok(reply) => {
                if !reply.text.is_empty() {
                    writeln!(output, "{}", reply.text)?;
                }
                if reply.quit {
                    break;
                }
            }
            Err(err) => writeln!(output, "error: {err}")?,
        }
        output.flush()?;
    }
    Ok(())
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Turn(#[from] TurnError),
    #[error("invalid rules: {0}")]
    Rules(#[from] RulesError),
    #[error("snapshot error: {0}")]
    Snapshot(#[from] SnapshotError),
    #[error("export failed: {0}")]
    Export(#[from] ExportError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to encode session: {0}")]
    Json(#[from] serde_json::Error),
    #[error("missing argument: {0}")]
    MissingArgument(&'static str),
    #[error("expected 'bluff' or 'honest', got '{0}'")]
    UnknownIntent(String),
}
