use bluff_core::game::rules::GameRules;
use serde::Deserialize;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::Level;

use crate::simulation::Strategy;

const DEFAULT_GAMES: usize = 20;
const MAX_GAMES: usize = 100_000;
const RUN_ID_ALLOWED: &str = "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789._-";

/// Root session configuration loaded from YAML. Every block is optional.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct SessionConfig {
    #[serde(default = "default_run_id")]
    pub run_id: String,
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default)]
    pub rules: GameRules,
    #[serde(default)]
    pub simulation: SimulationConfig,
    #[serde(default)]
    pub outputs: OutputsConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            run_id: default_run_id(),
            seed: None,
            rules: GameRules::default(),
            simulation: SimulationConfig::default(),
            outputs: OutputsConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl SessionConfig {
    /// Load configuration from a YAML file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let path_buf = path.to_path_buf();
        let file = File::open(path).map_err(|source| ConfigError::Read {
            source,
            path: path_buf.clone(),
        })?;
        let reader = BufReader::new(file);
        let mut cfg: SessionConfig =
            serde_yaml::from_reader(reader).map_err(|source| ConfigError::Parse {
                source,
                path: path_buf.clone(),
            })?;
        cfg.validate().map_err(|source| ConfigError::Invalid {
            path: path_buf,
            source,
        })?;
        Ok(cfg)
    }

    /// Validate the configuration without performing I/O.
    pub fn validate(&mut self) -> Result<(), ValidationError> {
        validate_run_id(&self.run_id)?;
        self.rules
            .validate()
            .map_err(|err| ValidationError::InvalidField {
                field: "rules".to_string(),
                message: err.to_string(),
            })?;
        self.simulation.validate()?;
        self.outputs.validate()?;
        self.logging.normalize();
        Ok(())
    }

    /// Resolve output templates (`{run_id}` placeholders) into concrete paths.
    pub fn resolved_outputs(&self) -> ResolvedOutputs {
        let dir = resolve_template(&self.run_id, &self.outputs.dir);
        ResolvedOutputs {
            history_csv: dir.join("history.csv"),
            history_jsonl: dir.join("history.jsonl"),
            summary_json: dir.join("summary.json"),
            snapshot: dir.join("session.json"),
            dir,
        }
    }
}

fn default_run_id() -> String {
    "session".to_string()
}

/// Scripted-player simulation block.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct SimulationConfig {
    #[serde(default = "default_games")]
    pub games: usize,
    #[serde(default)]
    pub strategy: Strategy,
    /// Bluff probability used by the `random` strategy.
    #[serde(default = "default_bluff_rate")]
    pub bluff_rate: f64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            games: DEFAULT_GAMES,
            strategy: Strategy::default(),
            bluff_rate: default_bluff_rate(),
        }
    }
}

impl SimulationConfig {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.games == 0 || self.games > MAX_GAMES {
            return Err(ValidationError::InvalidField {
                field: "simulation.games".to_string(),
                message: format!("number of games must be within 1..={MAX_GAMES}"),
            });
        }
        if !(0.0..=1.0).contains(&self.bluff_rate) {
            return Err(ValidationError::InvalidField {
                field: "simulation.bluff_rate".to_string(),
                message: "bluff rate must lie within [0, 1]".to_string(),
            });
        }
        Ok(())
    }
}

fn default_games() -> usize {
    DEFAULT_GAMES
}

fn default_bluff_rate() -> f64 {
    0.5
}

/// Output artifact configuration.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct OutputsConfig {
    #[serde(default = "default_output_dir")]
    pub dir: String,
}

impl Default for OutputsConfig {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
        }
    }
}

impl OutputsConfig {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.dir.trim().is_empty() {
            return Err(ValidationError::InvalidField {
                field: "outputs.dir".to_string(),
                message: "path must not be empty".to_string(),
            });
        }
        Ok(())
    }
}

fn default_output_dir() -> String {
    "out/{run_id}".to_string()
}

/// Logging configuration defaults to disabled structured logs.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct LoggingConfig {
    #[serde(default)]
    pub enable_structured: bool,
    #[serde(default = "default_tracing_level")]
    pub tracing_level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enable_structured: false,
            tracing_level: default_tracing_level(),
        }
    }
}

impl LoggingConfig {
    fn normalize(&mut self) {
        if self.tracing_level.trim().is_empty() {
            self.tracing_level = default_tracing_level();
        }
    }

    pub fn level(&self) -> Option<Level> {
        match self.tracing_level.to_ascii_lowercase().as_str() {
            "trace" => Some(Level::TRACE),
            "debug" => Some(Level::DEBUG),
            "info" => Some(Level::INFO),
            "warn" | "warning" => Some(Level::WARN),
            "error" => Some(Level::ERROR),
            _ => None,
        }
    }
}

fn default_tracing_level() -> String {
    "info".to_string()
}

fn validate_run_id(run_id: &str) -> Result<(), ValidationError> {
    if run_id.trim().is_empty() {
        return Err(ValidationError::InvalidField {
            field: "run_id".to_string(),
            message: "run_id must not be empty".to_string(),
        });
    }

    if !run_id.chars().all(|c| RUN_ID_ALLOWED.contains(c)) {
        return Err(ValidationError::InvalidField {
            field: "run_id".to_string(),
            message: "run_id may only contain alphanumeric characters, '.', '_' or '-'".to_string(),
        });
    }

    Ok(())
}

fn resolve_template(run_id: &str, template: &str) -> PathBuf {
    PathBuf::from(template.replace("{run_id}", run_id))
}

/// Fully resolved output paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedOutputs {
    pub dir: PathBuf,
    pub history_csv: PathBuf,
    pub history_jsonl: PathBuf,
    pub summary_json: PathBuf,
    pub snapshot: PathBuf,
}

/// Errors surfaced when loading configuration files.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path:?}: {source}")]
    Read {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },
    #[error("failed to parse config {path:?}: {source}")]
    Parse {
        #[source]
        source: serde_yaml::Error,
        path: PathBuf,
    },
    #[error("invalid configuration in {path:?}: {source}")]
    Invalid {
        path: PathBuf,
        source: ValidationError,
    },
}

/// Validation failures captured with contextual metadata.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("{field}: {message}")]
    InvalidField { field: String, message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASIC_YAML: &str = r#"
run_id: "evening_01"
seed: 123
rules:
  hand_size: 6
  max_rounds: 8
  policy:
    call_threshold: 0.6
simulation:
  games: 5
  strategy: "bluff-high"
outputs:
  dir: "out/{run_id}/logs"
logging:
  enable_structured: true
  tracing_level: "debug"
"#;

    #[test]
    fn loads_and_validates_basic_config() {
        let mut cfg: SessionConfig = serde_yaml::from_str(BASIC_YAML).expect("parse yaml");
        cfg.validate().expect("validate");

        assert_eq!(cfg.seed, Some(123));
        assert_eq!(cfg.rules.hand_size, 6);
        assert_eq!(cfg.rules.policy.call_threshold, 0.6);
        assert_eq!(cfg.rules.policy.noise, 0.05);
        assert_eq!(cfg.simulation.strategy, Strategy::BluffHigh);
        assert_eq!(cfg.logging.level(), Some(Level::DEBUG));

        let outputs = cfg.resolved_outputs();
        assert_eq!(
            outputs.history_csv,
            PathBuf::from("out/evening_01/logs/history.csv")
        );
    }

    #[test]
    fn empty_document_uses_defaults() {
        let mut cfg: SessionConfig = serde_yaml::from_str("{}").expect("parse");
        cfg.validate().expect("defaults validate");
        assert_eq!(cfg, SessionConfig::default());
        assert_eq!(cfg.simulation.games, DEFAULT_GAMES);
    }

    #[test]
    fn rejects_invalid_run_id() {
        let yaml = BASIC_YAML.replace("evening_01", "evening 01");
        let mut cfg: SessionConfig = serde_yaml::from_str(&yaml).expect("parse");
        let err = cfg.validate().expect_err("invalid run id");
        assert!(matches!(
            err,
            ValidationError::InvalidField { field, .. } if field == "run_id"
        ));
    }

    #[test]
    fn rejects_invalid_rules() {
        let yaml = BASIC_YAML.replace("max_rounds: 8", "max_rounds: 0");
        let mut cfg: SessionConfig = serde_yaml::from_str(&yaml).expect("parse");
        let err = cfg.validate().expect_err("invalid rules");
        assert!(matches!(
            err,
            ValidationError::InvalidField { field, message } if field == "rules" && message.contains("max_rounds")
        ));
    }

    #[test]
    fn rejects_zero_games() {
        let yaml = BASIC_YAML.replace("games: 5", "games: 0");
        let mut cfg: SessionConfig = serde_yaml::from_str(&yaml).expect("parse");
        assert!(cfg.validate().is_err());
    }
}
