use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use bluff_core::model::history::{HistoryLog, TurnRecord};
use serde::Serialize;
use thiserror::Error;

/// One log row as spreadsheet tools expect it: flags as 0/1, result as text.
#[derive(Debug, Serialize)]
pub struct HistoryRow<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub game: Option<usize>,
    pub round: u32,
    pub actor: &'a str,
    pub actual_strength: u8,
    pub claim: &'a str,
    pub did_bluff: u8,
    pub bot_called: u8,
    pub result: &'a str,
}

impl<'a> HistoryRow<'a> {
    pub fn new(game: Option<usize>, record: &'a TurnRecord) -> Self {
        Self {
            game,
            round: record.round,
            actor: record.actor.as_str(),
            actual_strength: record.actual_strength.value(),
            claim: record.claim.as_str(),
            did_bluff: u8::from(record.did_bluff),
            bot_called: u8::from(record.bot_called),
            result: record.result.description(),
        }
    }
}

/// Write a single game's log as CSV with a header row.
pub fn write_history_csv(path: &Path, history: &HistoryLog) -> Result<usize, ExportError> {
    ensure_parent(path)?;
    let mut writer = csv::Writer::from_writer(BufWriter::new(File::create(path)?));
    let mut rows = 0usize;
    for record in history {
        writer.serialize(HistoryRow::new(None, record))?;
        rows += 1;
    }
    writer.flush()?;
    Ok(rows)
}

/// Streams rows from several games into one CSV file.
pub struct CsvHistoryWriter {
    writer: csv::Writer<BufWriter<File>>,
    rows: usize,
}

impl CsvHistoryWriter {
    pub fn create(path: &Path) -> Result<Self, ExportError> {
        ensure_parent(path)?;
        Ok(Self {
            writer: csv::Writer::from_writer(BufWriter::new(File::create(path)?)),
            rows: 0,
        })
    }

    pub fn append_game(&mut self, game: usize, history: &HistoryLog) -> Result<(), ExportError> {
        for record in history {
            self.writer.serialize(HistoryRow::new(Some(game), record))?;
            self.rows += 1;
        }
        Ok(())
    }

    pub fn finish(mut self) -> Result<usize, ExportError> {
        self.writer.flush()?;
        Ok(self.rows)
    }
}

/// Append each record as one JSON object per line.
pub fn write_history_jsonl<W: Write>(
    writer: &mut W,
    game: Option<usize>,
    history: &HistoryLog,
) -> Result<usize, ExportError> {
    let mut rows = 0usize;
    for record in history {
        serde_json::to_writer(&mut *writer, &HistoryRow::new(game, record))?;
        writer.write_all(b"\n")?;
        rows += 1;
    }
    Ok(rows)
}

pub(crate) fn ensure_parent(path: &Path) -> Result<(), ExportError> {
    if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        fs::create_dir_all(dir)?;
    }
    Ok(())
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
    #[error("failed to write CSV row: {source}")]
    Csv {
        #[from]
        source: csv::Error,
    },
    #[error("failed to serialize log row: {source}")]
    Serialize {
        #[from]
        source: serde_json::Error,
    },
}
