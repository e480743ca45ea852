//! Persisted run history.
//!
//! The whole history lives in one JSON document:
//!
//! ```json
//! {"history": [{"when": 1700000000000, "time": 1800, "distance": 5.2, "pace": 5.77, "altimetry": 41.0}]}
//! ```
//!
//! Entries are parsed one by one. An entry that does not match the record
//! shape is read as a zeroed record so one bad entry never hides the rest
//! of the history. Appending never rewrites stored entries.
use serde::{Deserialize, Deserializer, Serialize};
use std::path::Path;

use crate::atomic::write_atomic;

/// Summary of one finished run, exactly as stored.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RunRecord {
    /// Run start, epoch milliseconds.
    #[serde(deserialize_with = "whole_number")]
    pub when: i64,
    /// Elapsed seconds.
    #[serde(deserialize_with = "whole_number")]
    pub time: i64,
    /// Kilometers.
    pub distance: f64,
    /// Overall pace, minutes per kilometer.
    pub pace: f64,
    /// Cumulative elevation change, meters.
    pub altimetry: f64,
}

/// Integer fields also accept floats, truncated toward zero.
#[allow(clippy::cast_possible_truncation)]
fn whole_number<'de, D: Deserializer<'de>>(d: D) -> Result<i64, D::Error> {
    let n = serde_json::Number::deserialize(d)?;
    n.as_i64()
        .or_else(|| n.as_f64().map(|f| f as i64))
        .ok_or_else(|| serde::de::Error::custom(format!("{n} is not a number of seconds or milliseconds")))
}

#[derive(Debug, Deserialize)]
struct RawDocument {
    #[serde(default)]
    history: Vec<serde_json::Value>,
}

#[derive(Debug, Serialize)]
struct Document<'a> {
    history: &'a [RunRecord],
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunHistory {
    records: Vec<RunRecord>,
}

/// Result of loading a history document.
#[derive(Debug, Clone, Default)]
pub struct HistoryLoad {
    pub history: RunHistory,
    /// Number of entries that failed to parse and were zeroed.
    pub replaced: usize,
}

impl RunHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a history document. Only a malformed top-level document is an
    /// error; malformed entries become zeroed records.
    pub fn parse(s: &str) -> eyre::Result<HistoryLoad> {
        if s.trim().is_empty() {
            return Ok(HistoryLoad::default());
        }
        let doc: RawDocument =
            serde_json::from_str(s).map_err(|e| eyre::eyre!("invalid history document: {e}"))?;
        let mut replaced = 0;
        let records = doc
            .history
            .into_iter()
            .map(|v| {
                serde_json::from_value::<RunRecord>(v).unwrap_or_else(|_| {
                    replaced += 1;
                    RunRecord::default()
                })
            })
            .collect();
        Ok(HistoryLoad {
            history: RunHistory { records },
            replaced,
        })
    }

    /// Load from disk; a missing file is an empty history.
    pub fn load(path: &Path) -> eyre::Result<HistoryLoad> {
        match std::fs::read_to_string(path) {
            Ok(text) => Self::parse(&text),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(HistoryLoad::default()),
            Err(e) => Err(eyre::eyre!("read history {:?}: {}", path, e)),
        }
    }

    pub fn to_json(&self) -> eyre::Result<String> {
        serde_json::to_string(&Document {
            history: &self.records,
        })
        .map_err(|e| eyre::eyre!("serialize history: {e}"))
    }

    pub fn save(&self, path: &Path) -> eyre::Result<()> {
        let text = self.to_json()?;
        write_atomic(path, text.as_bytes())
            .map_err(|e| eyre::eyre!("write history {:?}: {}", path, e))
    }

    /// Append `record` to the document at `path` and return the entry count.
    ///
    /// Existing entries are written back as they were stored, including ones
    /// that `parse` would zero. Other top-level keys are kept too.
    pub fn append_to(path: &Path, record: RunRecord) -> eyre::Result<usize> {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => String::new(),
            Err(e) => return Err(eyre::eyre!("read history {:?}: {}", path, e)),
        };
        let mut doc = if text.trim().is_empty() {
            serde_json::Map::new()
        } else {
            serde_json::from_str::<serde_json::Map<String, serde_json::Value>>(&text)
                .map_err(|e| eyre::eyre!("invalid history document: {e}"))?
        };
        let entries = doc
            .entry("history")
            .or_insert_with(|| serde_json::Value::Array(Vec::new()));
        let serde_json::Value::Array(entries) = entries else {
            eyre::bail!("invalid history document: \"history\" is not an array");
        };
        let value =
            serde_json::to_value(record).map_err(|e| eyre::eyre!("serialize history: {e}"))?;
        entries.push(value);
        let count = entries.len();

        let text = serde_json::to_string(&doc).map_err(|e| eyre::eyre!("serialize history: {e}"))?;
        write_atomic(path, text.as_bytes())
            .map_err(|e| eyre::eyre!("write history {:?}: {}", path, e))?;
        Ok(count)
    }

    pub fn push(&mut self, record: RunRecord) {
        self.records.push(record);
    }

    pub fn records(&self) -> &[RunRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records ordered by start time, most recent first.
    pub fn sorted_newest_first(&self) -> Vec<RunRecord> {
        let mut out = self.records.clone();
        out.sort_by(|a, b| b.when.cmp(&a.when));
        out
    }
}
