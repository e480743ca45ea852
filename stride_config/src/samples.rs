//! Recorded location logs.
//!
//! CSV schema (exact headers):
//! source,timestamp_ms,latitude,longitude,altitude,speed,horizontal_accuracy,vertical_accuracy,speed_accuracy
//!
//! Example:
//! source,timestamp_ms,latitude,longitude,altitude,speed,horizontal_accuracy,vertical_accuracy,speed_accuracy
//! gps,1700000000000,-22.9068,-43.1729,12.5,2.8,3.0,4.0,0.5
//! fused,1700000000400,-22.9068,-43.1729,12.4,2.9,,,
//!
//! An empty accuracy cell means the provider omitted that field. The JSON lines
//! format carries one object per line with the same field names; accuracy
//! fields may be `null` or missing.
use serde::Deserialize;
use std::io::BufRead;
use std::path::Path;
use stride_traits::RawFix;

pub const CSV_HEADERS: [&str; 9] = [
    "source",
    "timestamp_ms",
    "latitude",
    "longitude",
    "altitude",
    "speed",
    "horizontal_accuracy",
    "vertical_accuracy",
    "speed_accuracy",
];

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct SampleRow {
    pub source: String,
    pub timestamp_ms: i64,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub altitude: f64,
    #[serde(default)]
    pub speed: f64,
    #[serde(default)]
    pub horizontal_accuracy: Option<f64>,
    #[serde(default)]
    pub vertical_accuracy: Option<f64>,
    #[serde(default)]
    pub speed_accuracy: Option<f64>,
}

impl From<SampleRow> for RawFix {
    fn from(r: SampleRow) -> Self {
        RawFix {
            source: r.source,
            captured_ms: r.timestamp_ms,
            latitude: r.latitude,
            longitude: r.longitude,
            altitude: r.altitude,
            speed: r.speed,
            horizontal_accuracy: r.horizontal_accuracy,
            vertical_accuracy: r.vertical_accuracy,
            speed_accuracy: r.speed_accuracy,
        }
    }
}

pub fn load_samples_csv(path: &Path) -> eyre::Result<Vec<SampleRow>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|e| eyre::eyre!("open sample CSV {:?}: {}", path, e))?;

    // Enforce exact headers
    let headers = rdr
        .headers()
        .map_err(|e| eyre::eyre!("read CSV headers {:?}: {}", path, e))?
        .clone();
    let actual: Vec<&str> = headers.iter().collect();
    if actual != CSV_HEADERS {
        eyre::bail!(
            "sample CSV must have headers '{}', got: {}",
            CSV_HEADERS.join(","),
            actual.join(",")
        );
    }

    let mut rows = Vec::new();
    for (idx, rec) in rdr.deserialize::<SampleRow>().enumerate() {
        match rec {
            Ok(row) => rows.push(row),
            Err(e) => {
                eyre::bail!("invalid CSV row {}: {}", idx + 2, e);
            }
        }
    }
    Ok(rows)
}

pub fn load_samples_jsonl(path: &Path) -> eyre::Result<Vec<SampleRow>> {
    let file = std::fs::File::open(path)
        .map_err(|e| eyre::eyre!("open sample log {:?}: {}", path, e))?;
    let mut rows = Vec::new();
    for (idx, line) in std::io::BufReader::new(file).lines().enumerate() {
        let line = line.map_err(|e| eyre::eyre!("read sample log {:?}: {}", path, e))?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let row: SampleRow = serde_json::from_str(trimmed)
            .map_err(|e| eyre::eyre!("invalid JSON line {}: {}", idx + 1, e))?;
        rows.push(row);
    }
    Ok(rows)
}
