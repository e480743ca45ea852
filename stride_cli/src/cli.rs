//! CLI argument definitions and shared statics.

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

pub static FILE_GUARD: OnceLock<tracing_appender::non_blocking::WorkerGuard> = OnceLock::new();
/// Whether the user asked for JSON output (controls structured error output).
pub static JSON_MODE: OnceLock<bool> = OnceLock::new();

/// Default config location; a missing file here falls back to built-in defaults.
pub const DEFAULT_CONFIG: &str = "etc/stride.toml";

#[derive(Parser, Debug)]
#[command(name = "stride", version, about = "Running metrics from noisy GPS fixes")]
pub struct Cli {
    /// Path to config TOML (typed)
    #[arg(long, value_name = "FILE", default_value = DEFAULT_CONFIG)]
    pub config: PathBuf,

    /// Print events and errors as JSON lines instead of text
    #[arg(long, action = ArgAction::SetTrue)]
    pub json: bool,

    /// Console log level (error|warn|info|debug|trace)
    #[arg(long = "log-level", value_name = "LEVEL", default_value = "warn")]
    pub log_level: String,

    /// Command to execute
    #[command(subcommand)]
    pub cmd: Commands,
}

/// Recorded sample log format.
#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum InputFormat {
    Csv,
    Jsonl,
}

impl InputFormat {
    /// Guess from the file extension; anything but `.jsonl`/`.ndjson` reads as CSV.
    pub fn infer(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("jsonl") || ext.eq_ignore_ascii_case("ndjson") => {
                InputFormat::Jsonl
            }
            _ => InputFormat::Csv,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Replay a recorded sample log and report the run
    Replay {
        /// Sample log (CSV with strict header, or JSON lines)
        #[arg(long, value_name = "FILE")]
        input: PathBuf,
        /// Input format; inferred from the extension when omitted
        #[arg(long, value_enum)]
        format: Option<InputFormat>,
        /// Emulate the UI refresh loop and print a line per tick
        #[arg(long, action = ArgAction::SetTrue)]
        timeline: bool,
        /// Append the run summary to this history file
        #[arg(long, value_name = "FILE")]
        history: Option<PathBuf>,
    },
    /// Run a synthetic runner through the engine
    Simulate {
        /// Run length in seconds
        #[arg(long)]
        seconds: u64,
        /// Runner speed in meters per second
        #[arg(long = "speed-mps", default_value_t = 3.0)]
        speed_mps: f64,
        /// Noise seed
        #[arg(long, default_value_t = 1)]
        seed: u32,
        /// Pace fixes with the wall clock through a background feed (Ctrl-C stops)
        #[arg(long, action = ArgAction::SetTrue)]
        realtime: bool,
        /// Append the run summary to this history file
        #[arg(long, value_name = "FILE")]
        history: Option<PathBuf>,
    },
    /// List stored runs, newest first
    History {
        /// History file; defaults to history.file from the config
        #[arg(long, value_name = "FILE")]
        file: Option<PathBuf>,
    },
}
