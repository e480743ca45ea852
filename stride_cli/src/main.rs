#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]

mod cli;
mod error_fmt;
mod run;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use clap::Parser;
use eyre::WrapErr;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use crate::cli::{Cli, Commands, DEFAULT_CONFIG, FILE_GUARD, InputFormat, JSON_MODE};
use crate::error_fmt::{exit_code_for_error, format_error_json, humanize};
use crate::run::Output;

fn main() {
    let cli = Cli::parse();
    let _ = JSON_MODE.set(cli.json);

    if let Err(e) = real_main(cli) {
        let code = exit_code_for_error(&e);
        if JSON_MODE.get().copied().unwrap_or(false) {
            println!("{}", format_error_json(&e));
        } else {
            eprintln!("{}", humanize(&e));
        }
        tracing::debug!(error = ?e, code, "exiting with error");
        std::process::exit(code);
    }
}

fn real_main(cli: Cli) -> eyre::Result<()> {
    if !cli.json {
        // Pretty panic/error reports for humans; JSON mode keeps stderr machine-friendly.
        let _ = color_eyre::install();
    }

    let cfg = load_config(&cli.config)?;
    init_tracing(&cli, &cfg.logging)?;
    cfg.validate()?;
    tracing::debug!(config = %cli.config.display(), "config loaded");

    let out = Output { json: cli.json };
    match cli.cmd {
        Commands::Replay {
            input,
            format,
            timeline,
            history,
        } => {
            let format = format.unwrap_or_else(|| InputFormat::infer(&input));
            let fixes = run::load_fixes(&input, format)?;
            let summary = if timeline {
                run::replay_timeline(&cfg, fixes, &out)?
            } else {
                run::replay_batch(&cfg, fixes)?
            };
            out.emit(&run::Event::Summary(summary));
            if let Some(path) = history_path(history, &cfg) {
                run::record_run(&path, summary)?;
            }
        }
        Commands::Simulate {
            seconds,
            speed_mps,
            seed,
            realtime,
            history,
        } => {
            if !(speed_mps.is_finite() && speed_mps >= 0.0) {
                eyre::bail!("--speed-mps must be >= 0");
            }
            let summary = if realtime {
                let shutdown = Arc::new(AtomicBool::new(false));
                let flag = shutdown.clone();
                if let Err(e) = ctrlc::set_handler(move || flag.store(true, Ordering::Relaxed)) {
                    tracing::warn!(error = %e, "could not install Ctrl-C handler");
                }
                run::simulate_realtime(&cfg, seconds, speed_mps, seed, &shutdown, &out)?
            } else {
                run::simulate(&cfg, seconds, speed_mps, seed, &out)?
            };
            out.emit(&run::Event::Summary(summary));
            if let Some(path) = history_path(history, &cfg) {
                run::record_run(&path, summary)?;
            }
        }
        Commands::History { file } => {
            let Some(path) = history_path(file, &cfg) else {
                eyre::bail!("no history file: pass --file or set history.file in the config");
            };
            run::list_history(&path, &out)?;
        }
    }
    Ok(())
}

/// Read and parse the config. The default path may be absent; an explicit one may not.
fn load_config(path: &Path) -> eyre::Result<stride_config::Config> {
    if !path.exists() && path == Path::new(DEFAULT_CONFIG) {
        return Ok(stride_config::Config::default());
    }
    let text = std::fs::read_to_string(path)
        .wrap_err_with(|| format!("read config {}", path.display()))?;
    stride_config::load_toml(&text).wrap_err_with(|| format!("parse config {}", path.display()))
}

fn history_path(arg: Option<PathBuf>, cfg: &stride_config::Config) -> Option<PathBuf> {
    arg.or_else(|| cfg.history.file.as_ref().map(PathBuf::from))
}

/// Console logs go to stderr (JSON with --json); an optional file sink writes JSON lines.
fn init_tracing(cli: &Cli, logging: &stride_config::Logging) -> eyre::Result<()> {
    let level = logging.level.as_deref().unwrap_or(&cli.log_level);
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .wrap_err_with(|| format!("invalid log level '{level}'"))?;

    let console = if cli.json {
        fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .with_target(false)
            .boxed()
    } else {
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
            .boxed()
    };

    let file_layer = match logging.file.as_deref() {
        Some(file) => {
            let path = Path::new(file);
            let dir = path.parent().filter(|p| !p.as_os_str().is_empty()).unwrap_or(Path::new("."));
            let name = path
                .file_name()
                .map_or_else(|| "stride.log".into(), |n| n.to_string_lossy().into_owned());
            let appender = match logging.rotation.as_deref() {
                Some("daily") => tracing_appender::rolling::daily(dir, name),
                Some("hourly") => tracing_appender::rolling::hourly(dir, name),
                _ => tracing_appender::rolling::never(dir, name),
            };
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let _ = FILE_GUARD.set(guard);
            Some(fmt::layer().json().with_writer(writer).boxed())
        }
        None => None,
    };

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(console)
        .with(file_layer)
        .try_init();
    Ok(())
}
