//! Run drivers: batch replay, the emulated UI refresh loop and the real-time simulator.

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use chrono::{Local, TimeZone};
use eyre::WrapErr;
use serde_json::json;
use stride_config::{Config, RunHistory, RunRecord};
use stride_core::provider_error::map_provider_error;
use stride_core::{
    AnnounceCfg, Announcement, Announcer, Dashboard, EngineCfg, Feed, MetricsEngine, RunSession,
    RunSummary, Sample, StrideError, format_elapsed, format_pace,
};
use stride_providers::{ReplayProvider, SimulatedProvider, SimulatedRun};
use stride_traits::{Clock, LocationProvider, ManualClock, RawFix, SystemClock};

use crate::cli::InputFormat;

/// What a run driver reports, in order.
#[derive(Debug)]
pub enum Event {
    Tick(Dashboard),
    Announce(Announcement),
    Summary(RunSummary),
}

/// Renders events as text or JSON lines on stdout.
#[derive(Debug, Clone, Copy)]
pub struct Output {
    pub json: bool,
}

impl Output {
    pub fn emit(&self, ev: &Event) {
        if self.json {
            println!("{}", event_json(ev));
        } else {
            println!("{}", event_text(ev));
        }
    }
}

fn event_json(ev: &Event) -> serde_json::Value {
    match ev {
        Event::Tick(d) => json!({
            "event": "tick",
            "connected": d.connected,
            "position_accuracy_m": d.position_accuracy_m,
            "elevation_accuracy_m": d.elevation_accuracy_m,
            "run": d.run.map(|r| json!({
                "elapsed_s": r.elapsed_s,
                "current_pace": r.current_pace,
                "overall_pace": r.overall_pace,
                "distance_km": r.distance_km,
                "elevation_m": r.elevation_m,
            })),
        }),
        Event::Announce(a) => json!({ "event": "announce", "text": a.to_string() }),
        Event::Summary(s) => json!({
            "event": "summary",
            "when": s.when,
            "time": s.time,
            "distance_km": s.distance_km,
            "pace_min_per_km": s.pace_min_per_km,
            "altimetry_m": s.altimetry_m,
        }),
    }
}

fn event_text(ev: &Event) -> String {
    match ev {
        Event::Tick(d) => {
            let gps = match d.position_accuracy_m {
                Some(acc) if d.connected => format!("gps ok ({acc:.1} m)"),
                Some(acc) => format!("gps poor ({acc:.1} m)"),
                None => "gps lost".to_string(),
            };
            match d.run {
                Some(r) => format!(
                    "{}  pace {}  avg {}  {:.2} km  {:.0} m  {gps}",
                    format_elapsed(r.elapsed_s),
                    format_pace(r.current_pace),
                    format_pace(r.overall_pace),
                    r.distance_km,
                    r.elevation_m,
                ),
                None => format!("waiting for gps  {gps}"),
            }
        }
        Event::Announce(a) => format!("announce: {a}"),
        Event::Summary(s) => format!(
            "run finished: {}  {:.2} km  {}  {:.0} m elevation",
            format_elapsed(s.time),
            s.distance_km,
            format_pace(s.pace_min_per_km),
            s.altimetry_m,
        ),
    }
}

pub fn build_engine(
    cfg: &Config,
    clock: impl Clock + Send + Sync + 'static,
) -> stride_core::Result<MetricsEngine> {
    let engine_cfg: EngineCfg = cfg.into();
    MetricsEngine::builder()
        .with_config(engine_cfg)
        .with_clock(clock)
        .build()
}

/// Read a recorded log into capture-ordered fixes.
pub fn load_fixes(input: &Path, format: InputFormat) -> eyre::Result<Vec<RawFix>> {
    let rows = match format {
        InputFormat::Csv => stride_config::load_samples_csv(input)?,
        InputFormat::Jsonl => stride_config::load_samples_jsonl(input)?,
    };
    let mut fixes: Vec<RawFix> = rows.into_iter().map(RawFix::from).collect();
    fixes.sort_by_key(|f| f.captured_ms);
    tracing::info!(path = %input.display(), fixes = fixes.len(), "sample log loaded");
    Ok(fixes)
}

/// Ingest a whole log at once and summarize it as one run.
pub fn replay_batch(cfg: &Config, fixes: Vec<RawFix>) -> eyre::Result<RunSummary> {
    let (Some(first), Some(last)) = (
        fixes.first().map(|f| f.captured_ms),
        fixes.last().map(|f| f.captured_ms),
    ) else {
        eyre::bail!("sample log is empty");
    };
    let clock = ManualClock::new(first);
    let engine = build_engine(cfg, clock.clone())?;
    let mut session = RunSession::new();
    session.start(first)?;

    let mut rejected = 0usize;
    for fix in fixes {
        match Sample::try_from(fix) {
            Ok(s) => engine.ingest(s),
            Err(e) => {
                rejected += 1;
                tracing::warn!(error = %e, "sample skipped");
            }
        }
    }
    if rejected > 0 {
        tracing::warn!(rejected, "some samples were invalid");
    }
    clock.set_ms(last);
    session.stop(&engine)
}

/// UI-side run logic shared by the deterministic and real-time loops.
///
/// Starts the run on the first tick with a usable fix, emits a dashboard per
/// tick and any due announcement.
struct RunUi {
    session: RunSession,
    announcer: Announcer,
}

impl RunUi {
    fn new(cfg: &Config) -> Self {
        let announcer = Announcer::new(AnnounceCfg::from(&cfg.announce));
        tracing::debug!(
            enabled = announcer.enabled(),
            interval_s = announcer.interval_s(),
            "announcements configured"
        );
        Self {
            session: RunSession::new(),
            announcer,
        }
    }

    fn tick(&mut self, engine: &MetricsEngine, out: &Output) -> eyre::Result<()> {
        if self.session.can_start(engine) {
            self.session.start(engine.now_ms())?;
            self.announcer.reset();
        }
        let dash = self.session.snapshot(engine);
        out.emit(&Event::Tick(dash));
        if let Some(run) = dash.run
            && let Some(a) = self.announcer.poll(&run)
        {
            out.emit(&Event::Announce(a));
        }
        Ok(())
    }

    fn finish(mut self, engine: &MetricsEngine) -> eyre::Result<RunSummary> {
        if !self.session.is_running() {
            return Err(eyre::Report::new(StrideError::State(
                "no usable GPS fix; the run never started".into(),
            )));
        }
        self.session.stop(engine)
    }
}

/// Drive `provider` through a simulated UI refresh loop on a manual clock.
///
/// Every tick advances the clock by `ui.refresh_ms` and ingests the fixes
/// captured up to the new time. The loop ends when the provider is exhausted
/// or `until_ms` is reached.
pub fn run_timeline<P: LocationProvider>(
    cfg: &Config,
    mut provider: P,
    start_ms: i64,
    until_ms: Option<i64>,
    out: &Output,
) -> eyre::Result<RunSummary> {
    let clock = ManualClock::new(start_ms);
    let engine = build_engine(cfg, clock.clone())?;
    let refresh = Duration::from_millis(cfg.ui.refresh_ms);
    let mut ui = RunUi::new(cfg);
    let mut pending: Option<RawFix> = None;
    let mut exhausted = false;

    loop {
        clock.advance(refresh);
        let now = clock.now_ms();
        while !exhausted {
            if pending.is_none() {
                match provider.next_fix(Duration::ZERO) {
                    Ok(Some(fix)) => pending = Some(fix),
                    Ok(None) => exhausted = true,
                    Err(e) => match map_provider_error(&*e) {
                        StrideError::Timeout => break,
                        other => return Err(eyre::Report::new(other)),
                    },
                }
            }
            match pending.take() {
                Some(fix) if fix.captured_ms <= now => match Sample::try_from(fix) {
                    Ok(s) => engine.ingest(s),
                    Err(e) => tracing::warn!(error = %e, "sample skipped"),
                },
                Some(fix) => {
                    pending = Some(fix);
                    break;
                }
                None => {}
            }
        }

        ui.tick(&engine, out)?;

        if (exhausted && pending.is_none()) || until_ms.is_some_and(|u| now >= u) {
            break;
        }
    }
    ui.finish(&engine)
}

pub fn replay_timeline(cfg: &Config, fixes: Vec<RawFix>, out: &Output) -> eyre::Result<RunSummary> {
    let Some(first) = fixes.first().map(|f| f.captured_ms) else {
        eyre::bail!("sample log is empty");
    };
    let refresh = i64::try_from(cfg.ui.refresh_ms).unwrap_or(i64::MAX);
    run_timeline(cfg, ReplayProvider::new(fixes), first - refresh, None, out)
}

fn simulated_run(seconds: u64, speed_mps: f64, seed: u32, start_ms: i64) -> SimulatedRun {
    SimulatedRun {
        start_ms,
        speed_mps,
        seed,
        fixes: Some(seconds + 1),
        ..SimulatedRun::default()
    }
}

/// Deterministic simulation: synthetic fixes on a manual clock.
pub fn simulate(
    cfg: &Config,
    seconds: u64,
    speed_mps: f64,
    seed: u32,
    out: &Output,
) -> eyre::Result<RunSummary> {
    let start_ms = SystemClock::new().now_ms();
    let run = simulated_run(seconds, speed_mps, seed, start_ms);
    let until = start_ms + i64::try_from(seconds.saturating_mul(1000)).unwrap_or(i64::MAX);
    let refresh = i64::try_from(cfg.ui.refresh_ms).unwrap_or(i64::MAX);
    run_timeline(cfg, SimulatedProvider::new(run), start_ms - refresh, Some(until), out)
}

/// Real-time simulation: a paced provider on a background feed, polled at the
/// UI refresh rate until `seconds` pass or `shutdown` is raised.
pub fn simulate_realtime(
    cfg: &Config,
    seconds: u64,
    speed_mps: f64,
    seed: u32,
    shutdown: &Arc<AtomicBool>,
    out: &Output,
) -> eyre::Result<RunSummary> {
    let clock = SystemClock::new();
    let engine = Arc::new(build_engine(cfg, clock)?);
    let run = SimulatedRun {
        fixes: None,
        ..simulated_run(seconds, speed_mps, seed, clock.now_ms())
    };
    let period = Duration::from_millis(u64::try_from(run.period_ms).unwrap_or(1000));
    let provider = SimulatedProvider::new(run).paced(Arc::new(clock));
    let feed = Feed::spawn(provider, engine.clone(), period * 2);

    let refresh = Duration::from_millis(cfg.ui.refresh_ms);
    let deadline = clock.now_ms() + i64::try_from(seconds.saturating_mul(1000)).unwrap_or(i64::MAX);
    let mut ui = RunUi::new(cfg);

    while !shutdown.load(Ordering::Relaxed) && clock.now_ms() < deadline {
        clock.sleep(refresh);
        ui.tick(&engine, out)?;
        if feed.is_finished() {
            if let Some(err) = feed.failure() {
                return Err(eyre::Report::new(err));
            }
            break;
        }
    }
    if shutdown.load(Ordering::Relaxed) {
        tracing::info!("interrupted; finishing run");
    }
    tracing::debug!(
        received = feed.received(),
        rejected = feed.rejected(),
        stalled_ms = feed.stalled_for_ms(clock.now_ms()),
        "feed stats"
    );
    feed.stop();
    ui.finish(&engine)
}

/// Append a finished run to the history document.
pub fn record_run(path: &Path, summary: RunSummary) -> eyre::Result<()> {
    let runs = RunHistory::append_to(path, RunRecord::from(summary))
        .wrap_err_with(|| format!("append run to history {}", path.display()))?;
    tracing::info!(path = %path.display(), runs, "run recorded");
    Ok(())
}

/// Print stored runs newest first.
pub fn list_history(path: &Path, out: &Output) -> eyre::Result<()> {
    let load = RunHistory::load(path)?;
    if load.replaced > 0 {
        tracing::warn!(replaced = load.replaced, "malformed history entries were zeroed");
    }
    let runs = load.history.sorted_newest_first();
    if runs.is_empty() && !out.json {
        println!("no runs recorded");
    }
    for r in runs {
        if out.json {
            println!(
                "{}",
                json!({
                    "when": r.when,
                    "time": r.time,
                    "distance_km": r.distance,
                    "pace_min_per_km": r.pace,
                    "altimetry_m": r.altimetry,
                })
            );
        } else {
            println!(
                "{}  {}  {:.2} km  {}  {:.0} m",
                format_when(r.when, &Local),
                format_elapsed(r.time),
                r.distance,
                format_pace(r.pace),
                r.altimetry
            );
        }
    }
    Ok(())
}

/// Run start as `dd/MM HH:mm` in `tz`; out-of-range stamps print raw.
fn format_when<Tz: TimeZone>(when_ms: i64, tz: &Tz) -> String
where
    Tz::Offset: std::fmt::Display,
{
    match tz.timestamp_millis_opt(when_ms).single() {
        Some(dt) => dt.format("%d/%m %H:%M").to_string(),
        None => when_ms.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn history_dates_are_day_month_time() {
        // 2023-11-14 22:13:20 UTC
        assert_eq!(format_when(1_700_000_000_000, &Utc), "14/11 22:13");
        assert_eq!(format_when(0, &Utc), "01/01 00:00");
        assert_eq!(format_when(i64::MAX, &Utc), i64::MAX.to_string());
    }
}
