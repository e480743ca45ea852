#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::missing_errors_doc,
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
//! Running metrics from noisy location fixes (provider-agnostic).
//!
//! Location fixes arrive through [`MetricsEngine::ingest`], either directly or
//! from a background [`Feed`] draining a `stride_traits::LocationProvider`.
//! The engine keeps every raw sample and answers queries by recomputing from
//! the whole log:
//!
//! - **Smoothing**: valid samples are bucketed in fixed windows and reduced to
//!   accuracy-weighted synthetic samples (`aggregate`, `policy`)
//! - **Reductions**: haversine path length and cumulative elevation change (`track`)
//! - **Queries**: distance, elevation, pace, elapsed time, connectivity (`engine`)
//! - **Run lifecycle**: start/stop, dashboard snapshots, summaries (`session`)
//! - **Announcements**: periodic progress text (`announce`)
//!
//! Time is read through an injected `Clock`, so every query is reproducible
//! under `ManualClock`.

pub mod aggregate;
pub mod announce;
pub mod config;
pub mod conversions;
pub mod engine;
pub mod error;
pub mod feed;
pub mod policy;
pub mod provider_error;
pub mod sample;
pub mod session;
pub mod track;
pub mod util;

pub use aggregate::{BUCKET_WIDTH_MS, WindowAggregator};
pub use announce::{Announcement, Announcer};
pub use config::{AnnounceCfg, EngineCfg};
pub use engine::{MetricsEngine, MetricsEngineBuilder};
pub use error::{BuildError, Report, Result, SampleError, StrideError};
pub use feed::Feed;
pub use policy::QualityPolicy;
pub use sample::{AVERAGE_SOURCE, Sample, SampleBuilder};
pub use session::{Dashboard, RunState, RunStats, RunSession, RunSummary};
pub use util::{format_elapsed, format_pace, split_pace};
