//! Background ingestion from a [`LocationProvider`].
//!
//! Each `Feed` owns exactly one thread that pulls fixes from its provider,
//! converts them into samples and hands them to the engine. The thread stops
//! when the provider is exhausted, when it fails with anything other than a
//! timeout, or when the `Feed` is dropped (shutdown flag + join).
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use stride_traits::LocationProvider;

use crate::engine::MetricsEngine;
use crate::error::StrideError;
use crate::provider_error::map_provider_error;
use crate::sample::Sample;

#[derive(Debug, Default)]
struct FeedStats {
    received: AtomicU64,
    rejected: AtomicU64,
    last_ok_ms: AtomicI64,
    finished: AtomicBool,
    failure: Mutex<Option<StrideError>>,
}

pub struct Feed {
    provider: String,
    stats: Arc<FeedStats>,
    shutdown: Arc<AtomicBool>,
    join_handle: Option<std::thread::JoinHandle<()>>,
}

impl Feed {
    pub fn spawn<P: LocationProvider + Send + 'static>(
        mut provider: P,
        engine: Arc<MetricsEngine>,
        timeout: Duration,
    ) -> Self {
        let name = provider.name().to_owned();
        let stats = Arc::new(FeedStats {
            last_ok_ms: AtomicI64::new(engine.now_ms()),
            ..FeedStats::default()
        });
        let shutdown = Arc::new(AtomicBool::new(false));
        let stats_t = stats.clone();
        let shutdown_t = shutdown.clone();
        let thread_name = name.clone();

        let join_handle = std::thread::spawn(move || {
            loop {
                if shutdown_t.load(Ordering::Relaxed) {
                    tracing::debug!(provider = %thread_name, "feed received shutdown signal");
                    break;
                }

                match provider.next_fix(timeout) {
                    Ok(Some(fix)) => {
                        stats_t.received.fetch_add(1, Ordering::Relaxed);
                        match Sample::try_from(fix) {
                            Ok(sample) => {
                                engine.ingest(sample);
                                stats_t.last_ok_ms.store(engine.now_ms(), Ordering::Relaxed);
                            }
                            Err(e) => {
                                stats_t.rejected.fetch_add(1, Ordering::Relaxed);
                                tracing::warn!(provider = %thread_name, error = %e, "fix rejected");
                            }
                        }
                    }
                    Ok(None) => {
                        tracing::debug!(provider = %thread_name, "provider exhausted");
                        break;
                    }
                    Err(e) => match map_provider_error(&*e) {
                        StrideError::Timeout => {
                            tracing::trace!(provider = %thread_name, "no fix within timeout");
                        }
                        StrideError::ProviderClosed => {
                            tracing::debug!(provider = %thread_name, "provider closed");
                            break;
                        }
                        other => {
                            tracing::warn!(provider = %thread_name, error = %other, "provider failed");
                            *stats_t
                                .failure
                                .lock()
                                .unwrap_or_else(PoisonError::into_inner) = Some(other);
                            break;
                        }
                    },
                }
            }
            stats_t.finished.store(true, Ordering::Release);
            tracing::trace!(provider = %thread_name, "feed thread exiting cleanly");
        });

        Self {
            provider: name,
            stats,
            shutdown,
            join_handle: Some(join_handle),
        }
    }

    pub fn provider(&self) -> &str {
        &self.provider
    }

    /// Fixes pulled from the provider, accepted or not.
    pub fn received(&self) -> u64 {
        self.stats.received.load(Ordering::Relaxed)
    }

    /// Fixes that failed sample validation.
    pub fn rejected(&self) -> u64 {
        self.stats.rejected.load(Ordering::Relaxed)
    }

    /// The thread has exited (exhaustion, failure or shutdown).
    pub fn is_finished(&self) -> bool {
        self.stats.finished.load(Ordering::Acquire)
    }

    /// The provider failure that ended the feed, if any.
    pub fn failure(&self) -> Option<StrideError> {
        self.stats
            .failure
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Milliseconds since the last accepted fix, relative to `now_ms`.
    pub fn stalled_for_ms(&self, now_ms: i64) -> i64 {
        now_ms
            .saturating_sub(self.stats.last_ok_ms.load(Ordering::Relaxed))
            .max(0)
    }

    /// Signal shutdown and wait for the thread.
    pub fn stop(mut self) {
        self.join();
    }

    fn join(&mut self) {
        self.shutdown.store(true, Ordering::Relaxed);
        if let Some(handle) = self.join_handle.take() {
            match handle.join() {
                Ok(()) => tracing::trace!(provider = %self.provider, "feed thread joined"),
                Err(e) => tracing::warn!(?e, "feed thread panicked during shutdown"),
            }
        }
    }
}

impl Drop for Feed {
    fn drop(&mut self) {
        // The thread exits after the in-flight `next_fix` returns, so the
        // join is bounded by the provider timeout.
        self.join();
    }
}
