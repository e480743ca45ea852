//! Recorded fixes played back in order.
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use stride_traits::clock::Clock;
use stride_traits::{BoxError, LocationProvider, RawFix};

use crate::error::ProviderError;

pub struct ReplayProvider {
    fixes: VecDeque<RawFix>,
    clock: Option<Arc<dyn Clock + Send + Sync>>,
}

impl ReplayProvider {
    pub fn new(fixes: impl IntoIterator<Item = RawFix>) -> Self {
        Self {
            fixes: fixes.into_iter().collect(),
            clock: None,
        }
    }

    /// Hold each fix back until `clock` reaches its capture time.
    pub fn paced(mut self, clock: Arc<dyn Clock + Send + Sync>) -> Self {
        self.clock = Some(clock);
        self
    }

    pub fn remaining(&self) -> usize {
        self.fixes.len()
    }
}

impl LocationProvider for ReplayProvider {
    fn next_fix(&mut self, timeout: Duration) -> Result<Option<RawFix>, BoxError> {
        let Some(next_ms) = self.fixes.front().map(|f| f.captured_ms) else {
            return Ok(None);
        };
        if let Some(clock) = &self.clock {
            let wait_ms = u64::try_from(next_ms.saturating_sub(clock.now_ms())).unwrap_or(0);
            let wait = Duration::from_millis(wait_ms);
            if wait > timeout {
                clock.sleep(timeout);
                return Err(Box::new(ProviderError::Timeout));
            }
            clock.sleep(wait);
        }
        Ok(self.fixes.pop_front())
    }

    fn name(&self) -> &str {
        "replay"
    }
}
