//! Push-style provider: hosts forward fixes from platform callbacks.
use std::time::Duration;

use crossbeam_channel as xch;
use stride_traits::{BoxError, LocationProvider, RawFix};

use crate::error::{ProviderError, Result};

/// Bounded channel between a location callback and a [`ChannelProvider`].
pub fn channel(capacity: usize) -> (FixSender, ChannelProvider) {
    let (tx, rx) = xch::bounded(capacity.max(1));
    (FixSender { tx }, ChannelProvider { rx })
}

#[derive(Debug, Clone)]
pub struct FixSender {
    tx: xch::Sender<RawFix>,
}

impl FixSender {
    /// Blocks while the channel is full.
    pub fn send(&self, fix: RawFix) -> Result<()> {
        self.tx.send(fix).map_err(|_| ProviderError::Closed)
    }

    /// Drops the fix instead of blocking when the consumer lags behind.
    pub fn try_send(&self, fix: RawFix) -> Result<bool> {
        match self.tx.try_send(fix) {
            Ok(()) => Ok(true),
            Err(xch::TrySendError::Full(_)) => {
                tracing::debug!("fix dropped: channel full");
                Ok(false)
            }
            Err(xch::TrySendError::Disconnected(_)) => Err(ProviderError::Closed),
        }
    }
}

#[derive(Debug)]
pub struct ChannelProvider {
    rx: xch::Receiver<RawFix>,
}

impl LocationProvider for ChannelProvider {
    /// All senders dropped and the buffer drained reads as exhaustion.
    fn next_fix(&mut self, timeout: Duration) -> std::result::Result<Option<RawFix>, BoxError> {
        match self.rx.recv_timeout(timeout) {
            Ok(fix) => Ok(Some(fix)),
            Err(xch::RecvTimeoutError::Timeout) => Err(Box::new(ProviderError::Timeout)),
            Err(xch::RecvTimeoutError::Disconnected) => Ok(None),
        }
    }

    fn name(&self) -> &str {
        "channel"
    }
}
