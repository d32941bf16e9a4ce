//! Per-endpoint rate-limit bookkeeping from `x-rate-limit-*` headers.
//!
//! The client records each response's remaining/reset pair and, before the next request on an
//! exhausted endpoint, blocks until the advertised reset. A 429 is waited out the same way.

use log::{debug, warn};
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use crate::utils::config::{RATE_LIMIT_FALLBACK_WAIT, RATE_LIMIT_RESET_SLACK};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RateWindow {
    pub remaining: u32,
    /// Unix seconds at which the window resets.
    pub reset_epoch: i64,
}

#[derive(Default)]
pub struct RateLimitTracker {
    windows: Mutex<HashMap<String, RateWindow>>,
}

/// Time to wait from `now_epoch` until `reset_epoch` (plus slack). Fallback when the reset is unknown.
pub fn wait_until_reset(now_epoch: i64, reset_epoch: Option<i64>) -> Duration {
    match reset_epoch {
        Some(reset) if reset > now_epoch => {
            Duration::from_secs((reset - now_epoch) as u64) + RATE_LIMIT_RESET_SLACK
        }
        Some(_) => RATE_LIMIT_RESET_SLACK,
        None => RATE_LIMIT_FALLBACK_WAIT,
    }
}

impl RateLimitTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remember the latest window for `endpoint`. Ignored unless both headers were present.
    pub fn record(&self, endpoint: &str, remaining: Option<u32>, reset_epoch: Option<i64>) {
        let (Some(remaining), Some(reset_epoch)) = (remaining, reset_epoch) else {
            return;
        };
        debug!("{endpoint}: {remaining} requests left, reset at {reset_epoch}");
        self.windows
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(
                endpoint.to_string(),
                RateWindow {
                    remaining,
                    reset_epoch,
                },
            );
    }

    pub fn window(&self, endpoint: &str) -> Option<RateWindow> {
        self.windows
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(endpoint)
            .copied()
    }

    /// How long a request on `endpoint` must wait at `now_epoch`, if at all.
    pub fn wait_needed(&self, endpoint: &str, now_epoch: i64) -> Option<Duration> {
        let w = self.window(endpoint)?;
        (w.remaining == 0 && w.reset_epoch > now_epoch)
            .then(|| wait_until_reset(now_epoch, Some(w.reset_epoch)))
    }

    /// Block until `endpoint` may be called again.
    pub fn wait_if_exhausted(&self, endpoint: &str) {
        let now = chrono::Utc::now().timestamp();
        if let Some(wait) = self.wait_needed(endpoint, now) {
            warn!(
                "Rate limit reached on {endpoint}; sleeping {}s",
                wait.as_secs()
            );
            std::thread::sleep(wait);
        }
    }
}
