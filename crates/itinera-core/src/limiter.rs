use std::collections::HashMap;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::config::RateLimitConfig;
use crate::error::{ItineraError, Result};

/// Sliding-window rate limiter keyed by node name.
///
/// Limits the number of admissions per key within a trailing time window.
/// One instance is shared process-wide; concurrent conversations invoking
/// the same node contend for the same window, while independent keys never
/// serialize behind another key's wait.
pub struct RateLimiter {
    max_requests: usize,
    window: Duration,
    requests: Mutex<HashMap<String, Vec<Instant>>>,
}

impl RateLimiter {
    pub fn new(config: &RateLimitConfig) -> Self {
        debug!(
            max_requests = config.max_requests,
            window_secs = config.window_secs,
            "Rate limiter initialized"
        );
        Self {
            max_requests: config.max_requests,
            window: Duration::from_secs(config.window_secs),
            requests: Mutex::new(HashMap::new()),
        }
    }

    /// Admit one operation under `key`, waiting out the window if full.
    ///
    /// The lock is held only for the prune-and-decide step; the wait itself
    /// happens with the lock released, so other keys are not serialized
    /// behind it. After a wait the window is re-checked from scratch.
    pub async fn acquire(&self, key: &str, cancel: &CancellationToken) -> Result<()> {
        loop {
            let wait = {
                let mut requests = self.requests.lock().await;
                let now = Instant::now();
                let entry = requests.entry(key.to_string()).or_default();
                entry.retain(|t| now.duration_since(*t) < self.window);

                if entry.len() < self.max_requests {
                    entry.push(now);
                    debug!(
                        key,
                        current = entry.len(),
                        max = self.max_requests,
                        "Request allowed"
                    );
                    return Ok(());
                }

                // Window is full: wait until the oldest entry expires.
                match entry.iter().min() {
                    Some(oldest) => (*oldest + self.window).saturating_duration_since(now),
                    None => self.window,
                }
            };

            warn!(
                key,
                wait_ms = wait.as_millis() as u64,
                "Rate limit reached, waiting"
            );

            tokio::select! {
                _ = tokio::time::sleep(wait) => {}
                _ = cancel.cancelled() => return Err(ItineraError::Cancelled),
            }
        }
    }

    /// Timestamps currently recorded for a key (pruned to the window).
    pub async fn recorded(&self, key: &str) -> usize {
        let mut requests = self.requests.lock().await;
        let now = Instant::now();
        match requests.get_mut(key) {
            Some(entry) => {
                entry.retain(|t| now.duration_since(*t) < self.window);
                entry.len()
            }
            None => 0,
        }
    }
}
