//! Per-domain politeness gate. One `RateLimiter` is constructed per crawl and
//! lives only as long as that crawl.

use std::collections::HashMap;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::common::error::{Error, Result};

/// Tracks the most recently *reserved* start time per domain and enforces
/// `delay` between consecutive starts to the same domain.
///
/// Reservation happens before the sleep: a caller advances the domain's next
/// allowed start time while holding the lock, then releases the lock and
/// sleeps outside it. Concurrent waiters on the same domain therefore queue
/// up at `delay` intervals instead of racing to wake at the same instant.
pub struct RateLimiter {
    delay: Duration,
    last_start: Mutex<HashMap<String, Instant>>,
}

impl RateLimiter {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            last_start: Mutex::new(HashMap::new()),
        }
    }

    /// Block until it is permissible to start a fetch for `domain`.
    pub async fn gate(&self, cancel: &CancellationToken, domain: &str) -> Result<()> {
        if self.delay.is_zero() {
            return Ok(());
        }

        let wait = {
            let mut last_start = self.last_start.lock().await;
            let now = Instant::now();
            let next_allowed = last_start
                .get(domain)
                .map(|&t| t + self.delay)
                .unwrap_or(now);
            let reserved_start = next_allowed.max(now);
            last_start.insert(domain.to_string(), reserved_start);
            reserved_start.saturating_duration_since(now)
        };

        if wait.is_zero() {
            return Ok(());
        }

        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(Error::Canceled),
            _ = tokio::time::sleep(wait) => Ok(()),
        }
    }
}
