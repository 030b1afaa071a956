//! Deduplicating work queue. Owns the visited set, the pending queue, and
//! the admitted/inflight counters that together define quiescence — the
//! signal that tells every worker it is time to stop.

use std::collections::{HashSet, VecDeque};
use std::sync::Arc;

use tokio::sync::{Mutex, Notify};
use tokio_util::sync::CancellationToken;

use crate::crawler::normalize::{get_domain, normalize_url};

struct FrontierState {
    visited: HashSet<String>,
    queue: VecDeque<(String, usize)>,
    admitted: usize,
    inflight: usize,
}

/// A single crawl's frontier. Fresh state is constructed per `Crawler::crawl`
/// call; nothing here outlives that call.
pub struct Frontier {
    seed_domain: String,
    max_depth: usize,
    max_pages: usize,
    follow_external: bool,
    state: Mutex<FrontierState>,
    notify: Notify,
}

impl Frontier {
    pub fn new(seed_domain: &str, max_depth: usize, max_pages: usize, follow_external: bool) -> Self {
        Self {
            seed_domain: seed_domain.to_ascii_lowercase(),
            max_depth,
            max_pages,
            follow_external,
            state: Mutex::new(FrontierState {
                visited: HashSet::new(),
                queue: VecDeque::new(),
                admitted: 0,
                inflight: 0,
            }),
            notify: Notify::new(),
        }
    }

    /// Offer `url` at `depth` to the frontier. Returns `true` iff it was
    /// admitted: normalization succeeded, depth and page-count bounds are
    /// respected, the domain policy allows it, and the URL was not already
    /// visited.
    pub async fn admit(&self, url: &str, depth: usize) -> bool {
        let Ok(normalized) = normalize_url(url) else {
            return false;
        };

        if depth > self.max_depth {
            return false;
        }
        if !self.follow_external {
            match get_domain(&normalized) {
                Ok(domain) if domain.eq_ignore_ascii_case(&self.seed_domain) => {}
                _ => return false,
            }
        }

        let mut state = self.state.lock().await;
        if state.visited.contains(&normalized) {
            return false;
        }
        if self.max_pages > 0 && state.admitted >= self.max_pages {
            return false;
        }

        state.visited.insert(normalized.clone());
        state.admitted += 1;
        state.queue.push_back((normalized, depth));
        drop(state);

        self.notify.notify_waiters();
        true
    }

    /// Block until an item is available, or the frontier has gone quiescent
    /// (`pending == 0 && inflight == 0`), or `cancel` fires. Taking an item
    /// increments `inflight`; callers must pair every `take` with a `done`.
    pub async fn take(&self, cancel: &CancellationToken) -> Option<(String, usize)> {
        loop {
            // Must be created before the condition check below: a
            // `notify_waiters()` that lands after the lock is dropped but
            // before we `.await` this future would otherwise be missed.
            let notified = self.notify.notified();

            {
                let mut state = self.state.lock().await;
                if cancel.is_cancelled() {
                    return None;
                }
                if let Some(item) = state.queue.pop_front() {
                    state.inflight += 1;
                    return Some(item);
                }
                if state.inflight == 0 {
                    // Quiescent: wake any other waiters too, then report done.
                    drop(state);
                    self.notify.notify_waiters();
                    return None;
                }
            }

            tokio::select! {
                biased;
                _ = cancel.cancelled() => return None,
                _ = notified => {}
            }
        }
    }

    /// Mark the item most recently taken by this worker as finished. Must be
    /// called exactly once per successful `take`.
    pub async fn done(&self) {
        let mut state = self.state.lock().await;
        state.inflight = state.inflight.saturating_sub(1);
        let quiescent = state.inflight == 0 && state.queue.is_empty();
        drop(state);
        if quiescent {
            self.notify.notify_waiters();
        }
    }
}

/// Shared handle to a `Frontier`, cheap to clone across worker tasks.
pub type SharedFrontier = Arc<Frontier>;
