//! Crawl engine: the orchestrator. Wires Frontier -> Fetcher -> Extractor ->
//! Frontier behind a bounded pool of workers, enforces depth and page-count
//! caps, and observes cooperative cancellation at every suspension point.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use url::Url;

use crate::common::config::CrawlerConfig;
use crate::common::error::{Error, Result};
use crate::crawler::extractor::{extract_links, extract_title};
use crate::crawler::fetcher::Fetcher;
use crate::crawler::frontier::Frontier;
use crate::crawler::normalize::{get_domain, normalize_url};
use crate::crawler::rate_limiter::RateLimiter;

/// One result record per completed fetch attempt, success or failure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlResult {
    pub url: String,
    pub title: String,
    pub links: Vec<String>,
    pub status: u16,
    #[serde(with = "duration_millis")]
    pub elapsed: Duration,
    pub error: Option<String>,
    pub depth: usize,
}

/// A crawler bound to one validated `CrawlerConfig`. Constructing a crawler
/// is cheap and side-effect-free; `crawl` is where all the work happens, and
/// every call to it starts from fresh Frontier and RateLimiter state.
pub struct Crawler {
    config: CrawlerConfig,
    fetcher: Fetcher,
}

impl Crawler {
    /// Validate `config` and build a `Crawler`. Errors with `InvalidConfig`
    /// on any violated constraint.
    pub fn new(config: CrawlerConfig) -> Result<Self> {
        config.validate()?;
        let fetcher = Fetcher::new(&config.user_agent)?;
        Ok(Self { config, fetcher })
    }

    /// Crawl starting from `seed`, honoring `cancel` at every suspension
    /// point. Returns `InvalidUrl` only when `seed` itself cannot be parsed
    /// or is not http(s); every other failure is captured per-URL in the
    /// returned results, and cancellation yields a `Ok` partial result set.
    pub async fn crawl(&self, cancel: CancellationToken, seed: &str) -> Result<Vec<CrawlResult>> {
        let seed_url = Url::parse(seed).map_err(|e| Error::InvalidUrl(e.to_string()))?;
        if !matches!(seed_url.scheme(), "http" | "https") {
            return Err(Error::InvalidUrl(format!(
                "unsupported scheme: {}",
                seed_url.scheme()
            )));
        }

        let seed_normalized = normalize_url(seed)?;
        let seed_domain = get_domain(&seed_normalized)?;

        let frontier = Arc::new(Frontier::new(
            &seed_domain,
            self.config.max_depth,
            self.config.max_pages,
            self.config.follow_external,
        ));
        let rate_limiter = Arc::new(RateLimiter::new(self.config.rate_limit_delay));
        let results = Arc::new(Mutex::new(Vec::new()));

        if !frontier.admit(&seed_normalized, 0).await {
            return Err(Error::InvalidUrl(format!(
                "seed URL could not be admitted: {seed}"
            )));
        }

        info!(
            seed = %seed_normalized,
            max_concurrent = self.config.max_concurrent,
            max_depth = self.config.max_depth,
            "starting crawl"
        );

        let mut workers = Vec::with_capacity(self.config.max_concurrent);
        for worker_id in 0..self.config.max_concurrent {
            let frontier = frontier.clone();
            let rate_limiter = rate_limiter.clone();
            let results = results.clone();
            let fetcher = self.fetcher.clone();
            let cancel = cancel.clone();
            let timeout = self.config.timeout;

            workers.push(tokio::spawn(async move {
                worker_loop(
                    worker_id,
                    frontier,
                    rate_limiter,
                    fetcher,
                    results,
                    cancel,
                    timeout,
                )
                .await;
            }));
        }

        for worker in workers {
            let _ = worker.await;
        }

        let results = results.lock().await.clone();

        info!(pages = results.len(), "crawl finished");
        Ok(results)
    }
}

#[allow(clippy::too_many_arguments)]
async fn worker_loop(
    worker_id: usize,
    frontier: Arc<Frontier>,
    rate_limiter: Arc<RateLimiter>,
    fetcher: Fetcher,
    results: Arc<Mutex<Vec<CrawlResult>>>,
    cancel: CancellationToken,
    timeout: Duration,
) {
    debug!(worker_id, "worker started");

    loop {
        let Some((url, depth)) = frontier.take(&cancel).await else {
            break;
        };

        // `url` was already normalized on admission, which itself requires a
        // host, so `get_domain` failing here should not be reachable. Emit a
        // result rather than dropping silently in case that guarantee ever
        // breaks, to preserve "one result per admitted URL".
        let domain = match get_domain(&url) {
            Ok(d) => d,
            Err(e) => {
                let mut results = results.lock().await;
                results.push(CrawlResult {
                    url,
                    title: String::new(),
                    links: Vec::new(),
                    status: 0,
                    elapsed: Duration::ZERO,
                    error: Some(e.to_string()),
                    depth,
                });
                drop(results);
                frontier.done().await;
                continue;
            }
        };

        if let Err(e) = rate_limiter.gate(&cancel, &domain).await {
            let mut results = results.lock().await;
            results.push(CrawlResult {
                url,
                title: String::new(),
                links: Vec::new(),
                status: 0,
                elapsed: Duration::ZERO,
                error: Some(e.to_string()),
                depth,
            });
            drop(results);
            frontier.done().await;
            if cancel.is_cancelled() {
                break;
            }
            continue;
        }

        debug!(worker_id, %url, depth, "fetching");
        let outcome = fetcher.fetch(&cancel, &url, timeout).await;

        let (title, links) = match &outcome.error {
            Some(_) => (String::new(), Vec::new()),
            None => {
                let title = extract_title(&outcome.body);
                let links = extract_links(&outcome.body, &url);
                (title, links)
            }
        };

        for link in &links {
            frontier.admit(link, depth + 1).await;
        }

        if let Some(err) = &outcome.error {
            warn!(worker_id, %url, %err, "fetch failed");
        }

        let mut locked = results.lock().await;
        locked.push(CrawlResult {
            url,
            title,
            links,
            status: outcome.status,
            elapsed: outcome.elapsed,
            error: outcome.error.map(|e| e.to_string()),
            depth,
        });
        drop(locked);

        frontier.done().await;

        if cancel.is_cancelled() {
            break;
        }
    }

    debug!(worker_id, "worker finished");
}

pub(crate) mod duration_millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> std::result::Result<S::Ok, S::Error> {
        s.serialize_u128(d.as_millis())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> std::result::Result<Duration, D::Error> {
        let millis = u64::deserialize(d)?;
        Ok(Duration::from_millis(millis))
    }
}
