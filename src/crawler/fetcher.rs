//! Single bounded HTTP GET. The only I/O capability the crawl engine depends
//! on; treated as a collaborator the engine wires up but does not itself
//! implement retry or caching logic for.

use std::time::{Duration, Instant};

use reqwest::Client;
use tokio_util::sync::CancellationToken;

use crate::common::error::{Error, Result};

/// Outcome of a single fetch attempt. `status == 0` only ever coexists with
/// `Some` error — a successful fetch always carries a real HTTP status, even
/// for non-2xx responses.
#[derive(Debug, Clone)]
pub struct FetchOutcome {
    pub status: u16,
    pub body: String,
    pub elapsed: Duration,
    pub error: Option<Error>,
}

/// Thin wrapper around a shared `reqwest::Client`, configured once at
/// `Crawler` construction and reused across every worker and every fetch.
#[derive(Clone)]
pub struct Fetcher {
    client: Client,
}

impl Fetcher {
    pub fn new(user_agent: &str) -> Result<Self> {
        let client = Client::builder()
            .user_agent(user_agent)
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()
            .map_err(Error::HttpError)?;
        Ok(Self { client })
    }

    /// Perform one GET against `url`, bounded by `timeout` regardless of how
    /// much time remains on `cancel`. Non-2xx responses are not errors: the
    /// body is still returned and `error` stays `None`. Only transport
    /// failures, the per-request timeout, and cancellation produce an error.
    pub async fn fetch(
        &self,
        cancel: &CancellationToken,
        url: &str,
        timeout: Duration,
    ) -> FetchOutcome {
        let start = Instant::now();

        let request = async {
            let response = self.client.get(url).send().await?;
            let status = response.status().as_u16();
            let body = response.text().await?;
            Ok::<_, reqwest::Error>((status, body))
        };

        let result = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                return FetchOutcome {
                    status: 0,
                    body: String::new(),
                    elapsed: start.elapsed(),
                    error: Some(Error::Canceled),
                };
            }
            result = tokio::time::timeout(timeout, request) => result,
        };

        match result {
            Err(_) => FetchOutcome {
                status: 0,
                body: String::new(),
                elapsed: start.elapsed(),
                error: Some(Error::Timeout),
            },
            Ok(Err(e)) => FetchOutcome {
                status: 0,
                body: String::new(),
                elapsed: start.elapsed(),
                error: Some(Error::Transport(e.to_string())),
            },
            Ok(Ok((status, body))) => FetchOutcome {
                status,
                body,
                elapsed: start.elapsed(),
                error: None,
            },
        }
    }
}
