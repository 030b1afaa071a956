use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::common::error::{Error, Result};

/// Frozen configuration for a `Crawler`, validated once at construction time.
///
/// Every field here corresponds to one option in the crawl engine's contract;
/// nothing here is mutated after `Crawler::new` returns.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlerConfig {
    /// Maximum edge distance from the seed. 0 means "seed only".
    pub max_depth: usize,

    /// Number of simultaneous in-flight fetches.
    pub max_concurrent: usize,

    /// Per-request timeout, enforced even if the crawl's overall deadline is longer.
    #[serde(with = "duration_millis")]
    pub timeout: Duration,

    /// Hard cap on the number of admitted (and therefore emitted) URLs. 0 = unlimited.
    pub max_pages: usize,

    /// Minimum interval between fetch starts to the same domain.
    #[serde(with = "duration_millis")]
    pub rate_limit_delay: Duration,

    /// User-Agent header sent on every request.
    pub user_agent: String,

    /// If false, only URLs whose domain equals the seed's domain are admitted.
    pub follow_external: bool,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            max_depth: 3,
            max_concurrent: 5,
            timeout: Duration::from_secs(30),
            max_pages: 100,
            rate_limit_delay: Duration::from_millis(500),
            user_agent: "web-crawler/0.1".to_string(),
            follow_external: false,
        }
    }
}

impl CrawlerConfig {
    /// Validate the constraints every `Crawler` relies on.
    pub fn validate(&self) -> Result<()> {
        if self.max_concurrent == 0 {
            return Err(Error::InvalidConfig(
                "max_concurrent must be >= 1".to_string(),
            ));
        }
        if self.timeout.is_zero() {
            return Err(Error::InvalidConfig("timeout must be > 0".to_string()));
        }
        Ok(())
    }
}

/// Ergonomic, chainable construction of a `CrawlerConfig`.
#[derive(Debug, Default)]
pub struct CrawlerConfigBuilder {
    config: CrawlerConfig,
}

impl CrawlerConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: CrawlerConfig::default(),
        }
    }

    pub fn max_depth(mut self, depth: usize) -> Self {
        self.config.max_depth = depth;
        self
    }

    pub fn max_concurrent(mut self, concurrent: usize) -> Self {
        self.config.max_concurrent = concurrent;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    pub fn max_pages(mut self, max: usize) -> Self {
        self.config.max_pages = max;
        self
    }

    pub fn rate_limit_delay(mut self, delay: Duration) -> Self {
        self.config.rate_limit_delay = delay;
        self
    }

    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.config.user_agent = agent.into();
        self
    }

    pub fn follow_external(mut self, follow: bool) -> Self {
        self.config.follow_external = follow;
        self
    }

    pub fn build(self) -> CrawlerConfig {
        self.config
    }
}

mod duration_millis {
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
