//! Concurrent web crawler
//!
//! A bounded, breadth-first crawl over hyperlinked HTML pages starting from a
//! seed URL: a concurrency-bounded worker pool, per-domain politeness,
//! normalized-URL dedup, depth and page-count bounds, and cooperative
//! cancellation.

pub mod common;
pub mod crawler;

pub use common::error::{Error, Result};

/// Re-export commonly used types.
pub mod prelude {
    pub use crate::common::config::{CrawlerConfig, CrawlerConfigBuilder};
    pub use crate::common::error::{Error, Result};
    pub use crate::crawler::{CrawlResult, Crawler};
}
