use std::time::Duration;

use clap::Parser as ClapParser;
use tokio_util::sync::CancellationToken;
use tracing::Level;
use web_crawler::prelude::*;

#[derive(ClapParser, Debug)]
#[clap(author, version, about = "Concurrent, bounded breadth-first web crawler")]
struct Args {
    /// Seed URL to crawl
    url: String,

    /// Maximum number of pages to crawl (0 = unlimited)
    #[clap(short, long, default_value = "100")]
    max_pages: usize,

    /// Maximum crawl depth (0 = seed only)
    #[clap(short = 'd', long, default_value = "3")]
    max_depth: usize,

    /// Number of concurrent workers
    #[clap(short = 'c', long, default_value = "5")]
    concurrent: usize,

    /// Minimum delay between requests to the same domain, in milliseconds
    #[clap(long, default_value = "1000")]
    rate_limit_delay: u64,

    /// Per-request timeout, in seconds
    #[clap(long, default_value = "30")]
    timeout: u64,

    /// Follow links to domains other than the seed's
    #[clap(long)]
    follow_external: bool,

    /// User-Agent header sent on every request
    #[clap(long, default_value = "web-crawler/0.1")]
    user_agent: String,

    /// Print the final results as JSON instead of a summary
    #[clap(long)]
    json: bool,

    /// Enable debug logging
    #[clap(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let level = if args.verbose { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::fmt().with_max_level(level).init();

    if !args.json {
        println!("Web Crawler");
        println!("===========");
        println!("\nConfiguration:");
        println!("  Seed URL:         {}", args.url);
        println!("  Max pages:        {}", args.max_pages);
        println!("  Max depth:        {}", args.max_depth);
        println!("  Concurrent:       {}", args.concurrent);
        println!("  Rate limit delay: {}ms", args.rate_limit_delay);
        println!("  Timeout:          {}s", args.timeout);
        println!("  Follow external:  {}", args.follow_external);
    }

    let config = CrawlerConfigBuilder::new()
        .max_pages(args.max_pages)
        .max_depth(args.max_depth)
        .max_concurrent(args.concurrent)
        .rate_limit_delay(Duration::from_millis(args.rate_limit_delay))
        .timeout(Duration::from_secs(args.timeout))
        .follow_external(args.follow_external)
        .user_agent(args.user_agent)
        .build();

    let crawler = Crawler::new(config)?;
    let cancel = CancellationToken::new();

    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            let _ = tokio::signal::ctrl_c().await;
            cancel.cancel();
        });
    }

    if !args.json {
        println!("\nStarting crawl...\n");
    }

    let start = std::time::Instant::now();
    let results = crawler.crawl(cancel, &args.url).await?;
    let duration = start.elapsed();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&results).unwrap_or_default());
        return Ok(());
    }

    let failed = results.iter().filter(|r| r.error.is_some()).count();
    let total_links: usize = results.iter().map(|r| r.links.len()).sum();

    println!("Crawl completed!");
    println!("\nFinal statistics:");
    println!("  Pages crawled:  {}", results.len());
    println!("  Failed fetches: {}", failed);
    println!("  Links found:    {}", total_links);
    println!("  Duration:       {:.2?}", duration);
    if !results.is_empty() {
        let rate = results.len() as f64 / duration.as_secs_f64();
        println!("  Speed:          {:.2} pages/second", rate);
    }

    Ok(())
}
