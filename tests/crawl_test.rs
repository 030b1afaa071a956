//! End-to-end crawl scenarios against a mock HTTP server.

use std::time::Duration;

use tokio_util::sync::CancellationToken;
use web_crawler::prelude::*;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn html(title: &str, links: &[&str]) -> String {
    let anchors: String = links
        .iter()
        .map(|l| format!(r#"<a href="{l}">link</a>"#))
        .collect();
    format!("<html><head><title>{title}</title></head><body>{anchors}</body></html>")
}

async fn fan_out_server() -> MockServer {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(html(
            "Home Page",
            &["/page1", "/page2", "http://external.com"],
        )))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/page1"))
        .respond_with(ResponseTemplate::new(200).set_body_string(html(
            "Page 1",
            &["/page1-1", "/page1-2"],
        )))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/page2"))
        .respond_with(ResponseTemplate::new(200).set_body_string(html("Page 2", &[])))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/page1-1"))
        .respond_with(ResponseTemplate::new(200).set_body_string(html("Page 1-1", &[])))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/page1-2"))
        .respond_with(ResponseTemplate::new(200).set_body_string(html("Page 1-2", &[])))
        .mount(&server)
        .await;

    server
}

#[tokio::test]
async fn single_page_crawl() {
    let server = fan_out_server().await;
    let config = CrawlerConfigBuilder::new().max_depth(0).build();
    let crawler = Crawler::new(config).unwrap();

    let results = crawler
        .crawl(CancellationToken::new(), &server.uri())
        .await
        .unwrap();

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].title, "Home Page");
    assert_eq!(results[0].status, 200);
    assert_eq!(results[0].depth, 0);
}

#[tokio::test]
async fn depth_one_fan_out_excludes_external_and_grandchildren() {
    let server = fan_out_server().await;
    let config = CrawlerConfigBuilder::new()
        .max_depth(1)
        .follow_external(false)
        .build();
    let crawler = Crawler::new(config).unwrap();

    let results = crawler
        .crawl(CancellationToken::new(), &server.uri())
        .await
        .unwrap();

    assert_eq!(results.len(), 3);
    assert!(!results.iter().any(|r| r.url.contains("page1-1")));
    assert!(!results.iter().any(|r| r.url.contains("page1-2")));
    assert!(!results.iter().any(|r| r.url.contains("external.com")));
}

#[tokio::test]
async fn page_cap_limits_result_count() {
    let server = fan_out_server().await;
    let config = CrawlerConfigBuilder::new()
        .max_depth(5)
        .max_pages(2)
        .build();
    let crawler = Crawler::new(config).unwrap();

    let results = crawler
        .crawl(CancellationToken::new(), &server.uri())
        .await
        .unwrap();

    assert_eq!(results.len(), 2);
}

#[tokio::test]
async fn cycles_are_visited_at_most_once() {
    let server = MockServer::start().await;
    let base = server.uri();

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(html(
            "Root",
            &["/", "/page1"],
        )))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/page1"))
        .respond_with(ResponseTemplate::new(200).set_body_string(html(
            "Page 1",
            &["/", "/page1"],
        )))
        .mount(&server)
        .await;

    let config = CrawlerConfigBuilder::new().max_depth(3).build();
    let crawler = Crawler::new(config).unwrap();

    let results = crawler.crawl(CancellationToken::new(), &base).await.unwrap();

    let mut urls: Vec<&str> = results.iter().map(|r| r.url.as_str()).collect();
    urls.sort();
    urls.dedup();
    assert_eq!(urls.len(), results.len());
}

#[tokio::test]
async fn slow_response_produces_a_timeout_error_result() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(html("Slow", &[]))
                .set_delay(Duration::from_millis(200)),
        )
        .mount(&server)
        .await;

    let config = CrawlerConfigBuilder::new()
        .max_depth(0)
        .timeout(Duration::from_millis(50))
        .build();
    let crawler = Crawler::new(config).unwrap();

    let results = crawler
        .crawl(CancellationToken::new(), &server.uri())
        .await
        .unwrap();

    assert_eq!(results.len(), 1);
    assert!(results[0].error.is_some());
    assert_eq!(results[0].status, 0);
}

#[tokio::test]
async fn cancellation_returns_partial_results_without_panicking() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(html("Slow Root", &["/page1"]))
                .set_delay(Duration::from_millis(100)),
        )
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/page1"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(html("Slow Page 1", &[]))
                .set_delay(Duration::from_millis(100)),
        )
        .mount(&server)
        .await;

    let config = CrawlerConfigBuilder::new()
        .max_depth(3)
        .max_concurrent(1)
        .build();
    let crawler = Crawler::new(config).unwrap();

    let cancel = CancellationToken::new();
    let cancel_trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        cancel_trigger.cancel();
    });

    let results = crawler.crawl(cancel, &server.uri()).await.unwrap();

    // The full graph (/ -> /page1) would take ~200ms; a 50ms cancellation
    // must cut the crawl short of completing both pages.
    assert!(results.len() <= 2);
}

#[tokio::test]
async fn invalid_seed_url_is_rejected_without_results() {
    let config = CrawlerConfigBuilder::new().build();
    let crawler = Crawler::new(config).unwrap();

    let result = crawler.crawl(CancellationToken::new(), "not a url").await;
    assert!(result.is_err());

    let result = crawler
        .crawl(CancellationToken::new(), "ftp://example.com")
        .await;
    assert!(result.is_err());
}
