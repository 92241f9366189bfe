//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and run the full
//! crawl cycle over real HTTP. A second mock server on another port plays
//! the role of an external site.

use deadlink_scraper::config::{Config, CrawlerConfig, OutputConfig, UserAgentConfig};
use deadlink_scraper::crawler::{
    crawl, Coordinator, CrawlOptions, DeadReason, ReqwestTransport, Transport,
};
use deadlink_scraper::output::{format_markdown_report, generate_markdown_report};
use deadlink_scraper::ScraperError;
use std::time::Duration;
use url::Url;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration
fn create_test_config(concurrency: usize, timeout_ms: u64) -> Config {
    Config {
        crawler: CrawlerConfig {
            concurrency,
            timeout_ms,
        },
        user_agent: UserAgentConfig {
            name: "TestBot".to_string(),
            version: "1.0.0".to_string(),
        },
        output: OutputConfig { report_path: None },
    }
}

fn html(body: impl Into<String>) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(body.into(), "text/html; charset=utf-8")
}

/// Mounts an HTML page answering both HEAD and GET
async fn mount_page(server: &MockServer, page: &str, body: impl Into<String>) {
    Mock::given(path(page))
        .respond_with(html(body))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_full_crawl_single_site() {
    let site = MockServer::start().await;
    let external = MockServer::start().await;

    mount_page(
        &site,
        "/",
        format!(
            r##"<html><head><title>Home</title></head><body>
            <a href="/page1">Page 1</a>
            <a href="/missing">Missing</a>
            <a href="/doc.txt">Text</a>
            <a href="{ext}/ok">External ok</a>
            <a href="{ext}/gone">External gone</a>
            <a href="#top">Top</a>
            <a href="mailto:owner@example.com">Mail</a>
            </body></html>"##,
            ext = external.uri()
        ),
    )
    .await;
    mount_page(
        &site,
        "/page1",
        r#"<a href="/">Home</a><a href="/page2">Page 2</a>"#,
    )
    .await;
    mount_page(&site, "/page2", r#"<a href="/page1">Back</a>"#).await;

    Mock::given(path("/doc.txt"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(r#"<a href="/hidden">x</a>"#, "text/plain"),
        )
        .mount(&site)
        .await;

    Mock::given(path("/ok"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&external)
        .await;
    // Everything else on both servers answers 404

    let config = create_test_config(4, 5000);
    let report = crawl(&config, &site.uri())
        .await
        .expect("Crawl should succeed");
    let stats = &report.stats;

    assert_eq!(stats.total, 7);
    assert_eq!(stats.internal, 4);
    assert_eq!(stats.external, 2);
    assert_eq!(stats.skipped, 1);
    assert_eq!(stats.alive, 4);
    assert_eq!(stats.dead, 2);
    assert_eq!(stats.by_status_code.get("200"), Some(&4));
    assert_eq!(stats.by_status_code.get("404"), Some(&2));

    let dead: Vec<&str> = report
        .dead_links
        .iter()
        .map(|d| d.link.url.as_str())
        .collect();
    assert!(dead.contains(&format!("{}/missing", site.uri()).as_str()));
    assert!(dead.contains(&format!("{}/gone", external.uri()).as_str()));

    // Non-HTML pages are never parsed
    let received = site.received_requests().await.unwrap_or_default();
    assert!(received.iter().all(|r| r.url.path() != "/hidden"));

    // Anchors are never requested
    assert!(received.iter().all(|r| r.url.fragment().is_none()));
}

#[tokio::test]
async fn test_external_links_checked_not_crawled() {
    let site = MockServer::start().await;
    let external = MockServer::start().await;

    mount_page(
        &site,
        "/",
        format!(
            r#"<a href="{ext}/">External</a><a href="/again">Again</a>"#,
            ext = external.uri()
        ),
    )
    .await;
    mount_page(
        &site,
        "/again",
        format!(r#"<a href="{ext}/">Same external</a>"#, ext = external.uri()),
    )
    .await;
    mount_page(&external, "/", r#"<a href="/deeper">Deeper</a>"#).await;

    let config = create_test_config(3, 5000);
    let report = crawl(&config, &site.uri()).await.unwrap();

    assert_eq!(report.stats.external, 1);
    assert_eq!(report.stats.internal, 1);

    // One HEAD for the check, never a GET for crawling
    let received = external.received_requests().await.unwrap_or_default();
    assert_eq!(received.len(), 1);
    assert_eq!(received[0].method.to_string(), "HEAD");
    assert_eq!(received[0].url.path(), "/");
}

#[tokio::test]
async fn test_user_agent_header() {
    let site = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .and(header("user-agent", "TestBot/1.0.0"))
        .respond_with(html(r#"<a href="/child">child</a>"#))
        .mount(&site)
        .await;
    Mock::given(path("/child"))
        .and(header("user-agent", "TestBot/1.0.0"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&site)
        .await;

    let report = crawl(&create_test_config(2, 5000), &site.uri())
        .await
        .unwrap();

    assert_eq!(report.stats.alive, 1);
    assert_eq!(report.stats.by_status_code.get("204"), Some(&1));
}

#[tokio::test]
async fn test_redirects_followed() {
    let site = MockServer::start().await;

    mount_page(&site, "/", r#"<a href="/old">Old</a>"#).await;
    Mock::given(path("/old"))
        .respond_with(ResponseTemplate::new(301).insert_header("location", "/new/"))
        .mount(&site)
        .await;
    mount_page(&site, "/new/", r#"<a href="child">Child</a>"#).await;
    mount_page(&site, "/new/child", "<p>leaf</p>").await;

    let report = crawl(&create_test_config(2, 5000), &site.uri())
        .await
        .unwrap();

    // The redirect is reported with its final status
    assert_eq!(report.stats.by_status_code.get("301"), None);
    assert_eq!(report.stats.dead, 0);

    // Relative links resolve against the post-redirect URL
    let child = format!("{}/new/child", site.uri());
    assert!(report.checked.iter().any(|l| l.url == child));
}

#[tokio::test]
async fn test_non_html_body_never_downloaded() {
    let site = MockServer::start().await;

    Mock::given(path("/big.bin"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(vec![0u8; 20 * 1024 * 1024], "application/octet-stream"),
        )
        .mount(&site)
        .await;
    mount_page(&site, "/", r#"<a href="/big.bin">bin</a>"#).await;

    let transport = ReqwestTransport::from_config(&UserAgentConfig::default()).unwrap();
    let timeout = Duration::from_secs(5);

    let bin = Url::parse(&format!("{}/big.bin", site.uri())).unwrap();
    let page = transport.get_page(&bin, timeout).await.unwrap();
    assert_eq!(page.status, 200);
    assert!(!page.is_html());
    assert!(page.body.is_empty());

    // Liveness GETs skip the body even for HTML
    let home = Url::parse(&format!("{}/", site.uri())).unwrap();
    let checked = transport.get(&home, timeout).await.unwrap();
    assert!(checked.is_html());
    assert!(checked.body.is_empty());

    let page = transport.get_page(&home, timeout).await.unwrap();
    assert!(page.body.contains("/big.bin"));
}

#[tokio::test]
async fn test_timeout_marks_link_dead() {
    let site = MockServer::start().await;

    mount_page(&site, "/", r#"<a href="/slow">Slow</a>"#).await;
    Mock::given(path("/slow"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(2)))
        .mount(&site)
        .await;

    let report = crawl(&create_test_config(2, 200), &site.uri())
        .await
        .unwrap();

    assert_eq!(report.stats.dead, 1);
    assert!(report.stats.by_status_code.is_empty());
    assert!(matches!(
        report.dead_links[0].reason,
        DeadReason::Transport(deadlink_scraper::TransportError::Timeout { .. })
    ));
}

#[tokio::test]
async fn test_worker_counts_agree() {
    let site = MockServer::start().await;

    let mut index = String::new();
    for i in 0..15 {
        index.push_str(&format!(r#"<a href="/p{}">p{}</a>"#, i, i));
        mount_page(
            &site,
            &format!("/p{}", i),
            format!(
                r##"<a href="/p{}">next</a><a href="/dead{}">dead</a><a href="#s">s</a>"##,
                (i + 1) % 15,
                i % 4
            ),
        )
        .await;
    }
    mount_page(&site, "/", index).await;

    let mut results = Vec::new();
    for concurrency in [1, 5, 50] {
        let transport = ReqwestTransport::from_config(&UserAgentConfig::default()).unwrap();
        let coordinator = Coordinator::new(
            transport,
            CrawlOptions {
                concurrency,
                timeout: Duration::from_secs(5),
            },
        );
        let report = tokio::time::timeout(Duration::from_secs(30), coordinator.run(&site.uri()))
            .await
            .expect("Crawl should terminate")
            .unwrap();
        results.push(report);
    }

    assert_eq!(results[0].stats.internal, 19);
    assert_eq!(results[0].stats.skipped, 15);
    assert_eq!(results[0].stats.dead, 4);
    for report in &results[1..] {
        assert_eq!(report.stats, results[0].stats);
        assert_eq!(report.checked, results[0].checked);
    }
}

#[tokio::test]
async fn test_unreachable_seed_is_not_fatal() {
    let site = MockServer::start().await;
    let uri = site.uri();
    drop(site);

    let report = crawl(&create_test_config(2, 500), &uri).await.unwrap();
    assert_eq!(report.stats.total, 0);
}

#[tokio::test]
async fn test_invalid_seed_is_fatal() {
    let result = crawl(&create_test_config(2, 500), "http://[::1").await;
    assert!(matches!(result, Err(ScraperError::InvalidSeed { .. })));
}

#[tokio::test]
async fn test_markdown_report_file() {
    let site = MockServer::start().await;
    mount_page(&site, "/", r#"<a href="/missing">Missing</a>"#).await;

    let report = crawl(&create_test_config(2, 5000), &site.uri())
        .await
        .unwrap();

    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("report.md");
    generate_markdown_report(&report, &path).unwrap();

    let written = std::fs::read_to_string(&path).unwrap();
    assert_eq!(written, format_markdown_report(&report));
    assert!(written.contains(&format!("{}/missing", site.uri())));
    assert!(written.contains("| Dead | 1 |"));
}
