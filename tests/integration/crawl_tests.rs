//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and test
//! the full crawl cycle end-to-end, from seed URL to rendered site tree.

use site_tree::config::{Config, CrawlerConfig, OutputConfig, UserAgentConfig};
use site_tree::crawler::{run_crawl, Coordinator, HtmlLinkExtractor, HttpFetcher};
use site_tree::output::{render_site_tree, write_site_tree, TreeStatistics};
use site_tree::{CrawlError, PageEntry};
use std::sync::Arc;
use tempfile::TempDir;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration with the given worker count
fn create_test_config(workers: usize) -> Config {
    Config {
        crawler: CrawlerConfig {
            workers,
            request_timeout: 5,
            connect_timeout: 2,
        },
        user_agent: UserAgentConfig {
            crawler_name: "TestBot".to_string(),
            crawler_version: "1.0.0".to_string(),
            contact_url: Some("https://example.com/contact".to_string()),
        },
        output: OutputConfig {
            sitemap_path: "sitemap.txt".to_string(),
        },
    }
}

/// Mounts an HTML page at `page_path`
async fn mount_page(server: &MockServer, page_path: &str, body: &str) {
    Mock::given(method("GET"))
        .and(path(page_path))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body.to_string(), "text/html"))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_full_crawl_single_page_with_external_link() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_page(
        &mock_server,
        "/",
        r#"<html><body>
            <a href="/a">A</a>
            <a href="https://external.example.org/">Elsewhere</a>
        </body></html>"#,
    )
    .await;
    mount_page(&mock_server, "/a", "<html><body>No links here</body></html>").await;

    let report = run_crawl(&base_url, &create_test_config(2)).await.unwrap();

    assert_eq!(report.pages_crawled, 2);
    assert_eq!(report.pages_failed, 0);

    let root = &report.root;
    assert_eq!(root.name, base_url);
    assert!(root.external_links.contains("https://external.example.org"));
    let a = root.child(&format!("{}/a", base_url)).unwrap();
    assert!(a.is_leaf());
    assert!(a.external_links.is_empty());
}

#[tokio::test]
async fn test_crawl_sends_configured_user_agent() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .and(header(
            "user-agent",
            "TestBot/1.0.0 (+https://example.com/contact)",
        ))
        .respond_with(ResponseTemplate::new(200).set_body_raw("<html></html>", "text/html"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let report = run_crawl(&mock_server.uri(), &create_test_config(1))
        .await
        .unwrap();
    assert_eq!(report.pages_crawled, 1);
}

#[tokio::test]
async fn test_crawl_breaks_cycles() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_page(&mock_server, "/", r#"<a href="/b">B</a>"#).await;
    mount_page(&mock_server, "/b", r#"<a href="/">Home</a>"#).await;

    let report = run_crawl(&base_url, &create_test_config(4)).await.unwrap();

    assert_eq!(report.pages_crawled, 2);
    let b = report.root.child(&format!("{}/b", base_url)).unwrap();
    assert!(b.is_leaf());
    assert!(!report.root.has_descendant(&base_url));
}

#[tokio::test]
async fn test_broken_link_appears_as_empty_page() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_page(
        &mock_server,
        "/",
        r#"<a href="/gone">Gone</a><a href="/doc.pdf">Doc</a><img src="/logo.png">"#,
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/gone"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/doc.pdf"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("%PDF", "application/pdf"))
        .mount(&mock_server)
        .await;

    let report = run_crawl(&base_url, &create_test_config(2)).await.unwrap();

    assert_eq!(report.pages_crawled, 1);
    assert_eq!(report.pages_failed, 2);
    for failed in ["/gone", "/doc.pdf"] {
        let page = report.root.child(&format!("{}{}", base_url, failed)).unwrap();
        assert!(page.is_leaf());
        assert!(page.images.is_empty());
    }
    assert!(report.root.images.contains(&format!("{}/logo.png", base_url)));
}

#[tokio::test]
async fn test_unreachable_seed_produces_lone_root() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    let report = run_crawl(&base_url, &create_test_config(3)).await.unwrap();

    assert_eq!(report.pages_crawled, 0);
    assert_eq!(report.pages_failed, 1);
    assert_eq!(render_site_tree(&report.root).unwrap(), format!("{}\n", base_url));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_worker_count_does_not_change_tree() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    // A small grid where every page links to its neighbours and back home
    for i in 0..10 {
        let body = format!(
            r#"<a href="/">home</a><a href="/p{}">next</a><a href="/p{}">skip</a><img src="/p{}.png">"#,
            (i + 1) % 10,
            (i + 3) % 10,
            i
        );
        mount_page(&mock_server, &format!("/p{}", i), &body).await;
    }
    mount_page(&mock_server, "/", r#"<a href="/p0">start</a>"#).await;

    let mut trees = Vec::new();
    for workers in [1, 2, 8] {
        let report = run_crawl(&base_url, &create_test_config(workers))
            .await
            .unwrap();
        assert_eq!(report.pages_crawled, 11, "with {} workers", workers);
        trees.push(report.root);
    }

    assert_eq!(trees[0], trees[1]);
    assert_eq!(trees[0], trees[2]);
    assert_eq!(TreeStatistics::from_tree(&trees[0]).distinct_pages, 11);
}

#[tokio::test]
async fn test_coordinator_exposes_scheduler_state() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_page(&mock_server, "/", r#"<a href="/a">A</a>"#).await;
    mount_page(&mock_server, "/a", "").await;

    let config = create_test_config(2);
    let coordinator = Coordinator::new(
        &base_url,
        2,
        Arc::new(HttpFetcher::from_config(&config).unwrap()),
        Arc::new(HtmlLinkExtractor),
    )
    .unwrap();
    let scheduler = Arc::clone(coordinator.scheduler());

    assert_eq!(scheduler.entry(&base_url), Some(PageEntry::Pending));
    coordinator.run().await.unwrap();

    assert!(scheduler.is_finished());
    assert_eq!(scheduler.pending_count(), 0);
    assert_eq!(scheduler.page_count(), 2);
}

#[tokio::test]
async fn test_invalid_seed_is_rejected() {
    let result = run_crawl("not a url", &create_test_config(1)).await;
    assert!(matches!(result, Err(CrawlError::Config(_))));
}

#[tokio::test]
async fn test_crawl_and_write_site_tree() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_page(
        &mock_server,
        "/",
        r#"<a href="/about">About</a><a href="http://www.twitter.com">Twitter</a>"#,
    )
    .await;
    mount_page(&mock_server, "/about", r#"<img src="team.jpg">"#).await;

    let report = run_crawl(&base_url, &create_test_config(2)).await.unwrap();

    let dir = TempDir::new().unwrap();
    let output = dir.path().join("sitemap.txt");
    write_site_tree(&report.root, &output).unwrap();

    let expected = format!(
        "{base}\n  ExternalLinks\n    http://www.twitter.com\n  Internal links\n    {base}/about\n      Images\n        {base}/team.jpg\n",
        base = base_url
    );
    assert_eq!(std::fs::read_to_string(&output).unwrap(), expected);
}
