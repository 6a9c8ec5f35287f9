//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and drive the
//! full crawl cycle end-to-end: frontier, politeness, fetch, block store,
//! Merkle diffing, and peer propagation over the in-process transport.

use meshcrawl::config::Config;
use meshcrawl::crawler::crawl;
use meshcrawl::dht::{DhtTransport, DiffAnnouncement, LocalHub, DIFF_TOPIC, URL_TOPIC};
use meshcrawl::ContentStore;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a fast test configuration backed by a temp database
fn test_config(dir: &TempDir) -> Config {
    let mut config = Config::default();
    config.crawler.worker_count = 3;
    config.crawler.domain_delay_ms = 1;
    config.crawler.chunk_size = 64;
    config.storage.database_path = dir
        .path()
        .join("crawl.db")
        .to_string_lossy()
        .into_owned();
    config
}

async fn mount_page(server: &MockServer, page_path: &str, body: &str) {
    Mock::given(method("GET"))
        .and(path(page_path.to_string()))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(body.to_string())
                .insert_header("content-type", "text/html"),
        )
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_full_crawl_follows_links() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(ResponseTemplate::new(200).set_body_string("User-agent: *\nAllow: /"))
        .mount(&server)
        .await;
    mount_page(
        &server,
        "/",
        r#"<html><body><a href="/page1">1</a><a href="/page2">2</a></body></html>"#,
    )
    .await;
    mount_page(&server, "/page1", "<html><body>first page body</body></html>").await;
    mount_page(&server, "/page2", "<html><body>second page body</body></html>").await;

    let dir = TempDir::new().unwrap();
    let config = test_config(&dir);
    let db_path = config.storage.database_path.clone();

    let summary = crawl(config, vec![format!("{}/", server.uri())], 0, None)
        .await
        .unwrap();

    assert_eq!(summary.attempted, 3);
    assert_eq!(summary.succeeded, 3);
    assert_eq!(summary.failed, 0);

    // Every crawled page left a persisted version and content blocks.
    let store = ContentStore::open(std::path::Path::new(&db_path)).unwrap();
    assert!(store.block_count().unwrap() > 0);
    let version = store
        .load_version(&format!("{}/page1", server.uri()))
        .unwrap()
        .unwrap();
    assert!(!version.leaves.is_empty());
    assert!(version.root.is_some());
}

#[tokio::test]
async fn test_robots_disallow_is_respected() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("User-agent: *\nDisallow: /private\nAllow: /private/open"),
        )
        .mount(&server)
        .await;
    mount_page(&server, "/open", "public content").await;
    mount_page(&server, "/private/secret", "hidden content").await;
    mount_page(&server, "/private/open", "carved-out content").await;

    let dir = TempDir::new().unwrap();
    let seeds = vec![
        format!("{}/open", server.uri()),
        format!("{}/private/secret", server.uri()),
        format!("{}/private/open", server.uri()),
    ];

    let summary = crawl(test_config(&dir), seeds, 0, None).await.unwrap();

    assert_eq!(summary.attempted, 3);
    assert_eq!(summary.succeeded, 2);
    assert_eq!(summary.skipped, 1);
}

#[tokio::test]
async fn test_missing_robots_defaults_to_allow() {
    let server = MockServer::start().await;
    // No robots.txt mock: the fetch 404s and everything is allowed.
    mount_page(&server, "/page", "content without robots").await;

    let dir = TempDir::new().unwrap();
    let summary = crawl(
        test_config(&dir),
        vec![format!("{}/page", server.uri())],
        0,
        None,
    )
    .await
    .unwrap();

    assert_eq!(summary.succeeded, 1);
    assert_eq!(summary.skipped, 0);
}

#[tokio::test]
async fn test_dedup_identical_blocks_across_pages() {
    let server = MockServer::start().await;
    // Two URLs, byte-identical bodies: blocks are stored once.
    // Four distinct 64-byte chunks at the test chunk size.
    let body: String = (0..4).map(|i| format!("{}{}", "y".repeat(63), i)).collect();
    mount_page(&server, "/copy1", &body).await;
    mount_page(&server, "/copy2", &body).await;

    let dir = TempDir::new().unwrap();
    let config = test_config(&dir);
    let db_path = config.storage.database_path.clone();
    let seeds = vec![
        format!("{}/copy1", server.uri()),
        format!("{}/copy2", server.uri()),
    ];

    let summary = crawl(config, seeds, 0, None).await.unwrap();
    assert_eq!(summary.succeeded, 2);

    let store = ContentStore::open(std::path::Path::new(&db_path)).unwrap();
    // 256 bytes at chunk-size 64 is 4 distinct blocks, shared by both URLs.
    assert_eq!(store.block_count().unwrap(), 4);
}

#[tokio::test]
async fn test_change_detection_across_passes() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let seeds = vec![format!("{}/page", server.uri())];

    let hub = LocalHub::new();
    let observer = hub.node("observer");
    let announcements: Arc<Mutex<Vec<DiffAnnouncement>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&announcements);
    observer
        .subscribe(
            DIFF_TOPIC,
            Arc::new(move |_from: &str, data: &[u8]| {
                sink.lock().unwrap().push(DiffAnnouncement::from_bytes(data).unwrap());
            }),
        )
        .unwrap();

    // First pass: everything is new, one announcement.
    mount_page(&server, "/page", &"a".repeat(128)).await;
    let node: Arc<dyn DhtTransport> = Arc::new(hub.node("crawler"));
    crawl(test_config(&dir), seeds.clone(), 0, Some(Arc::clone(&node)))
        .await
        .unwrap();
    assert_eq!(announcements.lock().unwrap().len(), 1);
    let first_root = announcements.lock().unwrap()[0].new_root.clone();

    // Second pass, content changed: a second announcement with a new root.
    server.reset().await;
    mount_page(&server, "/page", &"b".repeat(128)).await;
    crawl(test_config(&dir), seeds.clone(), 0, Some(Arc::clone(&node)))
        .await
        .unwrap();
    {
        let seen = announcements.lock().unwrap();
        assert_eq!(seen.len(), 2);
        assert_ne!(seen[1].new_root, first_root);
        assert_eq!(seen[1].old_root, first_root);
        assert!(!seen[1].changed.is_empty());
    }

    // Third pass, content unchanged: nothing new to announce.
    crawl(test_config(&dir), seeds, 0, Some(node)).await.unwrap();
    assert_eq!(announcements.lock().unwrap().len(), 2);
}

#[tokio::test]
async fn test_discovered_urls_propagate_between_nodes() {
    let server = MockServer::start().await;

    mount_page(
        &server,
        "/hub-page",
        r#"<html><body><a href="/found1">f1</a><a href="/found2">f2</a></body></html>"#,
    )
    .await;
    mount_page(&server, "/found1", "found one").await;
    mount_page(&server, "/found2", "found two").await;
    // Node B's seed is slow, keeping B alive while A announces links.
    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("slow body")
                .set_delay(std::time::Duration::from_millis(800)),
        )
        .mount(&server)
        .await;

    let hub = LocalHub::new();
    let node_a: Arc<dyn DhtTransport> = Arc::new(hub.node("node-a"));
    let node_b: Arc<dyn DhtTransport> = Arc::new(hub.node("node-b"));

    let dir_b = TempDir::new().unwrap();
    let seeds_b = vec![format!("{}/slow", server.uri())];
    let config_b = test_config(&dir_b);
    let b_task = tokio::spawn(async move { crawl(config_b, seeds_b, 0, Some(node_b)).await });

    // Let B subscribe and start its slow fetch before A crawls.
    tokio::time::sleep(std::time::Duration::from_millis(100)).await;

    let dir_a = TempDir::new().unwrap();
    let summary_a = crawl(
        test_config(&dir_a),
        vec![format!("{}/hub-page", server.uri())],
        0,
        Some(node_a),
    )
    .await
    .unwrap();
    assert_eq!(summary_a.succeeded, 3);

    // B crawls its slow seed plus the two URLs A announced.
    let summary_b = b_task.await.unwrap().unwrap();
    assert_eq!(summary_b.attempted, 3);
    assert_eq!(summary_b.succeeded, 3);
}

#[tokio::test]
async fn test_failed_fetch_recorded_not_fatal() {
    let server = MockServer::start().await;
    mount_page(&server, "/good", "fine").await;
    Mock::given(method("GET"))
        .and(path("/broken"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let seeds = vec![
        format!("{}/good", server.uri()),
        format!("{}/broken", server.uri()),
    ];

    let summary = crawl(test_config(&dir), seeds, 0, None).await.unwrap();
    assert_eq!(summary.attempted, 2);
    assert_eq!(summary.succeeded, 1);
    assert_eq!(summary.failed, 1);
}

#[tokio::test]
async fn test_max_pages_limits_crawl() {
    let server = MockServer::start().await;
    for i in 0..10 {
        mount_page(&server, &format!("/p{}", i), "body").await;
    }

    let dir = TempDir::new().unwrap();
    let seeds = (0..10).map(|i| format!("{}/p{}", server.uri(), i)).collect();

    let summary = crawl(test_config(&dir), seeds, 4, None).await.unwrap();
    assert_eq!(summary.attempted, 4);
}
