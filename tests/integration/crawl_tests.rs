//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and test
//! the full crawl cycle end-to-end, exporting into temporary directories.

use std::sync::Arc;
use std::time::{Duration, Instant};
use tempfile::TempDir;
use tokio::sync::mpsc::unbounded_channel;
use webspider::config::Config;
use webspider::crawler::{CrawlOutcome, Crawler};
use webspider::events::{ChannelListener, CrawlEventKind, NoopListener};
use webspider::output::{link_file_path, read_link_file};
use webspider::{Address, CrawlState, Disposition, SpiderError};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration exporting into `dir`
fn create_test_config(dir: &TempDir) -> Config {
    let mut config = Config::default();
    config.output.directory = dir.path().to_string_lossy().into_owned();
    config
}

fn address(server: &MockServer, route: &str) -> Address {
    Address::parse(&format!("{}{}", server.uri(), route)).unwrap()
}

async fn mount_html(server: &MockServer, route: &str, body: &str) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(body, "text/html"),
        )
        .mount(server)
        .await;
}

async fn mount_robots(server: &MockServer, body: &str) {
    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(server)
        .await;
}

/// Mounts the five-category site: one address of each kind reachable from `/`
async fn mount_mixed_site(server: &MockServer) {
    mount_robots(server, "User-agent: *\nDisallow: /blocked").await;

    mount_html(
        server,
        "/",
        r#"<html><body>
            <a href="/a">A</a>
            <a href="http://other.test/">Elsewhere</a>
            <a href="/blocked">Blocked</a>
            <link rel="stylesheet" href="/image.css">
            <a href="/broken">Broken</a>
            <a href="mailto:owner@example.test">Mail</a>
        </body></html>"#,
    )
    .await;

    mount_html(
        server,
        "/a",
        r#"<html><body><a href="/">Home</a><a href="/a#top">Top</a></body></html>"#,
    )
    .await;

    Mock::given(method("GET"))
        .and(path("/image.css"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw("body { color: red }", "text/css"),
        )
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/broken"))
        .respond_with(ResponseTemplate::new(500).insert_header("content-type", "text/html"))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/blocked"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(server)
        .await;
}

fn exported(dir: &TempDir, disposition: Disposition) -> Vec<String> {
    let config = create_test_config(dir);
    read_link_file(&link_file_path(&config.output, "127.0.0.1", disposition))
        .expect("link file should exist")
}

#[tokio::test]
async fn test_full_crawl_sorts_every_category() {
    let server = MockServer::start().await;
    mount_mixed_site(&server).await;

    let dir = TempDir::new().unwrap();
    let crawler = Crawler::spawn(
        &create_test_config(&dir),
        address(&server, "/"),
        Arc::new(NoopListener),
    )
    .expect("Failed to start crawl");

    let outcome = crawler.wait().await.expect("Crawl failed");
    let report = match outcome {
        CrawlOutcome::Completed { report } => report,
        CrawlOutcome::Stopped => panic!("crawl should have completed"),
    };

    assert_eq!(crawler.state(), CrawlState::Idle);
    assert_eq!(
        crawler.local_links(),
        vec![address(&server, "/"), address(&server, "/a")]
    );
    assert_eq!(
        crawler.external_links(),
        vec![Address::parse("http://other.test/").unwrap()]
    );
    assert_eq!(crawler.disallowed_links(), vec![address(&server, "/blocked")]);
    assert_eq!(crawler.non_parsable_links(), vec![address(&server, "/image.css")]);
    assert_eq!(crawler.dead_links(), vec![address(&server, "/broken")]);
    assert_eq!(crawler.robots_disallowed(), vec![address(&server, "/blocked")]);

    assert_eq!(report.written.len(), 5);
    assert!(report.skipped.is_empty());

    assert_eq!(
        exported(&dir, Disposition::Local),
        vec![address(&server, "/").to_string(), address(&server, "/a").to_string()]
    );
    assert_eq!(exported(&dir, Disposition::External), vec!["http://other.test/"]);
    assert_eq!(
        exported(&dir, Disposition::Disallowed),
        vec![address(&server, "/blocked").to_string()]
    );
    assert_eq!(
        exported(&dir, Disposition::NonParsable),
        vec![address(&server, "/image.css").to_string()]
    );
    assert_eq!(
        exported(&dir, Disposition::Dead),
        vec![address(&server, "/broken").to_string()]
    );
}

#[tokio::test]
async fn test_every_address_lands_in_exactly_one_set() {
    let server = MockServer::start().await;
    mount_mixed_site(&server).await;

    let dir = TempDir::new().unwrap();
    let crawler = Crawler::spawn(
        &create_test_config(&dir),
        address(&server, "/"),
        Arc::new(NoopListener),
    )
    .unwrap();
    crawler.wait().await.unwrap();

    let stats = crawler.stats();
    assert_eq!(stats.frontier, 0);
    assert_eq!(stats.total(), 6);

    let mut all: Vec<Address> = Disposition::all()
        .into_iter()
        .flat_map(|disposition| crawler.links(disposition))
        .collect();
    let count = all.len();
    all.sort();
    all.dedup();
    assert_eq!(all.len(), count);

    for address in &all {
        assert!(crawler.link_sets().find(address).is_some());
    }
    assert!(crawler.pending().is_empty());
}

#[tokio::test]
async fn test_self_links_and_fragments_fetch_each_page_once() {
    let server = MockServer::start().await;
    mount_robots(&server, "").await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(
                    r##"<a href="/">self</a><a href="#top">anchor</a>
                        <a href="/page#one">one</a><a href="/page#two">two</a>"##,
                    "text/html",
                ),
        )
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/page"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(r#"<a href="/">home</a><a href="/page">again</a>"#, "text/html"),
        )
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let crawler = Crawler::spawn(
        &create_test_config(&dir),
        address(&server, "/"),
        Arc::new(NoopListener),
    )
    .unwrap();
    crawler.wait().await.unwrap();

    assert_eq!(
        crawler.local_links(),
        vec![address(&server, "/"), address(&server, "/page")]
    );
}

/// Serves `body` with no Content-Type header to every connection
async fn serve_untyped(body: &'static str) -> String {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let local = listener.local_addr().unwrap();
    tokio::spawn(async move {
        while let Ok((mut stream, _)) = listener.accept().await {
            let mut request = [0u8; 4096];
            let _ = stream.read(&mut request).await;
            let response = format!(
                "HTTP/1.1 200 OK\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                body.len(),
                body
            );
            let _ = stream.write_all(response.as_bytes()).await;
            let _ = stream.shutdown().await;
        }
    });
    format!("http://{}", local)
}

#[tokio::test]
async fn test_missing_content_type_is_parsed() {
    // Every path, robots.txt included, answers with the same untyped page
    let origin = serve_untyped(r#"<a href="/next">next</a>"#).await;
    let seed = Address::parse(&format!("{}/", origin)).unwrap();

    let dir = TempDir::new().unwrap();
    let crawler = Crawler::spawn(&create_test_config(&dir), seed.clone(), Arc::new(NoopListener))
        .unwrap();
    crawler.wait().await.unwrap();

    assert_eq!(
        crawler.local_links(),
        vec![seed.clone(), seed.resolve("/next").unwrap()]
    );
    assert!(crawler.non_parsable_links().is_empty());
}

#[tokio::test]
async fn test_unreachable_link_is_dead() {
    let server = MockServer::start().await;

    // Same host as the mock server, but nothing listens on this port
    let closed_port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let unreachable = format!("http://127.0.0.1:{}/gone", closed_port);
    mount_html(&server, "/", &format!(r#"<a href="{}">gone</a>"#, unreachable)).await;

    let dir = TempDir::new().unwrap();
    let crawler = Crawler::spawn(
        &create_test_config(&dir),
        address(&server, "/"),
        Arc::new(NoopListener),
    )
    .unwrap();
    crawler.wait().await.unwrap();

    assert_eq!(crawler.dead_links(), vec![Address::parse(&unreachable).unwrap()]);
    assert!(crawler.external_links().is_empty());
}

#[tokio::test]
async fn test_stop_exits_without_export() {
    let server = MockServer::start().await;
    mount_robots(&server, "User-agent: *\nCrawl-delay: 1").await;
    mount_html(
        &server,
        "/",
        r#"<a href="/1">1</a><a href="/2">2</a><a href="/3">3</a>"#,
    )
    .await;
    for route in ["/1", "/2", "/3"] {
        mount_html(&server, route, "<p>leaf</p>").await;
    }

    let dir = TempDir::new().unwrap();
    let (sender, mut receiver) = unbounded_channel();
    let crawler = Crawler::spawn(
        &create_test_config(&dir),
        address(&server, "/"),
        Arc::new(ChannelListener::new(sender)),
    )
    .unwrap();

    // Wait for the seed to be classified, then stop during the crawl delay
    loop {
        let event = receiver.recv().await.expect("event stream ended early");
        if matches!(event.kind, CrawlEventKind::Classified { .. }) {
            break;
        }
    }
    crawler.stop().expect("stop should be accepted while running");
    assert_eq!(crawler.state(), CrawlState::Stopped);

    let outcome = crawler.wait().await.unwrap();
    assert_eq!(outcome, CrawlOutcome::Stopped);
    assert_eq!(crawler.state(), CrawlState::Stopped);
    assert_eq!(crawler.local_links(), vec![address(&server, "/")]);
    assert_eq!(crawler.stats().frontier, 3);

    let files: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
    assert!(files.is_empty(), "nothing should be exported after a stop");

    assert!(matches!(
        crawler.stop(),
        Err(SpiderError::InvalidTransition {
            from: CrawlState::Stopped,
            to: CrawlState::Stopped
        })
    ));
    assert!(crawler.start().is_err());
}

#[tokio::test]
async fn test_crawl_delay_spaces_requests() {
    let server = MockServer::start().await;
    mount_robots(&server, "User-agent: webspider/1.0\nCrawl-delay: 0.3").await;
    mount_html(&server, "/", r#"<a href="/next">next</a>"#).await;
    mount_html(&server, "/next", "<p>end</p>").await;

    let dir = TempDir::new().unwrap();
    let started = Instant::now();
    let crawler = Crawler::spawn(
        &create_test_config(&dir),
        address(&server, "/"),
        Arc::new(NoopListener),
    )
    .unwrap();
    crawler.wait().await.unwrap();

    assert!(started.elapsed() >= Duration::from_millis(600));
    assert_eq!(crawler.local_links().len(), 2);
}

#[tokio::test]
async fn test_existing_files_are_not_overwritten_by_default() {
    let server = MockServer::start().await;
    mount_robots(&server, "").await;
    mount_html(&server, "/", "<p>lonely</p>").await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(&dir);
    let local_file = link_file_path(&config.output, "127.0.0.1", Disposition::Local);
    std::fs::write(&local_file, "http://127.0.0.1/previous\n").unwrap();

    let crawler = Crawler::spawn(&config, address(&server, "/"), Arc::new(NoopListener)).unwrap();
    let report = match crawler.wait().await.unwrap() {
        CrawlOutcome::Completed { report } => report,
        CrawlOutcome::Stopped => panic!("crawl should have completed"),
    };

    assert_eq!(report.skipped, vec![local_file.clone()]);
    assert_eq!(
        read_link_file(&local_file).unwrap(),
        vec!["http://127.0.0.1/previous"]
    );
}

#[tokio::test]
async fn test_overwrite_replaces_existing_files() {
    let server = MockServer::start().await;
    mount_robots(&server, "").await;
    mount_html(&server, "/", "<p>lonely</p>").await;

    let dir = TempDir::new().unwrap();
    let mut config = create_test_config(&dir);
    config.output.overwrite = true;
    let local_file = link_file_path(&config.output, "127.0.0.1", Disposition::Local);
    std::fs::write(&local_file, "http://127.0.0.1/previous\n").unwrap();

    let crawler = Crawler::spawn(&config, address(&server, "/"), Arc::new(NoopListener)).unwrap();
    crawler.wait().await.unwrap();

    assert_eq!(
        read_link_file(&local_file).unwrap(),
        vec![address(&server, "/").to_string()]
    );
}

#[tokio::test]
async fn test_export_failure_surfaces_from_wait() {
    let server = MockServer::start().await;
    mount_robots(&server, "").await;
    mount_html(&server, "/", "<p>lonely</p>").await;

    let dir = TempDir::new().unwrap();
    let blocker = dir.path().join("not-a-directory");
    std::fs::write(&blocker, "").unwrap();
    let mut config = create_test_config(&dir);
    config.output.directory = blocker.to_string_lossy().into_owned();

    let crawler = Crawler::spawn(&config, address(&server, "/"), Arc::new(NoopListener)).unwrap();
    let result = crawler.wait().await;

    assert!(matches!(result, Err(SpiderError::Export(_))));
    assert_eq!(crawler.state(), CrawlState::Idle);
    assert_eq!(crawler.local_links(), vec![address(&server, "/")]);
}

#[tokio::test]
async fn test_events_report_progress() {
    let server = MockServer::start().await;
    mount_robots(&server, "User-agent: *\nDisallow: /secret").await;
    mount_html(&server, "/", r#"<a href="/secret">s</a><a href="http://[bad/">b</a>"#).await;

    let dir = TempDir::new().unwrap();
    let (sender, mut receiver) = unbounded_channel();
    let crawler = Crawler::spawn(
        &create_test_config(&dir),
        address(&server, "/"),
        Arc::new(ChannelListener::new(sender)),
    )
    .unwrap();
    crawler.wait().await.unwrap();

    let mut kinds = Vec::new();
    while let Ok(event) = receiver.try_recv() {
        kinds.push(event.kind);
    }

    assert!(kinds
        .iter()
        .any(|kind| matches!(kind, CrawlEventKind::Started { .. })));
    assert!(kinds
        .iter()
        .any(|kind| matches!(kind, CrawlEventKind::RobotsLoaded { disallowed: 1, .. })));
    assert!(kinds.iter().any(|kind| matches!(
        kind,
        CrawlEventKind::MalformedLink { reference, .. } if reference == "http://[bad/"
    )));
    assert!(kinds.iter().any(|kind| matches!(
        kind,
        CrawlEventKind::Classified { disposition: Disposition::Disallowed, .. }
    )));
    assert!(kinds
        .iter()
        .any(|kind| matches!(kind, CrawlEventKind::Exported { .. })));
    assert_eq!(kinds.last(), Some(&CrawlEventKind::Completed));
    assert!(crawler.status().unwrap().ends_with("Completed crawling"));
}
