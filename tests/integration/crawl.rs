use crate::common::{fast_crawl, fast_process, sample_pdf, serve_html, serve_pdf};
use fetcharoo::{CrawlSession, DiscoverOptions, Outcome};
use std::collections::HashSet;
use tempfile::tempdir;
use wiremock::matchers::method;
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_pdf_linked_from_three_pages_reported_once() {
    let server = MockServer::start().await;
    let base = server.uri();

    serve_html(
        &server,
        "/",
        &format!(
            r#"<a href="{base}/doc.pdf">Doc</a>
               <a href="/a.html">A</a>
               <a href="/b.html">B</a>"#
        ),
    )
    .await;
    serve_html(&server, "/a.html", r#"<a href="/doc.pdf">Doc again</a>"#).await;
    serve_html(&server, "/b.html", r#"<a href="doc.pdf">And again</a>"#).await;

    let mut session = CrawlSession::with_user_agent("TestBot/1.0").unwrap();
    let found = session.find_pdfs(&format!("{}/", base), &fast_crawl(1)).await;

    assert_eq!(found, vec![format!("{}/doc.pdf", base)]);
}

#[tokio::test]
async fn test_depth_first_discovery_order() {
    let server = MockServer::start().await;
    let base = server.uri();

    serve_html(
        &server,
        "/",
        r#"<a href="/root.pdf">R</a><a href="/one.html">1</a><a href="/two.html">2</a>"#,
    )
    .await;
    serve_html(&server, "/one.html", r#"<a href="/deep.html">D</a><a href="/one.pdf">1</a>"#).await;
    serve_html(&server, "/deep.html", r#"<a href="/deep.pdf">D</a>"#).await;
    serve_html(&server, "/two.html", r#"<a href="/two.pdf">2</a>"#).await;

    let mut session = CrawlSession::new().unwrap();
    let found = session.find_pdfs(&format!("{}/", base), &fast_crawl(2)).await;

    let expected: Vec<String> = ["root", "one", "deep", "two"]
        .iter()
        .map(|name| format!("{}/{}.pdf", base, name))
        .collect();
    assert_eq!(found, expected);
}

#[tokio::test]
async fn test_off_domain_pages_never_requested() {
    let site = MockServer::start().await;
    let other = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&other)
        .await;

    // The second server is reached through a different host name
    let other_port = url::Url::parse(&other.uri()).unwrap().port().unwrap();
    let other_page = format!("http://localhost:{}/page.html", other_port);
    serve_html(
        &site,
        "/",
        &format!(r#"<a href="{other_page}">Elsewhere</a><a href="/local.pdf">Local</a>"#),
    )
    .await;

    let mut session = CrawlSession::new().unwrap();
    let found = session.find_pdfs(&format!("{}/", site.uri()), &fast_crawl(1)).await;
    assert_eq!(found, vec![format!("{}/local.pdf", site.uri())]);

    // An explicit allow list replaces the root's own domain
    let options = fetcharoo::CrawlOptions {
        allowed_domains: Some(HashSet::from(["example.invalid".to_string()])),
        ..fast_crawl(1)
    };
    let found = session.find_pdfs(&format!("{}/", site.uri()), &options).await;
    assert!(found.is_empty());
}

#[tokio::test]
async fn test_depth_zero_fetches_only_root() {
    let server = MockServer::start().await;
    serve_html(&server, "/", r#"<a href="/next.html">Next</a><a href="/a.pdf">A</a>"#).await;
    Mock::given(method("GET"))
        .and(wiremock::matchers::path("/next.html"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let mut session = CrawlSession::new().unwrap();
    let found = session.find_pdfs(&format!("{}/", server.uri()), &fast_crawl(0)).await;
    assert_eq!(found, vec![format!("{}/a.pdf", server.uri())]);
}

#[tokio::test]
async fn test_dry_run_touches_nothing() {
    let server = MockServer::start().await;
    serve_html(
        &server,
        "/",
        r#"<a href="/keep.pdf">Keep</a><a href="/draft.pdf">Draft</a>"#,
    )
    .await;
    Mock::given(method("GET"))
        .and(wiremock::matchers::path_regex(r"\.pdf$"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let dir = tempdir().unwrap();
    let write_dir = dir.path().join("out");
    let mut process = fast_process();
    process.filter = Some(fetcharoo::FilterConfig {
        filename_exclude: vec!["draft*".to_string()],
        ..Default::default()
    });
    let options = DiscoverOptions {
        crawl: fast_crawl(0),
        process,
        write_dir: write_dir.clone(),
        dry_run: true,
    };

    let mut session = CrawlSession::new().unwrap();
    let outcome = session
        .download_pdfs_from_webpage(&format!("{}/", server.uri()), &options)
        .await;

    assert_eq!(
        outcome,
        Outcome::DryRun {
            urls: vec![format!("{}/keep.pdf", server.uri())],
            count: 1,
        }
    );
    assert!(outcome.is_success());
    assert!(!write_dir.exists());
}

#[tokio::test]
async fn test_full_run_saves_discovered_pdfs() {
    let server = MockServer::start().await;
    serve_html(&server, "/", r#"<a href="/docs/guide.pdf">Guide</a>"#).await;
    serve_pdf(&server, "/docs/guide.pdf", sample_pdf(2)).await;

    let dir = tempdir().unwrap();
    let options = DiscoverOptions {
        crawl: fast_crawl(0),
        process: fast_process(),
        write_dir: dir.path().to_path_buf(),
        dry_run: false,
    };

    let mut session = CrawlSession::new().unwrap();
    let outcome = session
        .download_pdfs_from_webpage(&format!("{}/", server.uri()), &options)
        .await;

    let Outcome::Processed(result) = outcome else {
        panic!("expected a processed outcome");
    };
    assert!(result.success);
    assert_eq!(result.files_created, vec![dir.path().join("guide.pdf")]);
}

#[tokio::test]
async fn test_nothing_found_is_failure() {
    let server = MockServer::start().await;
    serve_html(&server, "/", "<p>No documents here</p>").await;

    let dir = tempdir().unwrap();
    let options = DiscoverOptions {
        crawl: fast_crawl(0),
        process: fast_process(),
        write_dir: dir.path().to_path_buf(),
        dry_run: false,
    };

    let mut session = CrawlSession::new().unwrap();
    let outcome = session
        .download_pdfs_from_webpage(&format!("{}/", server.uri()), &options)
        .await;
    assert!(!outcome.is_success());
}
