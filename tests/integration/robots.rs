use crate::common::{fast_crawl, serve_html};
use fetcharoo::{CrawlOptions, CrawlSession};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn serve_robots(server: &MockServer, body: &str) {
    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(ResponseTemplate::new(200).set_body_string(body.to_string()))
        .expect(1)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_disallowed_pdfs_skipped_with_single_robots_fetch() {
    let server = MockServer::start().await;
    serve_robots(&server, "User-agent: *\nDisallow: /private/\n").await;
    serve_html(
        &server,
        "/",
        r#"<a href="/public/a.pdf">A</a>
           <a href="/private/b.pdf">B</a>
           <a href="/public/c.pdf">C</a>
           <a href="/private/d.pdf">D</a>"#,
    )
    .await;

    let options = CrawlOptions {
        respect_robots: true,
        ..fast_crawl(0)
    };
    let mut session = CrawlSession::new().unwrap();
    let found = session.find_pdfs(&format!("{}/", server.uri()), &options).await;

    assert_eq!(
        found,
        vec![
            format!("{}/public/a.pdf", server.uri()),
            format!("{}/public/c.pdf", server.uri()),
        ]
    );
    assert_eq!(session.robots_cache().len(), 1);
}

#[tokio::test]
async fn test_robots_ignored_unless_requested() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(ResponseTemplate::new(200).set_body_string("User-agent: *\nDisallow: /\n"))
        .expect(0)
        .mount(&server)
        .await;
    serve_html(&server, "/", r#"<a href="/a.pdf">A</a>"#).await;

    let mut session = CrawlSession::new().unwrap();
    let found = session.find_pdfs(&format!("{}/", server.uri()), &fast_crawl(0)).await;
    assert_eq!(found.len(), 1);
}

#[tokio::test]
async fn test_missing_robots_allows_everything() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let mut session = CrawlSession::new().unwrap();
    let url = format!("{}/files/a.pdf", server.uri());
    assert!(session.check_robots_txt(&url, "TestBot").await);
    assert!(session.check_robots_txt(&url, "TestBot").await);
}

#[tokio::test]
async fn test_agent_specific_rules() {
    let server = MockServer::start().await;
    serve_robots(&server, "User-agent: BadBot\nDisallow: /\n\nUser-agent: *\nAllow: /\n").await;

    let mut session = CrawlSession::new().unwrap();
    let url = format!("{}/a.pdf", server.uri());
    assert!(!session.check_robots_txt(&url, "BadBot").await);
    assert!(session.check_robots_txt(&url, "GoodBot").await);
}

#[tokio::test]
async fn test_default_user_agent_honors_its_own_group() {
    let server = MockServer::start().await;
    serve_robots(&server, "User-agent: fetcharoo\nDisallow: /reports/\n\nUser-agent: *\nAllow: /\n").await;
    serve_html(
        &server,
        "/",
        r#"<a href="/reports/q1.pdf">Q1</a><a href="/public/guide.pdf">Guide</a>"#,
    )
    .await;

    let options = CrawlOptions {
        respect_robots: true,
        ..fast_crawl(0)
    };
    let mut session = CrawlSession::new().unwrap();
    let found = session.find_pdfs(&format!("{}/", server.uri()), &options).await;

    assert_eq!(found, vec![format!("{}/public/guide.pdf", server.uri())]);
}
