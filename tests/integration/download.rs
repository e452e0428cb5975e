use crate::common::sample_pdf;
use fetcharoo::{download_pdf, DownloadOptions};
use reqwest::Client;
use std::time::{Duration, Instant};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn options(max_retries: u32) -> DownloadOptions {
    DownloadOptions {
        timeout: Duration::from_secs(5),
        max_retries,
        user_agent: "TestBot/1.0".to_string(),
        backoff_unit: Duration::from_millis(5),
    }
}

#[tokio::test]
async fn test_retry_succeeds_after_server_errors() {
    let server = MockServer::start().await;
    let pdf = sample_pdf(1);

    // Mounted first so it answers the first two requests
    Mock::given(method("GET"))
        .and(path("/flaky.pdf"))
        .respond_with(ResponseTemplate::new(500))
        .up_to_n_times(2)
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/flaky.pdf"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_bytes(pdf.clone())
                .insert_header("content-type", "application/pdf"),
        )
        .expect(1)
        .mount(&server)
        .await;

    let url = format!("{}/flaky.pdf", server.uri());
    let bytes = download_pdf(&Client::new(), &url, &options(3)).await;
    assert_eq!(bytes, Some(pdf));
}

#[tokio::test]
async fn test_gives_up_after_max_attempts() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/down.pdf"))
        .respond_with(ResponseTemplate::new(503))
        .expect(2)
        .mount(&server)
        .await;

    let url = format!("{}/down.pdf", server.uri());
    assert!(download_pdf(&Client::new(), &url, &options(2)).await.is_none());
}

#[tokio::test]
async fn test_html_response_not_retried() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/login.pdf"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw("<html>Please sign in</html>", "text/html"),
        )
        .expect(1)
        .mount(&server)
        .await;

    let url = format!("{}/login.pdf", server.uri());
    assert!(download_pdf(&Client::new(), &url, &options(3)).await.is_none());
}

#[tokio::test]
async fn test_magic_bytes_accepted_without_pdf_content_type() {
    let server = MockServer::start().await;
    let pdf = sample_pdf(1);
    Mock::given(method("GET"))
        .and(path("/octet.pdf"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_bytes(pdf.clone())
                .insert_header("content-type", "application/octet-stream"),
        )
        .mount(&server)
        .await;

    let url = format!("{}/octet.pdf", server.uri());
    assert_eq!(download_pdf(&Client::new(), &url, &options(1)).await, Some(pdf));
}

#[tokio::test]
async fn test_sends_user_agent() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/ua.pdf"))
        .and(wiremock::matchers::header("user-agent", "TestBot/1.0"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_bytes(sample_pdf(1))
                .insert_header("content-type", "application/pdf"),
        )
        .expect(1)
        .mount(&server)
        .await;

    let url = format!("{}/ua.pdf", server.uri());
    assert!(download_pdf(&Client::new(), &url, &options(1)).await.is_some());
}

#[tokio::test]
async fn test_timeouts_retried_with_growing_backoff() {
    let server = MockServer::start().await;
    let pdf = sample_pdf(1);

    Mock::given(method("GET"))
        .and(path("/slow.pdf"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(2)))
        .up_to_n_times(2)
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/slow.pdf"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_bytes(pdf.clone())
                .insert_header("content-type", "application/pdf"),
        )
        .expect(1)
        .mount(&server)
        .await;

    // Two 200ms timeouts, then backoff sleeps of 1 and 2 units
    let options = DownloadOptions {
        timeout: Duration::from_millis(200),
        max_retries: 3,
        user_agent: "TestBot/1.0".to_string(),
        backoff_unit: Duration::from_millis(150),
    };
    let url = format!("{}/slow.pdf", server.uri());

    let started = Instant::now();
    let bytes = download_pdf(&Client::new(), &url, &options).await;
    let elapsed = started.elapsed();

    assert_eq!(bytes, Some(pdf));
    assert!(elapsed >= Duration::from_millis(850), "elapsed {:?}", elapsed);
    assert!(elapsed < Duration::from_secs(2), "elapsed {:?}", elapsed);
}
