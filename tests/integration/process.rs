use crate::common::{fast_process, page_count, page_widths, sample_pdf, serve_pdf, sized_pdf};
use fetcharoo::{CrawlSession, FilterConfig, OutputMode, ProcessOptions, SortBy};
use tempfile::tempdir;
use wiremock::MockServer;

#[tokio::test]
async fn test_empty_input_fails() {
    let dir = tempdir().unwrap();
    let session = CrawlSession::new().unwrap();
    let result = session.process(&[], dir.path(), &fast_process()).await;

    assert!(!result.success);
    assert!(result.files_created.is_empty());
    assert!(!result.errors.is_empty());
}

#[tokio::test]
async fn test_same_basename_saved_to_distinct_files() {
    let first = MockServer::start().await;
    let second = MockServer::start().await;
    let first_pdf = sample_pdf(1);
    let second_pdf = sample_pdf(3);
    serve_pdf(&first, "/doc.pdf", first_pdf.clone()).await;
    serve_pdf(&second, "/files/doc.pdf", second_pdf.clone()).await;

    let dir = tempdir().unwrap();
    let urls = vec![
        format!("{}/doc.pdf", first.uri()),
        format!("{}/files/doc.pdf", second.uri()),
    ];
    let session = CrawlSession::new().unwrap();
    let result = session.process(&urls, dir.path(), &fast_process()).await;

    assert!(result.success);
    assert_eq!(
        result.files_created,
        vec![dir.path().join("doc.pdf"), dir.path().join("doc_1.pdf")]
    );
    assert_eq!(std::fs::read(dir.path().join("doc.pdf")).unwrap(), first_pdf);
    assert_eq!(std::fs::read(dir.path().join("doc_1.pdf")).unwrap(), second_pdf);
}

#[tokio::test]
async fn test_merge_in_numeric_order() {
    let server = MockServer::start().await;
    serve_pdf(&server, "/chapter10.pdf", sized_pdf(2, 1000)).await;
    serve_pdf(&server, "/chapter2.pdf", sized_pdf(1, 200)).await;
    serve_pdf(&server, "/chapter1.pdf", sized_pdf(1, 100)).await;

    let dir = tempdir().unwrap();
    let urls: Vec<String> = ["chapter10", "chapter2", "chapter1"]
        .iter()
        .map(|name| format!("{}/{}.pdf", server.uri(), name))
        .collect();
    let options = ProcessOptions {
        mode: OutputMode::Merge,
        sort_by: SortBy::Numeric,
        output_name: Some("book".to_string()),
        ..fast_process()
    };

    let session = CrawlSession::new().unwrap();
    let result = session.process(&urls, dir.path(), &options).await;

    assert!(result.success);
    assert_eq!(result.downloaded_count, 3);
    let merged_path = dir.path().join("book.pdf");
    assert_eq!(result.files_created, vec![merged_path.clone()]);
    let merged = std::fs::read(merged_path).unwrap();
    assert_eq!(page_count(&merged), 4);
    assert_eq!(page_widths(&merged), vec![100, 200, 1000, 1000]);
}

#[tokio::test]
async fn test_merge_skips_broken_documents() {
    let server = MockServer::start().await;
    serve_pdf(&server, "/good.pdf", sample_pdf(2)).await;
    serve_pdf(&server, "/broken.pdf", b"%PDF-1.4\nnot really a pdf".to_vec()).await;

    let dir = tempdir().unwrap();
    let urls = vec![
        format!("{}/good.pdf", server.uri()),
        format!("{}/broken.pdf", server.uri()),
    ];
    let options = ProcessOptions {
        mode: OutputMode::Merge,
        ..fast_process()
    };

    let session = CrawlSession::new().unwrap();
    let result = session.process(&urls, dir.path(), &options).await;

    assert!(result.success);
    assert_eq!(result.failed_count, 1);
    let merged = std::fs::read(dir.path().join("merged.pdf")).unwrap();
    assert_eq!(page_count(&merged), 2);
}

#[tokio::test]
async fn test_size_filter_applies_after_download() {
    let server = MockServer::start().await;
    let small = sample_pdf(1);
    let large = sample_pdf(40);
    let threshold = (small.len() + 1) as u64;
    assert!((large.len() as u64) > threshold);
    serve_pdf(&server, "/small.pdf", small).await;
    serve_pdf(&server, "/large.pdf", large).await;

    let dir = tempdir().unwrap();
    let urls = vec![
        format!("{}/small.pdf", server.uri()),
        format!("{}/large.pdf", server.uri()),
    ];
    let options = ProcessOptions {
        filter: Some(FilterConfig {
            min_size: Some(threshold),
            ..Default::default()
        }),
        ..fast_process()
    };

    let session = CrawlSession::new().unwrap();
    let result = session.process(&urls, dir.path(), &options).await;

    assert!(result.success);
    assert_eq!(result.downloaded_count, 2);
    assert_eq!(result.filtered_count, 1);
    assert_eq!(result.files_created, vec![dir.path().join("large.pdf")]);
}

#[tokio::test]
async fn test_creates_missing_output_directory() {
    let server = MockServer::start().await;
    serve_pdf(&server, "/a.pdf", sample_pdf(1)).await;

    let dir = tempdir().unwrap();
    let nested = dir.path().join("deeply").join("nested");
    let session = CrawlSession::new().unwrap();
    let result = session
        .process(&[format!("{}/a.pdf", server.uri())], &nested, &fast_process())
        .await;

    assert!(result.success);
    assert!(nested.join("a.pdf").is_file());
}
