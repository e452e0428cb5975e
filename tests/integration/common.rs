use fetcharoo::{CrawlOptions, ProcessOptions};
use lopdf::{dictionary, Document, Object};
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Builds a minimal PDF with `pages` blank letter-size pages
pub fn sample_pdf(pages: usize) -> Vec<u8> {
    sized_pdf(pages, 612)
}

/// Builds a PDF whose pages are `width` points wide, so they can be told apart after a merge
pub fn sized_pdf(pages: usize, width: i64) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let kids: Vec<Object> = (0..pages)
        .map(|_| {
            doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "MediaBox" => vec![0.into(), 0.into(), width.into(), 792.into()],
            })
            .into()
        })
        .collect();
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => pages as i64,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut buffer = Vec::new();
    doc.save_to(&mut buffer).unwrap();
    buffer
}

pub fn page_count(bytes: &[u8]) -> usize {
    Document::load_mem(bytes).unwrap().get_pages().len()
}

/// MediaBox width of each page, in page order
pub fn page_widths(bytes: &[u8]) -> Vec<i64> {
    let doc = Document::load_mem(bytes).unwrap();
    doc.get_pages()
        .values()
        .map(|&id| {
            let page = doc.get_dictionary(id).unwrap();
            let media_box = page.get(b"MediaBox").unwrap().as_array().unwrap();
            media_box[2].as_i64().unwrap()
        })
        .collect()
}

pub async fn serve_html(server: &MockServer, route: &str, body: &str) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(format!("<html><body>{}</body></html>", body), "text/html"),
        )
        .mount(server)
        .await;
}

pub async fn serve_pdf(server: &MockServer, route: &str, bytes: Vec<u8>) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_bytes(bytes)
                .insert_header("content-type", "application/pdf"),
        )
        .mount(server)
        .await;
}

/// Crawl options with no politeness delay
pub fn fast_crawl(depth: u32) -> CrawlOptions {
    CrawlOptions {
        depth,
        request_delay: Duration::ZERO,
        timeout: Duration::from_secs(5),
        ..Default::default()
    }
}

/// Process options with a single attempt per download
pub fn fast_process() -> ProcessOptions {
    ProcessOptions {
        timeout: Duration::from_secs(5),
        max_retries: 1,
        backoff_unit: Duration::from_millis(1),
        ..Default::default()
    }
}
