//! HTML parser for extracting anchor links
//!
//! Only `<a href>` elements are considered. Relative hrefs are resolved
//! against the page URL; non-navigable hrefs are dropped.

use scraper::{Html, Selector};
use url::Url;

/// Extracts every anchor link in the document, resolved to an absolute URL
///
/// Links keep document order and are not deduplicated here.
///
/// # Excluded
///
/// - `javascript:`, `mailto:`, `tel:` and `data:` hrefs
/// - Fragment-only hrefs (`#section`)
/// - Anything that does not resolve to an `http`/`https` URL
///
/// # Arguments
///
/// * `html` - The HTML content to parse
/// * `base_url` - The page URL used for resolving relative links
///
/// # Example
///
/// ```
/// use fetcharoo::crawler::extract_links;
/// use url::Url;
///
/// let html = r#"<a href="/docs/a.pdf">A</a><a href="mailto:x@y.z">mail</a>"#;
/// let base = Url::parse("https://example.com/index.html").unwrap();
/// assert_eq!(extract_links(html, &base), vec!["https://example.com/docs/a.pdf"]);
/// ```
pub fn extract_links(html: &str, base_url: &Url) -> Vec<String> {
    let document = Html::parse_document(html);

    let Ok(a_selector) = Selector::parse("a[href]") else {
        return Vec::new();
    };

    document
        .select(&a_selector)
        .filter_map(|element| element.value().attr("href"))
        .filter_map(|href| resolve_link(href, base_url))
        .collect()
}

/// Resolves a link href to an absolute URL and validates it
///
/// Returns None if the link should be excluded:
/// - javascript:, mailto:, tel: schemes
/// - data: URIs
/// - Invalid URLs
/// - Non-HTTP(S) URLs after resolution
fn resolve_link(href: &str, base_url: &Url) -> Option<String> {
    let href = href.trim();

    if href.is_empty() {
        return None;
    }

    let lower = href.to_ascii_lowercase();
    if lower.starts_with("javascript:")
        || lower.starts_with("mailto:")
        || lower.starts_with("tel:")
        || lower.starts_with("data:")
    {
        return None;
    }

    // Same-page anchors
    if href.starts_with('#') {
        return None;
    }

    match base_url.join(href) {
        Ok(absolute_url) => {
            if absolute_url.scheme() == "http" || absolute_url.scheme() == "https" {
                Some(absolute_url.to_string())
            } else {
                None
            }
        }
        Err(_) => None,
    }
}

/// Returns true if the URL's path ends in `.pdf` (case-insensitive)
///
/// Query strings and fragments are ignored, so `/a.pdf?download=1` is a PDF
/// link and `/view?file=a.pdf` is not.
pub fn is_pdf_link(url: &Url) -> bool {
    url.path().to_lowercase().ends_with(".pdf")
}
