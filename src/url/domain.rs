use url::Url;

/// Extracts the domain from a URL
///
/// This function retrieves the host portion of a URL and converts it to lowercase.
/// The port is never part of the result. If the URL has no host, it returns None.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use fetcharoo::url::extract_domain;
///
/// let url = Url::parse("https://EXAMPLE.COM:8080/path").unwrap();
/// assert_eq!(extract_domain(&url), Some("example.com".to_string()));
/// ```
pub fn extract_domain(url: &Url) -> Option<String> {
    url.host_str()
        .filter(|h| !h.is_empty())
        .map(|h| h.to_lowercase())
}

/// Parses a URL string and extracts its lowercase domain
pub fn domain_of(url: &str) -> Option<String> {
    Url::parse(url).ok().as_ref().and_then(extract_domain)
}

/// Returns `scheme://host[:port]` for a URL, used to key per-site caches
pub fn origin_of(url: &Url) -> Option<String> {
    url.host_str()?;
    Some(url.origin().ascii_serialization())
}

/// Returns the last path segment of a URL, or an empty string
///
/// The segment is returned as it appears in the URL (still percent-encoded).
/// Unparsable input yields an empty string.
pub fn path_basename(url: &str) -> String {
    Url::parse(url)
        .ok()
        .and_then(|u| {
            u.path_segments()
                .and_then(|mut segments| segments.next_back().map(str::to_string))
        })
        .unwrap_or_default()
}
