//! URL policy module for fetcharoo
//!
//! This module decides which URLs the crawler may touch and how downloaded
//! files are named on disk:
//! - scheme/host validation
//! - domain scoping for recursive page following
//! - filename sanitization against path traversal

mod domain;
mod matcher;
mod sanitize;

use std::collections::HashSet;
use url::Url;

// Re-export main functions
pub use domain::{domain_of, extract_domain, origin_of, path_basename};
pub use matcher::matches_domain;
pub use sanitize::{sanitize_filename, DEFAULT_FILENAME, MAX_FILENAME_LENGTH};

/// Checks that a URL is well-formed and uses a crawlable scheme
///
/// Only `http` and `https` URLs with a non-empty host are accepted. Anything
/// else (`ftp:`, `file:`, `javascript:`, `data:`, scheme-less strings, or
/// strings that fail to parse) is rejected.
///
/// # Examples
///
/// ```
/// use fetcharoo::url::is_valid_url;
///
/// assert!(is_valid_url("https://example.com/docs"));
/// assert!(!is_valid_url("ftp://example.com/file.pdf"));
/// assert!(!is_valid_url("example.com/file.pdf"));
/// ```
pub fn is_valid_url(url: &str) -> bool {
    match Url::parse(url) {
        Ok(parsed) => {
            matches!(parsed.scheme(), "http" | "https")
                && parsed.host_str().is_some_and(|h| !h.is_empty())
        }
        Err(_) => false,
    }
}

/// Checks whether a URL's host is inside the allowed domain set
///
/// `None` means no restriction. Otherwise the host (port stripped, lowercased)
/// must equal an allowed entry or be a subdomain of one. An empty set allows
/// nothing.
///
/// # Arguments
///
/// * `url` - The URL to check
/// * `allowed_domains` - The allowed domains, or `None` for no restriction
///
/// # Examples
///
/// ```
/// use std::collections::HashSet;
/// use fetcharoo::url::is_safe_domain;
///
/// let allowed: HashSet<String> = ["example.com".to_string()].into();
/// assert!(is_safe_domain("https://docs.example.com/a", Some(&allowed)));
/// assert!(!is_safe_domain("https://notexample.com/a", Some(&allowed)));
/// assert!(is_safe_domain("https://anything.org/", None));
/// ```
pub fn is_safe_domain(url: &str, allowed_domains: Option<&HashSet<String>>) -> bool {
    let Some(allowed) = allowed_domains else {
        return true;
    };

    let Some(host) = domain_of(url) else {
        return false;
    };

    allowed
        .iter()
        .any(|entry| matches_domain(&entry.to_lowercase(), &host))
}
