//! PDF filtering by filename, URL and size
//!
//! Patterns are shell-style wildcards (`*`, `?`, `[...]`) matched
//! case-insensitively against the whole string. An empty include list
//! matches everything; any exclude match rejects, even if an include
//! pattern also matched.

use glob::{MatchOptions, Pattern};
use serde::Deserialize;

use crate::url::path_basename;

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: false,
    require_literal_separator: false,
    require_literal_leading_dot: false,
};

/// Filter criteria applied to discovered PDFs
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct FilterConfig {
    /// Filename patterns to include; empty means all
    #[serde(rename = "include")]
    pub filename_include: Vec<String>,

    /// Filename patterns to exclude
    #[serde(rename = "exclude")]
    pub filename_exclude: Vec<String>,

    /// URL patterns to include; empty means all
    pub url_include: Vec<String>,

    /// URL patterns to exclude
    pub url_exclude: Vec<String>,

    /// Minimum size in bytes, inclusive
    pub min_size: Option<u64>,

    /// Maximum size in bytes, inclusive
    pub max_size: Option<u64>,
}

impl FilterConfig {
    /// Returns true if a minimum or maximum size is set
    pub fn has_size_limits(&self) -> bool {
        self.min_size.is_some() || self.max_size.is_some()
    }

    /// Returns true if the config filters nothing at all
    pub fn is_empty(&self) -> bool {
        self.filename_include.is_empty()
            && self.filename_exclude.is_empty()
            && self.url_include.is_empty()
            && self.url_exclude.is_empty()
            && !self.has_size_limits()
    }

    /// Returns the first pattern that is not a valid wildcard, if any
    pub fn first_invalid_pattern(&self) -> Option<&str> {
        self.filename_include
            .iter()
            .chain(&self.filename_exclude)
            .chain(&self.url_include)
            .chain(&self.url_exclude)
            .find(|p| Pattern::new(p).is_err())
            .map(String::as_str)
    }
}

/// Matches a string against one shell-style pattern
///
/// A pattern that fails to compile never matches.
fn wildcard_match(text: &str, pattern: &str) -> bool {
    match Pattern::new(pattern) {
        Ok(compiled) => compiled.matches_with(text, MATCH_OPTIONS),
        Err(e) => {
            tracing::warn!("Ignoring invalid pattern {:?}: {}", pattern, e);
            false
        }
    }
}

fn matches_include_exclude(text: &str, include: &[String], exclude: &[String]) -> bool {
    if exclude.iter().any(|p| wildcard_match(text, p)) {
        return false;
    }
    include.is_empty() || include.iter().any(|p| wildcard_match(text, p))
}

/// Checks a filename against include and exclude patterns
///
/// # Examples
///
/// ```
/// use fetcharoo::filter::matches_filename_pattern;
///
/// let include = vec!["report*.pdf".to_string()];
/// let exclude = vec!["*draft*".to_string()];
/// assert!(matches_filename_pattern("Report_2023.PDF", &include, &exclude));
/// assert!(!matches_filename_pattern("report_draft.pdf", &include, &exclude));
/// ```
pub fn matches_filename_pattern(filename: &str, include: &[String], exclude: &[String]) -> bool {
    matches_include_exclude(filename, include, exclude)
}

/// Checks a full URL against include and exclude patterns
pub fn matches_url_pattern(url: &str, include: &[String], exclude: &[String]) -> bool {
    matches_include_exclude(url, include, exclude)
}

/// Checks a size in bytes against optional inclusive bounds
pub fn matches_size_limits(size: u64, min_size: Option<u64>, max_size: Option<u64>) -> bool {
    if min_size.is_some_and(|min| size < min) {
        return false;
    }
    if max_size.is_some_and(|max| size > max) {
        return false;
    }
    true
}

/// Decides whether a PDF should be downloaded or kept
///
/// The filename tested is the percent-decoded last segment of the URL path.
/// Size checks run only when `size` is known.
///
/// # Arguments
///
/// * `url` - The PDF URL
/// * `size` - Payload size in bytes, if already downloaded
/// * `config` - The filter criteria
pub fn should_download_pdf(url: &str, size: Option<u64>, config: &FilterConfig) -> bool {
    let raw_name = path_basename(url);
    let filename = urlencoding::decode(&raw_name)
        .map(|s| s.into_owned())
        .unwrap_or(raw_name);

    if !matches_filename_pattern(&filename, &config.filename_include, &config.filename_exclude) {
        tracing::debug!("Filename {:?} rejected by filename patterns", filename);
        return false;
    }

    if !matches_url_pattern(url, &config.url_include, &config.url_exclude) {
        tracing::debug!("URL {} rejected by URL patterns", url);
        return false;
    }

    if let Some(size) = size {
        if !matches_size_limits(size, config.min_size, config.max_size) {
            tracing::debug!("URL {} rejected by size limits ({} bytes)", url, size);
            return false;
        }
    }

    true
}
