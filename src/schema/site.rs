use regex::Regex;
use std::fmt;
use std::time::Duration;

use crate::filter::FilterConfig;
use crate::process::{SortBy, SortKey};
use crate::SchemaError;

/// Depth suggested by a schema that does not set one
pub const DEFAULT_RECOMMENDED_DEPTH: u32 = 1;

/// Request delay suggested by a schema that does not set one
pub const DEFAULT_SCHEMA_REQUEST_DELAY: Duration = Duration::from_millis(500);

/// Settings for downloading PDFs from one kind of site
#[derive(Clone)]
pub struct SiteSchema {
    /// Unique identifier, e.g. `springer_book`
    pub name: String,
    /// Regex matched against the start of a URL
    url_pattern: String,
    pub description: Option<String>,
    /// Filename patterns to include
    pub include_patterns: Vec<String>,
    /// Filename patterns to exclude
    pub exclude_patterns: Vec<String>,
    pub url_include_patterns: Vec<String>,
    pub url_exclude_patterns: Vec<String>,
    pub sort_by: SortBy,
    /// Custom comparator, preferred over `sort_by`
    sort_key: Option<SortKey>,
    /// Merged output name used when the caller gives none
    pub default_output_name: Option<String>,
    recommended_depth: Option<u32>,
    request_delay: Option<Duration>,
    /// Sample page for validating the schema against the live site
    pub test_url: Option<String>,
    /// PDFs `test_url` is expected to yield at least
    pub expected_min_pdfs: usize,
    pub version: String,
    compiled: Option<Regex>,
}

impl SiteSchema {
    /// Creates a schema with default settings
    ///
    /// An empty pattern is accepted but matches no URL.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::InvalidPattern`] if `url_pattern` does not
    /// compile.
    pub fn new(name: impl Into<String>, url_pattern: impl Into<String>) -> Result<Self, SchemaError> {
        let url_pattern = url_pattern.into();
        let compiled = if url_pattern.is_empty() {
            None
        } else {
            // Compile as written first so errors point at the caller's pattern
            Regex::new(&url_pattern)?;
            Some(Regex::new(&format!("^(?:{})", url_pattern))?)
        };

        Ok(Self {
            name: name.into(),
            url_pattern,
            description: None,
            include_patterns: Vec::new(),
            exclude_patterns: Vec::new(),
            url_include_patterns: Vec::new(),
            url_exclude_patterns: Vec::new(),
            sort_by: SortBy::None,
            sort_key: None,
            default_output_name: None,
            recommended_depth: None,
            request_delay: None,
            test_url: None,
            expected_min_pdfs: 1,
            version: "1.0.0".to_string(),
            compiled,
        })
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_include_patterns(mut self, patterns: Vec<String>) -> Self {
        self.include_patterns = patterns;
        self
    }

    pub fn with_exclude_patterns(mut self, patterns: Vec<String>) -> Self {
        self.exclude_patterns = patterns;
        self
    }

    pub fn with_url_include_patterns(mut self, patterns: Vec<String>) -> Self {
        self.url_include_patterns = patterns;
        self
    }

    pub fn with_url_exclude_patterns(mut self, patterns: Vec<String>) -> Self {
        self.url_exclude_patterns = patterns;
        self
    }

    pub fn with_sort_by(mut self, sort_by: SortBy) -> Self {
        self.sort_by = sort_by;
        self
    }

    pub fn with_sort_key(mut self, sort_key: SortKey) -> Self {
        self.sort_key = Some(sort_key);
        self
    }

    pub fn with_default_output_name(mut self, name: impl Into<String>) -> Self {
        self.default_output_name = Some(name.into());
        self
    }

    pub fn with_recommended_depth(mut self, depth: u32) -> Self {
        self.recommended_depth = Some(depth);
        self
    }

    pub fn with_request_delay(mut self, delay: Duration) -> Self {
        self.request_delay = Some(delay);
        self
    }

    pub fn with_test_url(mut self, url: impl Into<String>, expected_min_pdfs: usize) -> Self {
        self.test_url = Some(url.into());
        self.expected_min_pdfs = expected_min_pdfs;
        self
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    pub fn url_pattern(&self) -> &str {
        &self.url_pattern
    }

    pub fn sort_key(&self) -> Option<&SortKey> {
        self.sort_key.as_ref()
    }

    /// Suggested crawl depth, 1 unless set
    pub fn recommended_depth(&self) -> u32 {
        self.recommended_depth.unwrap_or(DEFAULT_RECOMMENDED_DEPTH)
    }

    /// Suggested delay between page requests, 0.5 s unless set
    pub fn request_delay(&self) -> Duration {
        self.request_delay.unwrap_or(DEFAULT_SCHEMA_REQUEST_DELAY)
    }

    /// The depth this schema explicitly sets, if any
    pub fn explicit_depth(&self) -> Option<u32> {
        self.recommended_depth
    }

    /// The request delay this schema explicitly sets, if any
    pub fn explicit_request_delay(&self) -> Option<Duration> {
        self.request_delay
    }

    /// Returns true if the URL starts with a match of `url_pattern`
    pub fn matches(&self, url: &str) -> bool {
        self.compiled.as_ref().is_some_and(|re| re.is_match(url))
    }

    /// Filter built from the schema's patterns, or `None` if it has none
    pub fn filter_config(&self) -> Option<FilterConfig> {
        let has_filters = !self.include_patterns.is_empty()
            || !self.exclude_patterns.is_empty()
            || !self.url_include_patterns.is_empty()
            || !self.url_exclude_patterns.is_empty();

        has_filters.then(|| FilterConfig {
            filename_include: self.include_patterns.clone(),
            filename_exclude: self.exclude_patterns.clone(),
            url_include: self.url_include_patterns.clone(),
            url_exclude: self.url_exclude_patterns.clone(),
            min_size: None,
            max_size: None,
        })
    }
}

impl fmt::Debug for SiteSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SiteSchema")
            .field("name", &self.name)
            .field("url_pattern", &self.url_pattern)
            .field("description", &self.description)
            .field("include_patterns", &self.include_patterns)
            .field("exclude_patterns", &self.exclude_patterns)
            .field("url_include_patterns", &self.url_include_patterns)
            .field("url_exclude_patterns", &self.url_exclude_patterns)
            .field("sort_by", &self.sort_by)
            .field("sort_key", &self.sort_key.as_ref().map(|_| "<fn>"))
            .field("default_output_name", &self.default_output_name)
            .field("recommended_depth", &self.recommended_depth)
            .field("request_delay", &self.request_delay)
            .field("test_url", &self.test_url)
            .field("expected_min_pdfs", &self.expected_min_pdfs)
            .field("version", &self.version)
            .finish()
    }
}

impl fmt::Display for SiteSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {}",
            self.name,
            self.description.as_deref().unwrap_or("No description")
        )
    }
}
