use serde::Deserialize;
use std::collections::HashSet;
use std::time::Duration;

use crate::filter::FilterConfig;
use crate::process::{OutputMode, SortBy};
use crate::schema::{SchemaRegistry, SiteSchema};
use crate::SchemaError;

/// Main configuration structure for fetcharoo
///
/// Every setting is optional; unset values fall through to the built-in
/// defaults. Command-line flags override anything set here.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Config {
    #[serde(default)]
    pub crawl: CrawlConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub filter: FilterConfig,
    #[serde(default, rename = "schema")]
    pub schemas: Vec<SchemaEntry>,
}

impl Config {
    /// Registry of the schemas declared in the file, in file order
    pub fn schema_registry(&self) -> Result<SchemaRegistry, SchemaError> {
        let mut registry = SchemaRegistry::new();
        for entry in &self.schemas {
            registry.register(entry.to_schema()?, false)?;
        }
        Ok(registry)
    }
}

/// Crawl behavior configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct CrawlConfig {
    /// Link levels to follow below the starting page
    pub depth: Option<u32>,

    /// Delay between page requests (seconds)
    pub request_delay: Option<f64>,

    /// Request timeout (seconds)
    pub timeout: Option<f64>,

    pub respect_robots: Option<bool>,

    pub deduplicate: Option<bool>,

    pub user_agent: Option<String>,

    /// Domains pages may be followed into
    pub allowed_domains: Option<Vec<String>>,
}

impl CrawlConfig {
    pub fn request_delay(&self) -> Option<Duration> {
        self.request_delay
            .and_then(|secs| Duration::try_from_secs_f64(secs).ok())
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
            .and_then(|secs| Duration::try_from_secs_f64(secs).ok())
    }

    pub fn allowed_domains(&self) -> Option<HashSet<String>> {
        self.allowed_domains
            .as_ref()
            .map(|domains| domains.iter().map(|d| d.to_lowercase()).collect())
    }
}

/// Output configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct OutputConfig {
    /// Directory PDFs are written to
    pub directory: Option<String>,

    /// `separate` or `merge`
    pub mode: Option<String>,

    /// Merged document name
    pub output_name: Option<String>,

    /// One of `none`, `numeric`, `alpha`, `alpha_desc`
    pub sort_by: Option<String>,
}

impl OutputConfig {
    /// The configured mode, if set and valid
    pub fn mode(&self) -> Option<OutputMode> {
        self.mode.as_deref().and_then(|m| m.parse().ok())
    }

    /// The configured sort strategy, if set and valid
    pub fn sort_by(&self) -> Option<SortBy> {
        self.sort_by.as_deref().and_then(|s| s.parse().ok())
    }
}

/// A site schema declared in the config file
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct SchemaEntry {
    pub name: String,
    pub url_pattern: String,
    pub description: Option<String>,
    #[serde(default)]
    pub include: Vec<String>,
    #[serde(default)]
    pub exclude: Vec<String>,
    #[serde(default)]
    pub url_include: Vec<String>,
    #[serde(default)]
    pub url_exclude: Vec<String>,
    pub sort_by: Option<String>,
    pub default_output_name: Option<String>,
    pub recommended_depth: Option<u32>,
    /// Seconds
    pub request_delay: Option<f64>,
    pub test_url: Option<String>,
    pub expected_min_pdfs: Option<usize>,
    pub version: Option<String>,
}

impl SchemaEntry {
    /// Builds the schema this entry describes
    pub fn to_schema(&self) -> Result<SiteSchema, SchemaError> {
        let mut schema = SiteSchema::new(&self.name, &self.url_pattern)?
            .with_include_patterns(self.include.clone())
            .with_exclude_patterns(self.exclude.clone())
            .with_url_include_patterns(self.url_include.clone())
            .with_url_exclude_patterns(self.url_exclude.clone());

        if let Some(description) = &self.description {
            schema = schema.with_description(description);
        }
        if let Some(sort_by) = &self.sort_by {
            schema = schema.with_sort_by(sort_by.parse()?);
        }
        if let Some(name) = &self.default_output_name {
            schema = schema.with_default_output_name(name);
        }
        if let Some(depth) = self.recommended_depth {
            schema = schema.with_recommended_depth(depth);
        }
        if let Some(delay) = self.request_delay.and_then(|d| Duration::try_from_secs_f64(d).ok()) {
            schema = schema.with_request_delay(delay);
        }
        if let Some(url) = &self.test_url {
            schema = schema.with_test_url(url, self.expected_min_pdfs.unwrap_or(1));
        }
        if let Some(version) = &self.version {
            schema = schema.with_version(version);
        }

        Ok(schema)
    }
}
