//! Fetcharoo: find PDF links on webpages and download them
//!
//! This crate crawls a webpage (optionally following links within an allowed
//! set of domains), collects every linked PDF, downloads them with bounded
//! retries, and writes them to disk as separate files or merged into one
//! document.

pub mod config;
pub mod crawler;
pub mod download;
pub mod filter;
pub mod pdf;
pub mod process;
pub mod progress;
pub mod robots;
pub mod schema;
pub mod url;

use std::time::Duration;
use thiserror::Error;

/// Default User-Agent identifying the crawler to site operators
pub const DEFAULT_USER_AGENT: &str = "fetcharoo/0.2.0 (+https://github.com/MALathon/fetcharoo)";

/// Default directory PDFs are written to
pub const DEFAULT_WRITE_DIR: &str = "output";

/// Default per-request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default delay between recursive page requests
pub const DEFAULT_REQUEST_DELAY: Duration = Duration::from_millis(500);

/// Hard ceiling on recursion depth, regardless of what the caller asks for
pub const MAX_RECURSION_DEPTH: u32 = 5;

/// Main error type for fetcharoo operations
#[derive(Debug, Error)]
pub enum FetcharooError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),

    #[error("Invalid PDF from {source_name}: {reason}")]
    InvalidPdf { source_name: String, reason: String },

    #[error("Schema error: {0}")]
    Schema(#[from] SchemaError),

    #[error("Invalid mode: {0}. Must be 'separate' or 'merge'")]
    InvalidMode(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Invalid pattern: {0}")]
    InvalidPattern(String),
}

/// Site schema errors
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("Invalid url_pattern regex: {0}")]
    InvalidPattern(#[from] regex::Error),

    #[error("Unknown sort strategy '{0}', expected one of none, numeric, alpha, alpha_desc")]
    InvalidSortBy(String),

    #[error("Schema '{0}' already registered. Use overwrite to replace it.")]
    AlreadyRegistered(String),
}

/// Result type alias for fetcharoo operations
pub type Result<T> = std::result::Result<T, FetcharooError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{CrawlOptions, CrawlSession, DiscoverOptions, Outcome};
pub use download::{download_pdf, DownloadOptions};
pub use filter::{should_download_pdf, FilterConfig};
pub use process::{OutputMode, ProcessOptions, ProcessResult, SortBy, SortKey, SORT_BY_OPTIONS};
pub use schema::{SchemaRegistry, SiteSchema};
pub use url::{extract_domain, is_safe_domain, is_valid_url, sanitize_filename};
