//! Processing pipeline: filter, sort, download and persist PDFs
//!
//! Given the URLs a crawl discovered, the pipeline:
//! 1. Applies filename and URL filters
//! 2. Orders the survivors
//! 3. Downloads each one in sequence
//! 4. Applies size limits to the payloads
//! 5. Writes them as separate files or as one merged document
//!
//! Every failure along the way is logged and counted in the returned
//! [`ProcessResult`]; nothing is propagated to the caller.

mod sort;

pub use sort::{numeric_key, sort_urls, SortBy, SortKey, SORT_BY_OPTIONS};

use reqwest::Client;
use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use crate::download::{
    download_pdf, has_pdf_magic, DownloadOptions, DEFAULT_BACKOFF_UNIT, DEFAULT_MAX_RETRIES,
};
use crate::filter::{should_download_pdf, FilterConfig};
use crate::pdf::{merge_documents, pdf_to_bytes, unique_path, validate_pdf};
use crate::progress::download_bar;
use crate::url::{path_basename, sanitize_filename};
use crate::FetcharooError;

/// Default name of the merged document
pub const DEFAULT_MERGED_NAME: &str = "merged.pdf";

/// How downloaded PDFs are written
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputMode {
    /// One file per PDF
    #[default]
    Separate,
    /// All PDFs concatenated into one document
    Merge,
}

impl FromStr for OutputMode {
    type Err = FetcharooError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "separate" => Ok(OutputMode::Separate),
            "merge" => Ok(OutputMode::Merge),
            other => Err(FetcharooError::InvalidMode(other.to_string())),
        }
    }
}

impl fmt::Display for OutputMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputMode::Separate => f.write_str("separate"),
            OutputMode::Merge => f.write_str("merge"),
        }
    }
}

/// Options for [`process_pdfs`]
#[derive(Clone)]
pub struct ProcessOptions {
    pub mode: OutputMode,
    pub filter: Option<FilterConfig>,
    pub sort_by: SortBy,
    /// Custom comparator, used instead of `sort_by` when set
    pub sort_key: Option<SortKey>,
    /// Merged document name; ignored in separate mode
    pub output_name: Option<String>,
    pub timeout: Duration,
    /// Total download attempts per PDF
    pub max_retries: u32,
    /// `None` uses the session default
    pub user_agent: Option<String>,
    pub backoff_unit: Duration,
    /// Draw a download progress bar on stderr
    pub show_progress: bool,
}

impl Default for ProcessOptions {
    fn default() -> Self {
        Self {
            mode: OutputMode::default(),
            filter: None,
            sort_by: SortBy::default(),
            sort_key: None,
            output_name: None,
            timeout: crate::DEFAULT_TIMEOUT,
            max_retries: DEFAULT_MAX_RETRIES,
            user_agent: None,
            backoff_unit: DEFAULT_BACKOFF_UNIT,
            show_progress: false,
        }
    }
}

impl fmt::Debug for ProcessOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProcessOptions")
            .field("mode", &self.mode)
            .field("filter", &self.filter)
            .field("sort_by", &self.sort_by)
            .field("sort_key", &self.sort_key.as_ref().map(|_| "<fn>"))
            .field("output_name", &self.output_name)
            .field("timeout", &self.timeout)
            .field("max_retries", &self.max_retries)
            .field("user_agent", &self.user_agent)
            .field("backoff_unit", &self.backoff_unit)
            .field("show_progress", &self.show_progress)
            .finish()
    }
}

impl ProcessOptions {
    /// Download options for these settings, with a fallback user agent
    pub fn download_options(&self, default_user_agent: &str) -> DownloadOptions {
        DownloadOptions {
            timeout: self.timeout,
            max_retries: self.max_retries,
            user_agent: self
                .user_agent
                .clone()
                .unwrap_or_else(|| default_user_agent.to_string()),
            backoff_unit: self.backoff_unit,
        }
    }
}

/// Outcome of a processing run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessResult {
    /// True iff at least one file was written
    pub success: bool,
    /// Paths written, in order
    pub files_created: Vec<PathBuf>,
    /// PDFs fetched successfully, before size limits
    pub downloaded_count: usize,
    /// PDFs dropped by filename, URL or size filters
    pub filtered_count: usize,
    /// PDFs that failed to download, validate or save
    pub failed_count: usize,
    /// One message per failure
    pub errors: Vec<String>,
}

impl ProcessResult {
    fn fail(&mut self, message: String) {
        tracing::error!("{}", message);
        self.failed_count += 1;
        self.errors.push(message);
    }

    fn note(&mut self, message: &str) {
        tracing::warn!("{}", message);
        self.errors.push(message.to_string());
    }
}

/// Applies filename and URL filters, returning the survivors
pub fn apply_url_filters(urls: &[String], filter: Option<&FilterConfig>) -> Vec<String> {
    let Some(filter) = filter else {
        return urls.to_vec();
    };

    urls.iter()
        .filter(|url| {
            let keep = should_download_pdf(url, None, filter);
            if !keep {
                tracing::info!("Filtered out PDF (filename/URL): {}", url);
            }
            keep
        })
        .cloned()
        .collect()
}

/// Downloads and writes a list of PDF URLs
///
/// # Arguments
///
/// * `client` - HTTP client for the downloads
/// * `urls` - PDF URLs in discovery order
/// * `write_dir` - Output directory, created if missing
/// * `options` - Mode, filters, ordering and download settings
/// * `default_user_agent` - Used when `options.user_agent` is `None`
pub async fn process_pdfs(
    client: &Client,
    urls: &[String],
    write_dir: &Path,
    options: &ProcessOptions,
    default_user_agent: &str,
) -> ProcessResult {
    let mut result = ProcessResult::default();

    if urls.is_empty() {
        result.note("No PDF URLs to process");
        return result;
    }

    let mut kept = apply_url_filters(urls, options.filter.as_ref());
    result.filtered_count = urls.len() - kept.len();
    if kept.is_empty() {
        result.note("All PDFs were filtered out");
        return result;
    }

    sort_urls(&mut kept, options.sort_by, options.sort_key.as_ref());

    if let Err(e) = std::fs::create_dir_all(write_dir) {
        result.note(&format!(
            "Could not create output directory {}: {}",
            write_dir.display(),
            e
        ));
        return result;
    }

    let download_options = options.download_options(default_user_agent);
    let mut payloads: Vec<(String, Vec<u8>)> = Vec::with_capacity(kept.len());
    let bar = download_bar(kept.len(), options.show_progress);
    for url in kept {
        match download_pdf(client, &url, &download_options).await {
            Some(bytes) if has_pdf_magic(&bytes) => {
                result.downloaded_count += 1;
                payloads.push((url, bytes));
            }
            Some(_) => result.fail(format!("Content from {} is not a valid PDF", url)),
            None => result.fail(format!("Failed to download {}", url)),
        }
        bar.inc(1);
    }
    bar.finish_and_clear();

    if let Some(filter) = options.filter.as_ref().filter(|f| f.has_size_limits()) {
        let before = payloads.len();
        payloads.retain(|(url, bytes)| {
            let keep = should_download_pdf(url, Some(bytes.len() as u64), filter);
            if !keep {
                tracing::info!("Filtered out PDF (size: {} bytes): {}", bytes.len(), url);
            }
            keep
        });
        result.filtered_count += before - payloads.len();
    }

    if payloads.is_empty() {
        result.note("No valid PDF content to write");
        return result;
    }

    match options.mode {
        OutputMode::Merge => write_merged(&payloads, write_dir, options, &mut result),
        OutputMode::Separate => write_separate(&payloads, write_dir, &mut result),
    }

    result.success = !result.files_created.is_empty();
    tracing::info!(
        "Processed {} PDF(s): {} file(s) written, {} filtered, {} failed",
        result.downloaded_count,
        result.files_created.len(),
        result.filtered_count,
        result.failed_count
    );
    result
}

fn write_merged(
    payloads: &[(String, Vec<u8>)],
    write_dir: &Path,
    options: &ProcessOptions,
    result: &mut ProcessResult,
) {
    let mut documents = Vec::with_capacity(payloads.len());
    for (url, bytes) in payloads {
        match validate_pdf(bytes, url) {
            Ok(document) => documents.push(document),
            Err(e) => result.fail(format!("Skipping {} in merge: {}", url, e)),
        }
    }

    if documents.is_empty() {
        return;
    }

    let file_name = options
        .output_name
        .as_deref()
        .map(sanitize_filename)
        .unwrap_or_else(|| DEFAULT_MERGED_NAME.to_string());
    let path = write_dir.join(file_name);

    let written = merge_documents(documents)
        .and_then(|mut merged| pdf_to_bytes(&mut merged))
        .and_then(|bytes| std::fs::write(&path, bytes).map_err(FetcharooError::from));

    match written {
        Ok(()) => {
            tracing::info!("Wrote merged PDF {}", path.display());
            result.files_created.push(path);
        }
        Err(e) => result.fail(format!("Failed to write merged PDF {}: {}", path.display(), e)),
    }
}

fn write_separate(payloads: &[(String, Vec<u8>)], write_dir: &Path, result: &mut ProcessResult) {
    for (url, bytes) in payloads {
        if let Err(e) = validate_pdf(bytes, url) {
            result.fail(format!("Failed to save {}: {}", url, e));
            continue;
        }

        let file_name = sanitize_filename(&path_basename(url));
        let path = unique_path(write_dir, &file_name);

        match std::fs::write(&path, bytes) {
            Ok(()) => {
                tracing::info!("Saved {}", path.display());
                result.files_created.push(path);
            }
            Err(e) => result.fail(format!("Failed to save {}: {}", path.display(), e)),
        }
    }
}
