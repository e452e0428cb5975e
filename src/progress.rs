//! Terminal progress display for crawls and downloads
//!
//! Bars draw to stderr and are hidden entirely unless progress was asked
//! for, so callers can drive them unconditionally.

use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

const DOWNLOAD_TEMPLATE: &str = "{msg} [{bar:40.cyan/blue}] {pos}/{len} ({elapsed})";
const CRAWL_TEMPLATE: &str = "{spinner} {msg}";

/// Bar counting finished downloads out of `len`
pub fn download_bar(len: usize, enabled: bool) -> ProgressBar {
    if !enabled {
        return ProgressBar::hidden();
    }

    let bar = ProgressBar::new(len as u64);
    let style = ProgressStyle::with_template(DOWNLOAD_TEMPLATE)
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("=> ");
    bar.set_style(style);
    bar.set_message("Downloading PDFs");
    bar
}

/// Spinner naming the page currently being crawled
pub fn crawl_spinner(enabled: bool) -> ProgressBar {
    if !enabled {
        return ProgressBar::hidden();
    }

    let spinner = ProgressBar::new_spinner();
    let style = ProgressStyle::with_template(CRAWL_TEMPLATE)
        .unwrap_or_else(|_| ProgressStyle::default_spinner());
    spinner.set_style(style);
    spinner.enable_steady_tick(Duration::from_millis(120));
    spinner
}
