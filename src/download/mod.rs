//! PDF fetching with bounded retries
//!
//! A download succeeds when the server answers 2xx and the payload looks like
//! a PDF, either by `Content-Type` or by the `%PDF` magic bytes. Transient
//! failures (timeouts, connection errors, non-2xx statuses) are retried with
//! exponential backoff; a payload that is not a PDF is rejected at once.

use reqwest::{header::USER_AGENT, Client};
use std::time::Duration;

/// Magic bytes every PDF file starts with
pub const PDF_MAGIC: &[u8] = b"%PDF";

/// Default number of attempts per download
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Default backoff unit
pub const DEFAULT_BACKOFF_UNIT: Duration = Duration::from_secs(1);

/// Longest single backoff, in backoff units
const MAX_BACKOFF_UNITS: u32 = 10;

/// Options for a single PDF download
#[derive(Debug, Clone)]
pub struct DownloadOptions {
    /// Per-attempt request timeout
    pub timeout: Duration,

    /// Total number of attempts; values below 1 are treated as 1
    pub max_retries: u32,

    /// Value for the `User-Agent` header
    pub user_agent: String,

    /// Base delay of the retry backoff
    pub backoff_unit: Duration,
}

impl Default for DownloadOptions {
    fn default() -> Self {
        Self {
            timeout: crate::DEFAULT_TIMEOUT,
            max_retries: DEFAULT_MAX_RETRIES,
            user_agent: crate::DEFAULT_USER_AGENT.to_string(),
            backoff_unit: DEFAULT_BACKOFF_UNIT,
        }
    }
}

/// Returns the delay to wait after a failed attempt
///
/// `2^(attempt-1)` backoff units, capped at 10 units. `attempt` is 1-based.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use fetcharoo::download::backoff_delay;
///
/// let unit = Duration::from_secs(1);
/// assert_eq!(backoff_delay(1, unit), Duration::from_secs(1));
/// assert_eq!(backoff_delay(3, unit), Duration::from_secs(4));
/// assert_eq!(backoff_delay(6, unit), Duration::from_secs(10));
/// ```
pub fn backoff_delay(attempt: u32, unit: Duration) -> Duration {
    let exponent = attempt.saturating_sub(1).min(31);
    let units = 2u32.saturating_pow(exponent).min(MAX_BACKOFF_UNITS);
    unit * units
}

/// Returns true if a Content-Type header value names a PDF
pub fn is_pdf_content_type(content_type: &str) -> bool {
    content_type.to_lowercase().contains("pdf")
}

/// Returns true if the bytes start with the PDF magic number
pub fn has_pdf_magic(bytes: &[u8]) -> bool {
    bytes.starts_with(PDF_MAGIC)
}

enum Attempt {
    Pdf(Vec<u8>),
    NotPdf(String),
    Retryable(String),
}

/// Downloads a PDF
///
/// Never fails: exhausted retries and non-PDF payloads both yield `None`
/// after logging the cause.
///
/// # Arguments
///
/// * `client` - The HTTP client to use
/// * `url` - The PDF URL
/// * `options` - Timeout, attempt count, user agent and backoff unit
///
/// # Returns
///
/// * `Some(bytes)` - The PDF payload
/// * `None` - The download failed or the payload was not a PDF
pub async fn download_pdf(client: &Client, url: &str, options: &DownloadOptions) -> Option<Vec<u8>> {
    let attempts = options.max_retries.max(1);

    for attempt in 1..=attempts {
        match try_download(client, url, options).await {
            Attempt::Pdf(bytes) => {
                tracing::debug!("Downloaded {} ({} bytes)", url, bytes.len());
                return Some(bytes);
            }
            Attempt::NotPdf(content_type) => {
                tracing::warn!(
                    "Content at {} is not a PDF (Content-Type: {:?}), skipping",
                    url,
                    content_type
                );
                return None;
            }
            Attempt::Retryable(error) => {
                if attempt < attempts {
                    let delay = backoff_delay(attempt, options.backoff_unit);
                    tracing::warn!(
                        "Attempt {}/{} for {} failed: {}. Retrying in {:?}",
                        attempt,
                        attempts,
                        url,
                        error,
                        delay
                    );
                    tokio::time::sleep(delay).await;
                } else {
                    tracing::error!(
                        "Failed to download {} after {} attempt(s): {}",
                        url,
                        attempts,
                        error
                    );
                }
            }
        }
    }

    None
}

async fn try_download(client: &Client, url: &str, options: &DownloadOptions) -> Attempt {
    let response = match client
        .get(url)
        .header(USER_AGENT, options.user_agent.as_str())
        .timeout(options.timeout)
        .send()
        .await
    {
        Ok(response) => response,
        Err(e) if e.is_timeout() => return Attempt::Retryable("request timed out".to_string()),
        Err(e) => return Attempt::Retryable(e.to_string()),
    };

    let status = response.status();
    if !status.is_success() {
        return Attempt::Retryable(format!("HTTP status {}", status.as_u16()));
    }

    let content_type = response
        .headers()
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string();

    let bytes = match response.bytes().await {
        Ok(bytes) => bytes,
        Err(e) => return Attempt::Retryable(e.to_string()),
    };

    if is_pdf_content_type(&content_type) || has_pdf_magic(&bytes) {
        Attempt::Pdf(bytes.to_vec())
    } else {
        Attempt::NotPdf(content_type)
    }
}
