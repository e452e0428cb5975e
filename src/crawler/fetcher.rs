//! HTTP fetcher for HTML pages
//!
//! This module handles page requests for the crawler, including:
//! - Building HTTP clients with the session's user agent
//! - GET requests with a per-request timeout and `User-Agent` header
//! - Error classification (HTTP status vs. network failure)

use reqwest::{header::USER_AGENT, Client};
use std::time::Duration;

/// Result of a page fetch
#[derive(Debug)]
pub enum FetchResult {
    /// Successfully fetched the page
    Success {
        /// HTTP status code
        status_code: u16,
        /// Content-Type header value
        content_type: String,
        /// Page body content
        body: String,
    },

    /// Server answered with a non-2xx status
    HttpError {
        /// The HTTP status code
        status_code: u16,
    },

    /// Network error (connection refused, timeout, unreadable body, etc.)
    NetworkError {
        /// Error description
        error: String,
        /// Whether the request hit its timeout
        timed_out: bool,
    },
}

/// Builds an HTTP client with proper configuration
///
/// Requests made through the client still set their own `User-Agent` header
/// and timeout; the values here are the fallbacks.
///
/// # Arguments
///
/// * `user_agent` - The default user agent string
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
pub fn build_http_client(user_agent: &str) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(user_agent)
        .timeout(crate::DEFAULT_TIMEOUT)
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches a page's HTML
///
/// Redirects are followed by the client. Any 2xx response is a success
/// regardless of its Content-Type; the caller extracts whatever anchors the
/// body contains.
///
/// # Arguments
///
/// * `client` - The HTTP client to use
/// * `url` - The URL to fetch
/// * `user_agent` - Value for the `User-Agent` header
/// * `timeout` - Request timeout
///
/// # Returns
///
/// A FetchResult indicating success or the type of failure
pub async fn fetch_page(
    client: &Client,
    url: &str,
    user_agent: &str,
    timeout: Duration,
) -> FetchResult {
    let response = match client
        .get(url)
        .header(USER_AGENT, user_agent)
        .timeout(timeout)
        .send()
        .await
    {
        Ok(response) => response,
        Err(e) => return classify_error(e),
    };

    let status = response.status();
    if !status.is_success() {
        return FetchResult::HttpError {
            status_code: status.as_u16(),
        };
    }

    let content_type = response
        .headers()
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string();

    match response.text().await {
        Ok(body) => FetchResult::Success {
            status_code: status.as_u16(),
            content_type,
            body,
        },
        Err(e) => classify_error(e),
    }
}

fn classify_error(e: reqwest::Error) -> FetchResult {
    if e.is_timeout() {
        FetchResult::NetworkError {
            error: "Request timeout".to_string(),
            timed_out: true,
        }
    } else if e.is_connect() {
        FetchResult::NetworkError {
            error: "Connection refused".to_string(),
            timed_out: false,
        }
    } else {
        FetchResult::NetworkError {
            error: e.to_string(),
            timed_out: false,
        }
    }
}
