//! Robots.txt handling module
//!
//! This module provides functionality for fetching, parsing, and caching robots.txt files.
//! Each site's rules are fetched at most once per session; failures are cached as
//! allow-all so a broken site is not asked again.

mod cache;
mod parser;

pub use cache::{CachedRobots, RobotsCache};
pub use parser::{product_token, ParsedRobots};

use reqwest::{header::USER_AGENT, Client, StatusCode};
use std::time::Duration;

/// Timeout for fetching a robots.txt file
pub const ROBOTS_TIMEOUT: Duration = Duration::from_secs(10);

/// Fetches robots.txt for a site
///
/// A `200` response is parsed; any other status, a network failure, or an
/// unreadable body yields a permissive rule set. This never fails.
///
/// # Arguments
///
/// * `client` - The HTTP client to use
/// * `origin` - The site origin, e.g. `https://example.com`
/// * `user_agent` - The user agent string sent with the request
/// * `timeout` - Request timeout
pub async fn fetch_robots(
    client: &Client,
    origin: &str,
    user_agent: &str,
    timeout: Duration,
) -> ParsedRobots {
    let robots_url = format!("{}/robots.txt", origin);

    let response = match client
        .get(&robots_url)
        .header(USER_AGENT, user_agent)
        .timeout(timeout)
        .send()
        .await
    {
        Ok(response) => response,
        Err(e) => {
            tracing::debug!("Could not fetch robots.txt for {}: {}", origin, e);
            return ParsedRobots::allow_all();
        }
    };

    if response.status() != StatusCode::OK {
        tracing::debug!(
            "robots.txt returned status {} for {}",
            response.status().as_u16(),
            origin
        );
        return ParsedRobots::allow_all();
    }

    match response.text().await {
        Ok(body) => ParsedRobots::from_content(&body),
        Err(e) => {
            tracing::debug!("Could not read robots.txt body for {}: {}", origin, e);
            ParsedRobots::allow_all()
        }
    }
}
