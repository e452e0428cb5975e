//! Robots.txt caching implementation
//!
//! Entries are keyed by site origin (`scheme://host[:port]`) and live as long
//! as the cache. There is no expiry: a crawl is short-lived and bounded to a
//! handful of sites.

use crate::robots::{fetch_robots, ParsedRobots, ROBOTS_TIMEOUT};
use crate::url::origin_of;
use chrono::{DateTime, Duration, Utc};
use reqwest::Client;
use std::collections::HashMap;
use url::Url;

/// Cached robots.txt data for a site
#[derive(Debug, Clone)]
pub struct CachedRobots {
    /// The parsed robots.txt content
    pub content: ParsedRobots,

    /// When the robots.txt was fetched
    pub fetched_at: DateTime<Utc>,
}

impl CachedRobots {
    /// Creates a new CachedRobots instance stamped with the current time
    pub fn new(content: ParsedRobots) -> Self {
        Self {
            content,
            fetched_at: Utc::now(),
        }
    }

    /// Returns the age of the cached robots.txt
    pub fn age(&self) -> Duration {
        Utc::now() - self.fetched_at
    }

    /// Checks if a URL is allowed according to the cached robots.txt
    pub fn is_allowed(&self, url: &str, user_agent: &str) -> bool {
        self.content.is_allowed(url, user_agent)
    }
}

/// Per-site robots.txt cache
///
/// Answers "may this user agent fetch this URL?" and fetches each site's
/// robots.txt lazily on first use.
#[derive(Debug)]
pub struct RobotsCache {
    entries: HashMap<String, CachedRobots>,
    timeout: std::time::Duration,
}

impl Default for RobotsCache {
    fn default() -> Self {
        Self::new()
    }
}

impl RobotsCache {
    /// Creates an empty cache using the standard robots.txt timeout
    pub fn new() -> Self {
        Self::with_timeout(ROBOTS_TIMEOUT)
    }

    /// Creates an empty cache with a custom robots.txt fetch timeout
    pub fn with_timeout(timeout: std::time::Duration) -> Self {
        Self {
            entries: HashMap::new(),
            timeout,
        }
    }

    /// Checks if crawling a URL is allowed by its site's robots.txt
    ///
    /// The first query for a site fetches `<origin>/robots.txt`; the parsed
    /// result (or an allow-all entry when the fetch fails or returns anything
    /// but `200`) is cached, so later queries for that site make no requests.
    /// A URL that cannot be parsed is allowed and nothing is cached.
    ///
    /// # Arguments
    ///
    /// * `client` - HTTP client used for the robots.txt fetch
    /// * `url` - The URL to check
    /// * `user_agent` - The user agent to check permissions for
    pub async fn check(&mut self, client: &Client, url: &str, user_agent: &str) -> bool {
        let origin = match Url::parse(url).ok().as_ref().and_then(origin_of) {
            Some(origin) => origin,
            None => {
                tracing::debug!("Cannot derive robots.txt location for {}, allowing", url);
                return true;
            }
        };

        if let Some(cached) = self.entries.get(&origin) {
            tracing::trace!(
                "Using cached robots.txt for {} (age {}s)",
                origin,
                cached.age().num_seconds()
            );
            return cached.is_allowed(url, user_agent);
        }

        tracing::debug!("Fetching robots.txt for {}", origin);
        let robots = fetch_robots(client, &origin, user_agent, self.timeout).await;
        let cached = CachedRobots::new(robots);
        let allowed = cached.is_allowed(url, user_agent);
        self.entries.insert(origin, cached);
        allowed
    }

    /// Returns the cached entry for a site origin, if any
    pub fn get(&self, origin: &str) -> Option<&CachedRobots> {
        self.entries.get(origin)
    }

    /// Inserts a rule set for a site origin, replacing any cached entry
    pub fn insert(&mut self, origin: impl Into<String>, robots: ParsedRobots) {
        self.entries.insert(origin.into(), CachedRobots::new(robots));
    }

    /// Number of sites with cached rules
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if nothing has been cached yet
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drops every cached entry
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
