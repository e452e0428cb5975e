//! Recursive PDF discovery
//!
//! Pages are crawled depth-first from an explicit stack of work items, each
//! carrying its own remaining depth. The output is the preorder of the crawl:
//! a page's own PDFs, then everything found under its first followed link,
//! then its second, and so on.

use reqwest::Client;
use std::collections::HashSet;
use std::time::Duration;
use url::Url;

use super::fetcher::{fetch_page, FetchResult};
use super::parser::{extract_links, is_pdf_link};
use crate::progress::crawl_spinner;
use crate::robots::RobotsCache;
use crate::url::{domain_of, is_safe_domain, is_valid_url};
use crate::MAX_RECURSION_DEPTH;

/// Options for a crawl
#[derive(Debug, Clone)]
pub struct CrawlOptions {
    /// How many link levels below the root page to follow
    pub depth: u32,
    /// Domains pages may be followed into; `None` means the root's domain
    pub allowed_domains: Option<HashSet<String>>,
    /// Pause before each followed page request
    pub request_delay: Duration,
    /// Per-page request timeout
    pub timeout: Duration,
    /// Skip PDF links disallowed by the site's robots.txt
    pub respect_robots: bool,
    /// `None` uses the session default
    pub user_agent: Option<String>,
    /// Report each PDF URL once across the whole crawl
    pub deduplicate: bool,
    /// Show a spinner naming the page being crawled
    pub show_progress: bool,
}

impl Default for CrawlOptions {
    fn default() -> Self {
        Self {
            depth: 0,
            allowed_domains: None,
            request_delay: crate::DEFAULT_REQUEST_DELAY,
            timeout: crate::DEFAULT_TIMEOUT,
            respect_robots: false,
            user_agent: None,
            deduplicate: true,
            show_progress: false,
        }
    }
}

struct WorkItem {
    url: String,
    depth: u32,
    is_root: bool,
}

/// State shared by every page of one crawl
struct CrawlState<'a> {
    client: &'a Client,
    robots: &'a mut RobotsCache,
    options: &'a CrawlOptions,
    user_agent: &'a str,
    allowed_domains: HashSet<String>,
    visited: HashSet<String>,
    seen_pdfs: Option<HashSet<String>>,
}

#[derive(Default)]
struct PageLinks {
    pdfs: Vec<String>,
    follow: Vec<String>,
}

/// Finds PDF links starting from `root`
///
/// Never fails: invalid input, policy rejections and network errors are
/// logged and end only the affected branch.
pub(crate) async fn crawl(
    client: &Client,
    robots: &mut RobotsCache,
    root: &str,
    options: &CrawlOptions,
    default_user_agent: &str,
) -> Vec<String> {
    let mut depth = options.depth;
    if depth > MAX_RECURSION_DEPTH {
        tracing::warn!(
            "Recursion depth {} exceeds maximum {}, limiting.",
            depth,
            MAX_RECURSION_DEPTH
        );
        depth = MAX_RECURSION_DEPTH;
    }

    let allowed_domains = match &options.allowed_domains {
        Some(domains) => domains.clone(),
        None => domain_of(root).into_iter().collect(),
    };

    let mut state = CrawlState {
        client,
        robots,
        options,
        user_agent: options.user_agent.as_deref().unwrap_or(default_user_agent),
        allowed_domains,
        visited: HashSet::new(),
        seen_pdfs: options.deduplicate.then(HashSet::new),
    };

    let spinner = crawl_spinner(options.show_progress);
    let mut found = Vec::new();
    let mut stack = vec![WorkItem {
        url: root.to_string(),
        depth,
        is_root: true,
    }];

    while let Some(item) = stack.pop() {
        if !item.is_root {
            if state.visited.contains(&item.url) {
                tracing::trace!("Already visited {}", item.url);
                continue;
            }
            tokio::time::sleep(options.request_delay).await;
        }
        state.visited.insert(item.url.clone());

        spinner.set_message(format!("Finding PDFs from: {}", item.url));
        tracing::debug!("Finding PDFs from: {} (depth {})", item.url, item.depth);
        let page = state.crawl_page(&item.url, item.depth).await;
        found.extend(page.pdfs);

        if item.depth > 0 {
            // Reversed so the first link is popped first
            stack.extend(page.follow.into_iter().rev().map(|url| WorkItem {
                url,
                depth: item.depth - 1,
                is_root: false,
            }));
        }
    }

    spinner.finish_and_clear();
    tracing::info!("Found {} PDF link(s) from {}", found.len(), root);
    found
}

impl CrawlState<'_> {
    async fn crawl_page(&mut self, url: &str, depth: u32) -> PageLinks {
        let mut page = PageLinks::default();

        if !is_valid_url(url) {
            tracing::error!("Invalid URL: {}", url);
            return page;
        }

        if !is_safe_domain(url, Some(&self.allowed_domains)) {
            tracing::warn!("URL domain not in allowed list: {}", url);
            return page;
        }

        let body = match fetch_page(self.client, url, self.user_agent, self.options.timeout).await {
            FetchResult::Success { body, .. } => body,
            FetchResult::HttpError { status_code } => {
                tracing::error!("Error fetching webpage {}: HTTP status {}", url, status_code);
                return page;
            }
            FetchResult::NetworkError {
                timed_out: true, ..
            } => {
                tracing::error!("Request timed out: {}", url);
                return page;
            }
            FetchResult::NetworkError { error, .. } => {
                tracing::error!("Error fetching webpage {}: {}", url, error);
                return page;
            }
        };

        let Ok(base) = Url::parse(url) else {
            return page;
        };

        for link in extract_links(&body, &base) {
            let Ok(parsed) = Url::parse(&link) else {
                continue;
            };

            if is_pdf_link(&parsed) {
                self.collect_pdf(link, &mut page.pdfs).await;
            } else if depth > 0 && is_safe_domain(&link, Some(&self.allowed_domains)) {
                page.follow.push(link);
            } else {
                tracing::trace!("Not following {}", link);
            }
        }

        page
    }

    async fn collect_pdf(&mut self, link: String, page_pdfs: &mut Vec<String>) {
        if self.options.respect_robots
            && !self.robots.check(self.client, &link, self.user_agent).await
        {
            tracing::warn!("URL disallowed by robots.txt: {}", link);
            return;
        }

        let seen_elsewhere = self
            .seen_pdfs
            .as_ref()
            .is_some_and(|seen| seen.contains(&link));
        if seen_elsewhere || page_pdfs.contains(&link) {
            tracing::trace!("Skipping duplicate PDF {}", link);
            return;
        }

        if let Some(seen) = self.seen_pdfs.as_mut() {
            seen.insert(link.clone());
        }
        page_pdfs.push(link);
    }
}
