//! Crawl session: the long-lived state behind every public entry point
//!
//! A session owns the HTTP client, the robots.txt cache and the default
//! User-Agent. Callers create one and reuse it; nothing is global.

use reqwest::Client;
use std::path::{Path, PathBuf};

use super::engine::{crawl, CrawlOptions};
use super::fetcher::build_http_client;
use crate::process::{apply_url_filters, process_pdfs, ProcessOptions, ProcessResult};
use crate::robots::RobotsCache;

/// Options for [`CrawlSession::download_pdfs_from_webpage`]
#[derive(Debug, Clone)]
pub struct DiscoverOptions {
    pub crawl: CrawlOptions,
    pub process: ProcessOptions,
    /// Output directory
    pub write_dir: PathBuf,
    /// Only report what would be downloaded
    pub dry_run: bool,
}

impl Default for DiscoverOptions {
    fn default() -> Self {
        Self {
            crawl: CrawlOptions::default(),
            process: ProcessOptions::default(),
            write_dir: PathBuf::from(crate::DEFAULT_WRITE_DIR),
            dry_run: false,
        }
    }
}

/// Result of [`CrawlSession::download_pdfs_from_webpage`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// PDFs that would be downloaded, after filename and URL filters
    DryRun { urls: Vec<String>, count: usize },
    Processed(ProcessResult),
}

impl Outcome {
    /// A dry run always succeeds; a real run succeeds if a file was written
    pub fn is_success(&self) -> bool {
        match self {
            Outcome::DryRun { .. } => true,
            Outcome::Processed(result) => result.success,
        }
    }
}

/// Owner of the HTTP client, robots.txt cache and default User-Agent
#[derive(Debug)]
pub struct CrawlSession {
    client: Client,
    robots: RobotsCache,
    user_agent: String,
}

impl CrawlSession {
    /// Creates a session using [`crate::DEFAULT_USER_AGENT`]
    pub fn new() -> crate::Result<Self> {
        Self::with_user_agent(crate::DEFAULT_USER_AGENT)
    }

    /// Creates a session with a custom default User-Agent
    pub fn with_user_agent(user_agent: impl Into<String>) -> crate::Result<Self> {
        let user_agent = user_agent.into();
        let client = build_http_client(&user_agent)?;
        Ok(Self::with_client(client, user_agent))
    }

    /// Creates a session around an existing client
    pub fn with_client(client: Client, user_agent: impl Into<String>) -> Self {
        Self {
            client,
            robots: RobotsCache::new(),
            user_agent: user_agent.into(),
        }
    }

    pub fn default_user_agent(&self) -> &str {
        &self.user_agent
    }

    /// Changes the User-Agent used when options don't name one
    pub fn set_default_user_agent(&mut self, user_agent: impl Into<String>) {
        self.user_agent = user_agent.into();
    }

    pub fn robots_cache(&self) -> &RobotsCache {
        &self.robots
    }

    /// Checks a URL against its site's robots.txt, fetching it at most once
    pub async fn check_robots_txt(&mut self, url: &str, user_agent: &str) -> bool {
        self.robots.check(&self.client, url, user_agent).await
    }

    /// Crawls from `root` and returns the PDF URLs found, in discovery order
    pub async fn find_pdfs(&mut self, root: &str, options: &CrawlOptions) -> Vec<String> {
        crawl(&self.client, &mut self.robots, root, options, &self.user_agent).await
    }

    /// Filters, orders, downloads and writes PDFs
    pub async fn process(
        &self,
        urls: &[String],
        write_dir: &Path,
        options: &ProcessOptions,
    ) -> ProcessResult {
        process_pdfs(&self.client, urls, write_dir, options, &self.user_agent).await
    }

    /// Crawls from `root`, then either reports or processes what was found
    ///
    /// A dry run applies filename and URL filters and touches neither the
    /// PDFs nor the disk.
    pub async fn download_pdfs_from_webpage(
        &mut self,
        root: &str,
        options: &DiscoverOptions,
    ) -> Outcome {
        let urls = self.find_pdfs(root, &options.crawl).await;

        if options.dry_run {
            let urls = apply_url_filters(&urls, options.process.filter.as_ref());
            tracing::info!("DRY RUN: Found {} PDF(s) that would be downloaded:", urls.len());
            for url in &urls {
                tracing::info!("  - {}", url);
            }
            let count = urls.len();
            return Outcome::DryRun { urls, count };
        }

        Outcome::Processed(self.process(&urls, &options.write_dir, &options.process).await)
    }
}
