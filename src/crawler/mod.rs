//! Crawler module for PDF discovery
//!
//! This module contains the core crawling logic, including:
//! - HTTP page fetching
//! - HTML anchor extraction
//! - Depth-limited, domain-scoped link following
//! - The session type that ties crawling and processing together

mod engine;
mod fetcher;
mod parser;
mod session;

pub use engine::CrawlOptions;
pub use fetcher::{build_http_client, fetch_page, FetchResult};
pub use parser::{extract_links, is_pdf_link};
pub use session::{CrawlSession, DiscoverOptions, Outcome};
