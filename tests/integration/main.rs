//! End-to-end tests against mock HTTP servers
//!
//! These tests use wiremock to stand up sites with HTML pages, PDFs and
//! robots.txt files, then drive the public API the way the CLI does.

mod common;
mod crawl;
mod download;
mod process;
mod robots;
