//! Configuration module for fetcharoo
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//!
//! # Example
//!
//! ```no_run
//! use fetcharoo::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("fetcharoo.toml")).unwrap();
//! println!("Crawl depth: {:?}", config.crawl.depth);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, CrawlConfig, OutputConfig, SchemaEntry};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
