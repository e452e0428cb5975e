//! Site schemas
//!
//! A schema bundles the settings that work best for one kind of site: which
//! PDFs to keep, how to order them, what to call the merged output and how
//! hard to crawl. Schemas are looked up by name or detected from a URL
//! through an explicit [`SchemaRegistry`].

mod registry;
mod site;

pub use registry::SchemaRegistry;
pub use site::SiteSchema;
