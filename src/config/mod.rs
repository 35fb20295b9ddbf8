//! Configuration module for Drivelog
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//!
//! # Example
//!
//! ```no_run
//! use drivelog::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("drivelog.toml")).unwrap();
//! println!(
//!     "Crawling {} with {} workers",
//!     config.site.base_url, config.crawler.max_concurrent_pages_open
//! );
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    Config, CrawlerConfig, OutputConfig, SiteConfig, StartConfig, UserAgentConfig,
};

// Re-export parser functions
pub use parser::{
    compute_config_hash, hash_content, load_config, load_config_with_hash, parse_config,
};
pub use validation::{validate, validate_username};
