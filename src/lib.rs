//! Drivelog: a context-threading crawler for car-blog profiles
//!
//! This crate crawls a user's profile on a car-blog site (vehicles, logbooks,
//! photo albums, photo posts, blog posts) and emits one structured record per
//! page, tagging every record with the collection it came from and the
//! vehicle that owns it.
//!
//! The routing and context-propagation engine lives in [`spider`]; the
//! [`crawler`] module drives it with real HTTP fetches and [`output`]
//! persists what it emits.

pub mod config;
pub mod crawler;
pub mod output;
pub mod spider;
pub mod storage;
pub mod url;

use thiserror::Error;

/// Main error type for Drivelog operations
#[derive(Debug, Error)]
pub enum DrivelogError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("Output error: {0}")]
    Output(#[from] output::OutputError),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("Page error: {0}")]
    Page(#[from] PageError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("No crawl seed: supply a username or a start URL")]
    MissingSeed,

    #[error("Start URL {0} does not address a known page kind")]
    UnroutableStart(String),
}

/// Errors that abort the handling of a single page
///
/// These never stop the crawl; the coordinator logs them and moves on.
#[derive(Debug, Error)]
pub enum PageError {
    #[error("Required element `{selector}` missing on {url}")]
    MissingElement { url: String, selector: &'static str },
}

/// Result type alias for Drivelog operations
pub type Result<T> = std::result::Result<T, DrivelogError>;

// Re-export commonly used types
pub use config::Config;
pub use spider::{CrawlContext, HandlerOutput, Record, WorkItem};
pub use crate::url::{classify, classify_path, PageKind};
