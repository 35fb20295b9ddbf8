//! Crawler module for page fetching and crawl orchestration
//!
//! This module contains the machinery around the spider, including:
//! - HTTP fetching with retry logic
//! - HTML parsing and structured extraction
//! - Request scheduling and pacing
//! - Overall crawl coordination

mod coordinator;
mod fetcher;
mod parser;
mod scheduler;

pub use coordinator::{run_crawl, Coordinator, CrawlReport};
pub use fetcher::{build_http_client, fetch_url, fetch_with_retry, FetchResult};
pub use parser::Document;
pub use scheduler::Scheduler;
