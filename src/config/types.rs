use serde::Deserialize;
use std::path::PathBuf;

/// Main configuration structure for Drivelog
///
/// Every section is optional so that a crawl can be started from the
/// command line alone.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub crawler: CrawlerConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    pub site: SiteConfig,
    pub start: StartConfig,
    pub output: OutputConfig,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CrawlerConfig {
    /// Maximum number of concurrent page fetches
    #[serde(rename = "max-concurrent-pages-open")]
    pub max_concurrent_pages_open: u32,

    /// Minimum time between two dispatched requests (milliseconds)
    #[serde(rename = "minimum-time-on-page")]
    pub minimum_time_on_page: u64,

    /// How many times a transient fetch failure is retried
    #[serde(rename = "max-retries")]
    pub max_retries: u32,

    /// Delay before retrying a failed fetch (milliseconds)
    #[serde(rename = "retry-delay")]
    pub retry_delay: u64,

    /// Upper bound on fetches for one run, 0 for unlimited
    #[serde(rename = "max-requests")]
    pub max_requests: u32,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            max_concurrent_pages_open: 4,
            minimum_time_on_page: 1000,
            max_retries: 3,
            retry_delay: 5000,
            max_requests: 0,
        }
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url")]
    pub contact_url: String,

    /// Email address for crawler-related contact
    #[serde(rename = "contact-email")]
    pub contact_email: String,
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            crawler_name: "drivelog".to_string(),
            crawler_version: env!("CARGO_PKG_VERSION").to_string(),
            contact_url: "https://example.com/about".to_string(),
            contact_email: "admin@example.com".to_string(),
        }
    }
}

/// Where the crawled site lives
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Site root used to build the profile seed URL
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Profile path template, `{username}` is substituted
    #[serde(rename = "profile-path")]
    pub profile_path: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.drive2.ru/".to_string(),
            profile_path: "/users/{username}/".to_string(),
        }
    }
}

/// Crawl start parameters
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct StartConfig {
    /// The user the crawl is scoped to
    pub username: Option<String>,

    /// An arbitrary page to start from instead of the profile
    #[serde(rename = "start-url")]
    pub start_url: Option<String>,
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Path to the SQLite database file, `{timestamp}` is substituted
    #[serde(rename = "database-path")]
    pub database_path: String,

    /// Path to the markdown summary file
    #[serde(rename = "summary-path")]
    pub summary_path: Option<String>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            database_path: "./d2_export_{timestamp}.db".to_string(),
            summary_path: None,
        }
    }
}

impl OutputConfig {
    /// Resolves the database path for a run started at `timestamp` (unix seconds)
    pub fn resolve_database_path(&self, timestamp: i64) -> PathBuf {
        PathBuf::from(
            self.database_path
                .replace("{timestamp}", &timestamp.to_string()),
        )
    }
}

impl UserAgentConfig {
    /// Formats the user agent header: `Name/Version (+ContactURL; ContactEmail)`
    pub fn header_value(&self) -> String {
        format!(
            "{}/{} (+{}; {})",
            self.crawler_name, self.crawler_version, self.contact_url, self.contact_email
        )
    }
}
