//! Crawler coordinator - main crawl orchestration logic
//!
//! This module contains the main crawl loop that coordinates all aspects of
//! the crawling process, including:
//! - Seeding the frontier from the start parameters
//! - Running fetches concurrently, bounded by the configured limit
//! - Handing fetched pages to the spider and exporting what it emits
//! - Handling interrupts
//! - Generating final output

use crate::config::Config;
use crate::crawler::scheduler::Scheduler;
use crate::crawler::{build_http_client, fetch_with_retry, FetchResult};
use crate::output::{generate_markdown_summary, generate_summary, RecordSink, SqliteRecordSink};
use crate::spider::{self, HandlerOutput, Page, Seed, Skip, SkipReason, WorkItem};
use crate::storage::{open_storage, RunStatus};
use crate::DrivelogError;
use reqwest::Client;
use std::path::Path;
use std::time::Duration;
use tokio::task::JoinSet;

/// What a finished crawl did
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrawlReport {
    /// Pages fetched and handed to a handler
    pub pages_fetched: u32,

    /// Records accepted by the sink
    pub records_emitted: u64,

    /// Skips delivered to the sink
    pub skips: u64,

    /// Pages whose handler failed
    pub page_errors: u64,

    /// Work items that could not be fetched
    pub fetch_failures: u64,

    /// Work items left in the frontier (request cap or interrupt)
    pub unvisited: usize,

    /// Final status of the run
    pub status: Option<RunStatus>,
}

/// Main crawler coordinator structure
pub struct Coordinator {
    config: Config,
    scheduler: Scheduler,
    client: Client,
    sink: Box<dyn RecordSink>,
    subject: Option<String>,
    report: CrawlReport,
}

impl Coordinator {
    /// Creates a coordinator exporting into a new run of the SQLite database
    /// at `database_path`
    ///
    /// The seed is resolved before the database is touched, so a config
    /// without a username or start URL fails without creating a file.
    ///
    /// # Arguments
    ///
    /// * `config` - The crawler configuration
    /// * `config_hash` - Hash of the config file, recorded with the run
    /// * `database_path` - Where the export database lives
    pub fn open(
        config: Config,
        config_hash: &str,
        database_path: &Path,
    ) -> Result<Self, DrivelogError> {
        let seed = spider::seed(&config)?;
        let sink = SqliteRecordSink::open(database_path, config_hash, seed.subject.as_deref())?;
        Self::from_seed(config, seed, Box::new(sink))
    }

    /// Creates a coordinator exporting into an arbitrary sink
    pub fn new(config: Config, sink: Box<dyn RecordSink>) -> Result<Self, DrivelogError> {
        let seed = spider::seed(&config)?;
        Self::from_seed(config, seed, sink)
    }

    fn from_seed(
        config: Config,
        seed: Seed,
        sink: Box<dyn RecordSink>,
    ) -> Result<Self, DrivelogError> {
        let client = build_http_client(&config.user_agent)?;

        match &seed.subject {
            Some(subject) => tracing::info!(
                "Seeding crawl for {} at {} ({})",
                subject,
                seed.item.url,
                seed.item.kind
            ),
            None => tracing::info!("Seeding crawl at {} ({})", seed.item.url, seed.item.kind),
        }

        let mut scheduler = Scheduler::new(config.crawler.clone());
        scheduler.enqueue(seed.item);

        Ok(Self {
            config,
            scheduler,
            client,
            sink,
            subject: seed.subject,
            report: CrawlReport::default(),
        })
    }

    /// Runs the main crawl loop until the frontier drains
    ///
    /// Fetches run as tasks on a `JoinSet`; each completed fetch is handled
    /// here, on the coordinator task, before its follow-up items are
    /// scheduled. Ctrl-C stops dispatching, aborts in-flight fetches and
    /// closes the run as interrupted.
    pub async fn run(mut self) -> Result<CrawlReport, DrivelogError> {
        let max_in_flight = self.config.crawler.max_concurrent_pages_open.max(1) as usize;
        let max_retries = self.config.crawler.max_retries;
        let retry_delay = Duration::from_millis(self.config.crawler.retry_delay);

        let start_time = std::time::Instant::now();
        let mut tasks: JoinSet<(WorkItem, FetchResult)> = JoinSet::new();
        let mut status = RunStatus::Completed;

        let ctrl_c = tokio::signal::ctrl_c();
        tokio::pin!(ctrl_c);

        loop {
            while tasks.len() < max_in_flight && self.scheduler.has_ready() {
                let Some(item) = self.scheduler.next_item().await else {
                    break;
                };
                let client = self.client.clone();
                tasks.spawn(async move {
                    let result =
                        fetch_with_retry(&client, &item.url, max_retries, retry_delay).await;
                    (item, result)
                });
            }

            let joined = tokio::select! {
                _ = &mut ctrl_c => {
                    tracing::warn!("Interrupted, abandoning {} in-flight fetches", tasks.len());
                    tasks.abort_all();
                    status = RunStatus::Interrupted;
                    break;
                }
                joined = tasks.join_next() => joined,
            };

            match joined {
                Some(Ok((item, result))) => self.process(item, result),
                Some(Err(e)) => tracing::error!("Fetch task failed: {}", e),
                None => break,
            }

            let done = self.report.pages_fetched + self.report.fetch_failures as u32;
            if done > 0 && done % 10 == 0 {
                tracing::info!(
                    "Progress: {} pages fetched, {} records, {} in frontier, {:.2} pages/sec",
                    self.report.pages_fetched,
                    self.report.records_emitted,
                    self.scheduler.frontier_size(),
                    done as f64 / start_time.elapsed().as_secs_f64()
                );
            }
        }

        self.report.unvisited = self.scheduler.frontier_size();
        if self.report.unvisited > 0 && status == RunStatus::Completed {
            tracing::info!(
                "Request cap of {} reached, {} work items left unvisited",
                self.config.crawler.max_requests,
                self.report.unvisited
            );
        }

        self.sink.finalize(status)?;
        self.report.status = Some(status);

        tracing::info!(
            "Crawl {}: {} pages, {} records, {} skipped, {} page errors, {} fetch failures in {:?}",
            status,
            self.report.pages_fetched,
            self.report.records_emitted,
            self.report.skips,
            self.report.page_errors,
            self.report.fetch_failures,
            start_time.elapsed()
        );

        Ok(self.report)
    }

    /// Handles one completed fetch
    ///
    /// The parsed document lives only inside this call.
    fn process(&mut self, item: WorkItem, result: FetchResult) {
        match result {
            FetchResult::Success { final_url, body, .. } => {
                self.report.pages_fetched += 1;
                if final_url != item.url {
                    tracing::debug!("{} redirected to {}", item.url, final_url);
                }

                let handled = {
                    let page = Page::new(item.url.clone(), final_url, &body);
                    spider::handle(&item, &page, self.subject.as_deref())
                };

                match handled {
                    Ok(output) => self.apply(output),
                    Err(e) => {
                        tracing::warn!("Skipping {} page: {}", item.kind, e);
                        self.report.page_errors += 1;
                        self.skip(Skip::new(
                            item.url.as_str(),
                            item.referrer.as_ref(),
                            SkipReason::MissingElement,
                        ));
                    }
                }
            }
            failure => {
                tracing::warn!("Failed to fetch {}: {}", item.url, failure.describe());
                self.report.fetch_failures += 1;
                self.skip(Skip::new(
                    item.url.as_str(),
                    item.referrer.as_ref(),
                    SkipReason::FetchFailed,
                ));
            }
        }
    }

    /// Exports records and skips, then schedules follow-ups
    fn apply(&mut self, output: HandlerOutput) {
        for record in &output.records {
            match self.sink.emit(record) {
                Ok(()) => self.report.records_emitted += 1,
                Err(e) => tracing::error!("Failed to export {}: {}", record.url(), e),
            }
        }

        for skip in output.skipped {
            self.skip(skip);
        }

        for item in output.follow {
            self.scheduler.enqueue(item);
        }
    }

    fn skip(&mut self, skip: Skip) {
        match self.sink.skip(&skip) {
            Ok(()) => self.report.skips += 1,
            Err(e) => tracing::error!("Failed to record skip of {}: {}", skip.url, e),
        }
    }
}

/// Runs a complete crawl operation
///
/// This is the main entry point for starting a crawl. It will:
/// 1. Resolve the seed from the start parameters
/// 2. Open the export database and start a run
/// 3. Fetch and handle pages until the frontier drains
/// 4. Close the run
/// 5. Write the markdown summary, if `output.summary-path` is set
///
/// # Example
///
/// ```no_run
/// use drivelog::config::load_config_with_hash;
/// use drivelog::crawler::run_crawl;
/// use std::path::Path;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let (config, hash) = load_config_with_hash(Path::new("config.toml"))?;
/// let report = run_crawl(config, &hash).await?;
/// println!("{} records", report.records_emitted);
/// # Ok(())
/// # }
/// ```
pub async fn run_crawl(config: Config, config_hash: &str) -> Result<CrawlReport, DrivelogError> {
    let database_path = config
        .output
        .resolve_database_path(chrono::Utc::now().timestamp());
    let summary_path = config.output.summary_path.clone();

    let report = Coordinator::open(config, config_hash, &database_path)?
        .run()
        .await?;

    if let Some(summary_path) = summary_path {
        let storage = open_storage(&database_path)?;
        let summary = generate_summary(&storage)?;
        generate_markdown_summary(&summary, Path::new(&summary_path))?;
        tracing::info!("Summary written to {}", summary_path);
    }

    Ok(report)
}
