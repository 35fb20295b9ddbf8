//! Scheduler for the crawl frontier and politeness delay
//!
//! This module handles:
//! - The FIFO frontier of work items
//! - The within-run visited set, keyed by URL and context
//! - The minimum delay between two dispatched requests
//! - The optional cap on requests per run

use crate::config::CrawlerConfig;
use crate::spider::{CrawlContext, WorkItem};
use crate::url::visit_key;
use std::collections::{HashSet, VecDeque};
use std::time::Duration;
use tokio::time::Instant;

/// Scheduler manages the frontier queue and dispatch pacing
///
/// The same URL reached under two different contexts is two distinct work
/// items: an album linked from a vehicle and from the profile is fetched
/// under each, so each export carries the right parent. The same URL under
/// the same context is only ever queued once.
pub struct Scheduler {
    /// Work items waiting to be fetched, oldest first
    frontier: VecDeque<WorkItem>,

    /// Everything ever enqueued during this run
    seen: HashSet<(String, CrawlContext)>,

    /// When the last item was handed out
    last_dispatch: Option<Instant>,

    /// How many items have been handed out
    dispatched: u32,

    /// Crawler configuration
    config: CrawlerConfig,
}

impl Scheduler {
    /// Creates a new scheduler with an empty frontier
    pub fn new(config: CrawlerConfig) -> Self {
        Self {
            frontier: VecDeque::new(),
            seen: HashSet::new(),
            last_dispatch: None,
            dispatched: 0,
            config,
        }
    }

    /// Adds a work item to the back of the frontier
    ///
    /// Returns false if an item with the same URL and context was already
    /// enqueued during this run.
    pub fn enqueue(&mut self, item: WorkItem) -> bool {
        let key = (visit_key(&item.url), item.context.clone());
        if !self.seen.insert(key) {
            tracing::trace!("Already seen {} under {:?}", item.url, item.context);
            return false;
        }

        self.frontier.push_back(item);
        true
    }

    /// Whether an item can be handed out right now (ignoring pacing)
    pub fn has_ready(&self) -> bool {
        !self.frontier.is_empty() && !self.budget_exhausted()
    }

    /// Whether the request cap has been reached
    pub fn budget_exhausted(&self) -> bool {
        self.config.max_requests > 0 && self.dispatched >= self.config.max_requests
    }

    /// Hands out the next work item, waiting out the politeness delay
    ///
    /// Returns `None` when the frontier is empty or the request cap has
    /// been reached.
    pub async fn next_item(&mut self) -> Option<WorkItem> {
        if !self.has_ready() {
            return None;
        }

        if let Some(last) = self.last_dispatch {
            let delay = Duration::from_millis(self.config.minimum_time_on_page);
            let ready_at = last + delay;
            if ready_at > Instant::now() {
                tokio::time::sleep_until(ready_at).await;
            }
        }

        let item = self.frontier.pop_front()?;
        self.last_dispatch = Some(Instant::now());
        self.dispatched += 1;

        tracing::debug!("Dispatching {} ({})", item.url, item.kind);
        Some(item)
    }

    /// Returns the number of items in the frontier
    pub fn frontier_size(&self) -> usize {
        self.frontier.len()
    }

    /// Returns whether the frontier is empty
    pub fn is_empty(&self) -> bool {
        self.frontier.is_empty()
    }

    /// Returns how many items have been handed out
    pub fn dispatched(&self) -> u32 {
        self.dispatched
    }
}
