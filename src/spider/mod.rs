//! Crawl routing and context propagation
//!
//! A fetched page arrives as a [`Page`] together with the [`WorkItem`] that
//! requested it. [`handler_for`] picks the handler for the item's kind; the
//! handler extracts at most a few [`Record`]s, routes the links it cares
//! about back through the classifier (each under a freshly propagated
//! [`CrawlContext`]) and looks for a next page. Everything here is
//! synchronous and free of I/O: the caller owns fetching and export.

mod album;
mod blog_post;
mod context;
mod links;
mod logbook;
mod ownership;
mod pagination;
mod photo_post;
mod profile;
mod record;
mod seed;
mod vehicle;

pub use context::{propagate, CrawlContext};
pub use ownership::{declared_author, SUSPICIOUS_TARGET};
pub use pagination::next_page;
pub use record::Record;
pub use seed::{seed, Seed};

use crate::crawler::Document;
use crate::url::{visit_key, PageKind};
use crate::PageError;
use serde::{Deserialize, Serialize};
use std::fmt;
use url::Url;

/// A request to fetch `url` and hand it to the handler for `kind`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct WorkItem {
    pub url: Url,
    pub kind: PageKind,
    pub context: CrawlContext,
    /// The page the link was found on; `None` for the seed
    pub referrer: Option<Url>,
}

/// A fetched page as the handlers see it
#[derive(Debug)]
pub struct Page {
    /// The URL that was scheduled
    pub requested_url: Url,
    /// The URL the response came from, after redirects
    pub url: Url,
    pub document: Document,
}

impl Page {
    pub fn new(requested_url: Url, url: Url, body: &str) -> Self {
        let document = Document::parse(body, url.clone());
        Self {
            requested_url,
            url,
            document,
        }
    }

    /// Whether this page opens the collection `ctx` says it belongs to
    ///
    /// Either end of a redirect counts. A context without an origin has
    /// nothing to continue, so the page is treated as a first page.
    pub fn is_first_page(&self, ctx: &CrawlContext) -> bool {
        match &ctx.origin {
            Some(origin) => {
                let origin = visit_key(origin);
                origin == visit_key(&self.requested_url) || origin == visit_key(&self.url)
            }
            None => true,
        }
    }

    /// The context this page hands to its children and continuations
    ///
    /// On the first page of a collection the origin is re-pinned to the URL
    /// the page was actually served from, which is the URL its own record
    /// carries. Everywhere else the context passes through untouched.
    pub fn anchored(&self, kind: PageKind, ctx: &CrawlContext) -> CrawlContext {
        if kind.is_paginated() && ctx.origin.is_some() && self.is_first_page(ctx) {
            CrawlContext {
                origin: Some(self.url.clone()),
                parent: ctx.parent.clone(),
            }
        } else {
            ctx.clone()
        }
    }
}

/// Why a link or page was dropped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SkipReason {
    /// No classifier rule matched the link
    Unrecognized,
    /// The link leaves the site
    OffSite,
    /// A photo post declared an author other than the subject
    OwnershipMismatch,
    /// A required element was absent from the page
    MissingElement,
    /// The page could not be fetched
    FetchFailed,
}

impl SkipReason {
    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::Unrecognized => "unrecognized",
            Self::OffSite => "off_site",
            Self::OwnershipMismatch => "ownership_mismatch",
            Self::MissingElement => "missing_element",
            Self::FetchFailed => "fetch_failed",
        }
    }

    pub fn from_db_string(s: &str) -> Option<Self> {
        [
            Self::Unrecognized,
            Self::OffSite,
            Self::OwnershipMismatch,
            Self::MissingElement,
            Self::FetchFailed,
        ]
        .into_iter()
        .find(|reason| reason.to_db_string() == s)
    }
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.to_db_string())
    }
}

/// A link or page that produced nothing, and why
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Skip {
    pub url: String,
    pub referrer: Option<String>,
    pub reason: SkipReason,
}

impl Skip {
    pub fn new(url: impl Into<String>, referrer: Option<&Url>, reason: SkipReason) -> Self {
        Self {
            url: url.into(),
            referrer: referrer.map(|r| r.to_string()),
            reason,
        }
    }
}

/// Everything a handler decided about one page
#[derive(Debug, Default)]
pub struct HandlerOutput {
    pub records: Vec<Record>,
    pub follow: Vec<WorkItem>,
    pub skipped: Vec<Skip>,
}

/// A page handler: page, its context and the crawl subject in, decisions out
pub type Handler = fn(&Page, &CrawlContext, Option<&str>) -> Result<HandlerOutput, PageError>;

/// The handler for each fetchable kind
///
/// Photos are emitted inline by the pages that show them and never fetched.
pub fn handler_for(kind: PageKind) -> Option<Handler> {
    match kind {
        PageKind::UserProfile => Some(profile::handle_profile),
        PageKind::UserJournal => Some(profile::handle_journal),
        PageKind::Vehicle => Some(vehicle::handle),
        PageKind::VehicleLogbook => Some(logbook::handle),
        PageKind::PhotoAlbum => Some(album::handle),
        PageKind::PhotoPost => Some(photo_post::handle),
        PageKind::BlogPost => Some(blog_post::handle),
        PageKind::Photo => None,
    }
}

/// Runs the handler for `item` over a fetched page
pub fn handle(
    item: &WorkItem,
    page: &Page,
    subject: Option<&str>,
) -> Result<HandlerOutput, PageError> {
    match handler_for(item.kind) {
        Some(handler) => handler(page, &page.anchored(item.kind, &item.context), subject),
        None => {
            tracing::debug!("No handler for {} at {}", item.kind, item.url);
            Ok(HandlerOutput::default())
        }
    }
}

/// Text of a node the page cannot be handled without
///
/// Only the node's presence is required; blank text yields an empty string.
fn required_text(page: &Page, selector: &'static str) -> Result<String, PageError> {
    if !page.document.exists(selector) {
        return Err(PageError::MissingElement {
            url: page.url.to_string(),
            selector,
        });
    }
    Ok(page.document.select_text(selector).unwrap_or_default())
}

/// Inline photo record under the context a vehicle or post hands to it
fn photo_record(from_kind: PageKind, page: &Page, ctx: &CrawlContext, url: Url) -> Record {
    let ctx = propagate(ctx, from_kind, &page.url, PageKind::Photo, &url);
    Record::Photo {
        url,
        parent: ctx.parent,
        origin: ctx.origin,
    }
}
