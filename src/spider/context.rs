//! Crawl context and how it flows from one page to the next

use crate::url::PageKind;
use serde::{Deserialize, Serialize};
use url::Url;

/// Where a page sits in the site hierarchy
///
/// `origin` is the first page of the paginated collection the page belongs
/// to; `parent` is the vehicle that owns it. Contexts are values: every
/// child gets a freshly computed one and nothing ever mutates a context in
/// place.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CrawlContext {
    pub origin: Option<Url>,
    pub parent: Option<Url>,
}

impl CrawlContext {
    /// The empty context a crawl starts from
    pub fn root() -> Self {
        Self::default()
    }

    /// The context a seed page of `kind` is handled under
    pub fn entering(kind: PageKind, url: &Url) -> Self {
        Self {
            origin: kind.is_paginated().then(|| url.clone()),
            parent: None,
        }
    }
}

/// Computes the context a link from `from_url` to `to_url` is followed under
///
/// Rules, in order:
///
/// * Same kind on both ends is a pagination step; the context is unchanged.
/// * A listing (profile, journal) handing off to a vehicle or album starts
///   a fresh context rooted at that entity.
/// * Otherwise the parent becomes `from_url` when a vehicle links to
///   something it owns, and the origin becomes `to_url` when the target is
///   a paginated collection. Anything not overridden is inherited.
///
/// # Example
///
/// ```
/// use drivelog::spider::{propagate, CrawlContext};
/// use drivelog::PageKind;
/// use url::Url;
///
/// let car = Url::parse("https://www.drive2.ru/r/bmw/x5/42/").unwrap();
/// let album = Url::parse("https://www.drive2.ru/s/a/Abc").unwrap();
///
/// let root = CrawlContext::root();
/// let ctx = propagate(&root, PageKind::Vehicle, &car, PageKind::PhotoAlbum, &album);
/// assert_eq!(ctx.parent.as_ref(), Some(&car));
/// assert_eq!(ctx.origin.as_ref(), Some(&album));
/// ```
pub fn propagate(
    current: &CrawlContext,
    from_kind: PageKind,
    from_url: &Url,
    to_kind: PageKind,
    to_url: &Url,
) -> CrawlContext {
    if from_kind == to_kind {
        return current.clone();
    }

    if from_kind.is_listing() && to_kind.is_owning_entity() {
        return CrawlContext::entering(to_kind, to_url);
    }

    let parent = if from_kind == PageKind::Vehicle && to_kind.is_owned_by_vehicle() {
        Some(from_url.clone())
    } else {
        current.parent.clone()
    };

    let origin = if to_kind.is_paginated() {
        Some(to_url.clone())
    } else {
        current.origin.clone()
    };

    CrawlContext { origin, parent }
}
