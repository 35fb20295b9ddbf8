//! Routing discovered links back through the classifier

use super::{propagate, CrawlContext, HandlerOutput, Page, Skip, SkipReason, WorkItem};
use crate::url::{classify, normalize_url, same_site, PageKind};
use std::collections::HashSet;
use url::Url;

/// Turns the links found on `page` into work items
///
/// Each link is normalized, checked against the page's host and classified.
/// Links of a kind in `follows` become work items under the context
/// [`propagate`] computes for them; unrecognized and off-site links are
/// recorded as skips. A link appearing twice on one page is routed once.
pub(super) fn route_links(
    page: &Page,
    from_kind: PageKind,
    ctx: &CrawlContext,
    links: impl IntoIterator<Item = Url>,
    follows: &[PageKind],
    out: &mut HandlerOutput,
) {
    let mut seen = HashSet::new();

    for link in links {
        let link = normalize_url(&link);
        if !seen.insert(link.to_string()) {
            continue;
        }

        if !same_site(&link, &page.url) {
            tracing::debug!("Skipping off-site link {} on {}", link, page.url);
            out.skipped.push(Skip::new(link, Some(&page.url), SkipReason::OffSite));
            continue;
        }

        match classify(&link) {
            None => {
                tracing::warn!("Unrecognized link {} on {}", link, page.url);
                out.skipped.push(Skip::new(link, Some(&page.url), SkipReason::Unrecognized));
            }
            Some(kind) if !follows.contains(&kind) => {
                tracing::debug!("Not following {} link {} from {}", kind, link, from_kind);
            }
            Some(kind) => {
                let context = propagate(ctx, from_kind, &page.url, kind, &link);
                out.follow.push(WorkItem {
                    url: link,
                    kind,
                    context,
                    referrer: Some(page.url.clone()),
                });
            }
        }
    }
}
