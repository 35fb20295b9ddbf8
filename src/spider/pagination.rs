//! Next-page discovery for paginated collections

use super::{CrawlContext, HandlerOutput, Page, WorkItem};
use crate::url::{normalize_url, visit_key, PageKind};
use url::Url;

/// Matches both the semantic `rel=next` link and the site pager's button
const NEXT_PAGE: &str = "a[rel='next'], a.c-pager__link--next";

/// Finds the next page of the collection `page` belongs to
///
/// Returns `None` when there is no next link, or when it points back at the
/// page itself.
pub fn next_page(page: &Page) -> Option<Url> {
    let next = normalize_url(page.document.links(NEXT_PAGE).first()?);
    let key = visit_key(&next);

    if key == visit_key(&page.url) || key == visit_key(&page.requested_url) {
        tracing::debug!("Next link on {} points to itself", page.url);
        return None;
    }

    Some(next)
}

/// Queues the continuation of a paginated collection, if there is one
///
/// The continuation is handled by the same kind under the very same
/// context, so every page of the collection keeps the first page as origin.
pub(super) fn continue_pagination(
    page: &Page,
    kind: PageKind,
    ctx: &CrawlContext,
    out: &mut HandlerOutput,
) {
    if let Some(url) = next_page(page) {
        tracing::debug!("Continuing {} at {}", kind, url);
        out.follow.push(WorkItem {
            url,
            kind,
            context: ctx.clone(),
            referrer: Some(page.url.clone()),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spider::test_support::page;

    #[test]
    fn test_rel_next() {
        let p = page(
            "https://www.drive2.ru/s/a/Abc",
            r#"<a rel="next" href="?page=2">next</a>"#,
        );
        assert_eq!(
            next_page(&p).map(String::from),
            Some("https://www.drive2.ru/s/a/Abc?page=2".to_string())
        );
    }

    #[test]
    fn test_pager_button() {
        let p = page(
            "https://www.drive2.ru/r/bmw/x5/1/logbook",
            r#"<div class="c-pager"><a class="c-pager__link c-pager__link--next" href="/r/bmw/x5/1/logbook?page=2">&rarr;</a></div>"#,
        );
        assert!(next_page(&p).is_some());
    }

    #[test]
    fn test_no_next_link() {
        let p = page("https://www.drive2.ru/s/a/Abc", r#"<a href="?page=2">2</a>"#);
        assert_eq!(next_page(&p), None);
    }

    #[test]
    fn test_self_link_is_ignored() {
        let p = page(
            "https://www.drive2.ru/s/a/Abc?page=3",
            r##"<a rel="next" href="?page=3#photos">next</a>"##,
        );
        assert_eq!(next_page(&p), None);
    }

    #[test]
    fn test_continuation_keeps_context_and_kind() {
        let p = page(
            "https://www.drive2.ru/s/a/Abc?page=2",
            r#"<a rel="next" href="?page=3">next</a>"#,
        );
        let ctx = CrawlContext {
            origin: Some(Url::parse("https://www.drive2.ru/s/a/Abc").unwrap()),
            parent: None,
        };
        let mut out = HandlerOutput::default();
        continue_pagination(&p, PageKind::PhotoAlbum, &ctx, &mut out);

        assert_eq!(out.follow.len(), 1);
        assert_eq!(out.follow[0].kind, PageKind::PhotoAlbum);
        assert_eq!(out.follow[0].context, ctx);
    }
}
