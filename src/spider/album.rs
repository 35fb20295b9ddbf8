//! Photo album listings

use super::links::route_links;
use super::pagination::continue_pagination;
use super::{CrawlContext, HandlerOutput, Page, Record};
use crate::url::PageKind;
use crate::PageError;

const TITLE: &str = "h1.x-title";
const POSTS: &str = "a.c-photo-preview, a.c-pic-card";

/// Emits the album on its first page and follows every photo post in it
pub(super) fn handle(
    page: &Page,
    ctx: &CrawlContext,
    _subject: Option<&str>,
) -> Result<HandlerOutput, PageError> {
    let mut out = HandlerOutput::default();

    if page.is_first_page(ctx) {
        out.records.push(Record::PhotoAlbum {
            url: page.url.clone(),
            title: page.document.select_text(TITLE),
            parent: ctx.parent.clone(),
        });
    }

    route_links(
        page,
        PageKind::PhotoAlbum,
        ctx,
        page.document.links(POSTS),
        &[PageKind::PhotoPost],
        &mut out,
    );
    continue_pagination(page, PageKind::PhotoAlbum, ctx, &mut out);

    Ok(out)
}
