//! Single-photo posts
//!
//! These are the only pages reachable from content the subject does not
//! necessarily own (albums aggregate other users' shots), so they go
//! through the ownership guard before anything is emitted.

use super::ownership;
use super::{photo_record, CrawlContext, HandlerOutput, Page, Record};
use crate::url::{normalize_url, PageKind};
use crate::PageError;

const DESCRIPTION: &str = "div.c-post-desc";
const PUBLISHED: &str = "meta[itemprop='datePublished']";
const IMAGE: &str = "img[itemprop='image']";
const LIGHTBOX: &str = "a.c-lightbox-anchor";

pub(super) fn handle(
    page: &Page,
    ctx: &CrawlContext,
    subject: Option<&str>,
) -> Result<HandlerOutput, PageError> {
    let mut out = HandlerOutput::default();

    let Ok(author) = ownership::check(page, subject, &mut out) else {
        return Ok(out);
    };

    let doc = &page.document;
    out.records.push(Record::PhotoPost {
        url: page.url.clone(),
        description: doc.select_text(DESCRIPTION),
        published: doc.select_attr(PUBLISHED, "content"),
        author,
        parent: ctx.parent.clone(),
        origin: ctx.origin.clone(),
    });

    let image = doc
        .sources(IMAGE)
        .into_iter()
        .next()
        .or_else(|| doc.links(LIGHTBOX).into_iter().next());
    if let Some(image) = image {
        out.records.push(photo_record(
            PageKind::PhotoPost,
            page,
            ctx,
            normalize_url(&image),
        ));
    }

    Ok(out)
}
