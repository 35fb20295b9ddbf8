//! Logbook entries and personal blog posts

use super::{photo_record, required_text, CrawlContext, HandlerOutput, Page, Record};
use crate::url::{normalize_url, PageKind};
use crate::PageError;
use std::collections::HashSet;

const TITLE: &str = "h1.x-title";
const BODY: &str = "div[itemprop='articleBody']";
const BODY_IMAGES: &str = "div[itemprop='articleBody'] img";
const PUBLISHED: &str = "meta[itemprop='datePublished']";
const TAG: &str = "a.c-post-tag";
const COST: &str = ".c-post-meta__cost";
const MILEAGE: &str = ".c-post-meta__mileage";

pub(super) fn handle(
    page: &Page,
    ctx: &CrawlContext,
    _subject: Option<&str>,
) -> Result<HandlerOutput, PageError> {
    let doc = &page.document;
    let title = required_text(page, TITLE)?;

    let mut out = HandlerOutput::default();
    out.records.push(Record::BlogPost {
        url: page.url.clone(),
        title,
        published: doc.select_attr(PUBLISHED, "content"),
        content: doc.select_inner_html(BODY),
        tag: doc.select_text(TAG),
        cost: doc.select_text(COST),
        mileage: doc.select_text(MILEAGE),
        parent: ctx.parent.clone(),
        origin: ctx.origin.clone(),
    });

    let mut seen = HashSet::new();
    for image in doc.sources(BODY_IMAGES) {
        let image = normalize_url(&image);
        if seen.insert(image.to_string()) {
            out.records.push(photo_record(PageKind::BlogPost, page, ctx, image));
        }
    }

    Ok(out)
}
