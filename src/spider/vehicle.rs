//! Vehicle pages

use super::links::route_links;
use super::{photo_record, required_text, CrawlContext, HandlerOutput, Page, Record};
use crate::url::{normalize_url, PageKind};
use crate::PageError;
use std::collections::HashSet;

const TITLE: &str = "h1.x-title";
const DESCRIPTION: &str = "div.c-car-desc__text";
const PUBLISHED: &str = "div.c-car-desc meta[itemprop='datePublished']";
const PHOTOS: &str = "a.c-lightbox-anchor";
/// Logbook and album links in the car's sidebar sections
const SECTION_LINKS: &str = "h3 a.c-link";

/// Emits the vehicle and its inline photos, then descends into its logbook
/// and albums
pub(super) fn handle(
    page: &Page,
    ctx: &CrawlContext,
    _subject: Option<&str>,
) -> Result<HandlerOutput, PageError> {
    let doc = &page.document;
    let title = required_text(page, TITLE)?;

    let mut out = HandlerOutput::default();
    out.records.push(Record::Vehicle {
        url: page.url.clone(),
        title,
        description: doc.select_text(DESCRIPTION),
        published: doc.select_attr(PUBLISHED, "content"),
    });

    let mut seen = HashSet::new();
    for photo in doc.links(PHOTOS) {
        let photo = normalize_url(&photo);
        if seen.insert(photo.to_string()) {
            out.records.push(photo_record(PageKind::Vehicle, page, ctx, photo));
        }
    }

    route_links(
        page,
        PageKind::Vehicle,
        ctx,
        doc.links(SECTION_LINKS),
        &[PageKind::VehicleLogbook, PageKind::PhotoAlbum],
        &mut out,
    );

    Ok(out)
}
