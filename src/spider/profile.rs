//! User profile and personal blog listings

use super::links::route_links;
use super::pagination::continue_pagination;
use super::{CrawlContext, HandlerOutput, Page, Record};
use crate::url::PageKind;
use crate::PageError;

const TITLE: &str = "h1.x-title";
const ABOUT: &str = "div.c-user-card__about";
/// Car and album cards
const CARDS: &str = "a.u-link-area";
const JOURNAL_LINK: &str = "a.c-user-blog-link";
pub(super) const POST_LINKS: &str = "a.c-post-preview__title, h3 a.c-link";

/// Emits the profile on its first page and enters its cars, albums and
/// blog. Later pages of the car list only add follows.
pub(super) fn handle_profile(
    page: &Page,
    ctx: &CrawlContext,
    _subject: Option<&str>,
) -> Result<HandlerOutput, PageError> {
    let mut out = HandlerOutput::default();
    let doc = &page.document;

    if page.is_first_page(ctx) {
        out.records.push(Record::UserProfile {
            url: page.url.clone(),
            title: doc.select_text(TITLE),
            description: doc.select_text(ABOUT),
        });
    }

    let links = doc.links(CARDS).into_iter().chain(doc.links(JOURNAL_LINK));
    route_links(
        page,
        PageKind::UserProfile,
        ctx,
        links,
        &[PageKind::Vehicle, PageKind::PhotoAlbum, PageKind::UserJournal],
        &mut out,
    );
    continue_pagination(page, PageKind::UserProfile, ctx, &mut out);

    Ok(out)
}

/// Emits the personal blog listing and follows its posts
pub(super) fn handle_journal(
    page: &Page,
    ctx: &CrawlContext,
    _subject: Option<&str>,
) -> Result<HandlerOutput, PageError> {
    let mut out = HandlerOutput::default();

    if page.is_first_page(ctx) {
        out.records.push(Record::UserJournal {
            url: page.url.clone(),
            title: page.document.select_text(TITLE),
        });
    }

    route_links(
        page,
        PageKind::UserJournal,
        ctx,
        page.document.links(POST_LINKS),
        &[PageKind::BlogPost],
        &mut out,
    );
    continue_pagination(page, PageKind::UserJournal, ctx, &mut out);

    Ok(out)
}
