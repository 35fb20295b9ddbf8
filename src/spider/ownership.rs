//! Guards against wandering into other users' photo posts

use super::{HandlerOutput, Page, Skip, SkipReason};

/// Log target for traversals that left the subject's own content
pub const SUSPICIOUS_TARGET: &str = "drivelog::suspicious";

const AUTHOR_META: &str = "meta[itemprop='author']";
const AUTHOR_LINK: &str = "a.c-username";

/// The author a page declares, if any
pub fn declared_author(page: &Page) -> Option<String> {
    page.document
        .select_attr(AUTHOR_META, "content")
        .or_else(|| page.document.select_text(AUTHOR_LINK))
}

/// Checks the page's declared author against the crawl subject
///
/// Without a subject every page passes. With one, a missing or different
/// author rejects the page: a warning goes to [`SUSPICIOUS_TARGET`] and an
/// ownership skip is recorded in `out`. Returns the declared author when
/// the page passes.
pub(super) fn check(
    page: &Page,
    subject: Option<&str>,
    out: &mut HandlerOutput,
) -> Result<Option<String>, ()> {
    let author = declared_author(page);

    let Some(subject) = subject else {
        return Ok(author);
    };

    match author {
        Some(author) if author.eq_ignore_ascii_case(subject) => Ok(Some(author)),
        other => {
            tracing::warn!(
                target: SUSPICIOUS_TARGET,
                "Suspicious traversal: page {} belongs to {:?}, not {}; skipping",
                page.url,
                other.as_deref().unwrap_or("<unknown>"),
                subject
            );
            out.skipped.push(Skip::new(
                page.url.as_str(),
                None,
                SkipReason::OwnershipMismatch,
            ));
            Err(())
        }
    }
}
