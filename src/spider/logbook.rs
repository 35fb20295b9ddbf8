//! Vehicle logbook listings

use super::links::route_links;
use super::pagination::continue_pagination;
use super::profile::POST_LINKS;
use super::{CrawlContext, HandlerOutput, Page, Record};
use crate::url::PageKind;
use crate::PageError;

const TITLE: &str = "h1.x-title";

/// Emits the logbook under its vehicle and follows its entries
///
/// Entries found on later pages still get the logbook's first page as
/// origin, since continuations share the context.
pub(super) fn handle(
    page: &Page,
    ctx: &CrawlContext,
    _subject: Option<&str>,
) -> Result<HandlerOutput, PageError> {
    let mut out = HandlerOutput::default();

    if page.is_first_page(ctx) {
        out.records.push(Record::VehicleLogbook {
            url: page.url.clone(),
            title: page.document.select_text(TITLE),
            parent: ctx.parent.clone(),
        });
    }

    route_links(
        page,
        PageKind::VehicleLogbook,
        ctx,
        page.document.links(POST_LINKS),
        &[PageKind::BlogPost],
        &mut out,
    );
    continue_pagination(page, PageKind::VehicleLogbook, ctx, &mut out);

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spider::test_support::{follows_of, page, url};

    const LOGBOOK: &str = "https://www.drive2.ru/r/bmw/x5/1/logbook";

    fn ctx() -> CrawlContext {
        CrawlContext {
            origin: Some(url(LOGBOOK)),
            parent: Some(url("https://www.drive2.ru/r/bmw/x5/1/")),
        }
    }

    #[test]
    fn test_logbook_first_page() {
        let p = page(
            LOGBOOK,
            r#"
            <h1 class="x-title">Logbook BMW X5</h1>
            <a class="c-post-preview__title" href="/l/501/">Oil</a>
            <a class="c-post-preview__title" href="/l/502/">Brakes</a>
            <a class="c-pager__link--next" href="?page=2">next</a>
            "#,
        );
        let out = handle(&p, &ctx(), None).unwrap();

        assert_eq!(
            out.records,
            vec![Record::VehicleLogbook {
                url: url(LOGBOOK),
                title: Some("Logbook BMW X5".to_string()),
                parent: Some(url("https://www.drive2.ru/r/bmw/x5/1/")),
            }]
        );

        let posts = follows_of(&out, PageKind::BlogPost);
        assert_eq!(posts.len(), 2);
        assert!(posts.iter().all(|w| w.context == ctx()));

        let next = follows_of(&out, PageKind::VehicleLogbook);
        assert_eq!(next.len(), 1);
        assert_eq!(next[0].url.as_str(), "https://www.drive2.ru/r/bmw/x5/1/logbook?page=2");
    }

    #[test]
    fn test_logbook_continuation_emits_no_summary() {
        let p = page(
            "https://www.drive2.ru/r/bmw/x5/1/logbook?page=2",
            r#"<a class="c-post-preview__title" href="/l/503/">Tyres</a>"#,
        );
        let out = handle(&p, &ctx(), None).unwrap();
        assert!(out.records.is_empty());
        assert_eq!(out.follow.len(), 1);
    }
}
