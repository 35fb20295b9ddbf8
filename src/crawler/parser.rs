//! HTML document wrapper used by the page handlers
//!
//! Handlers never touch `scraper` directly. They ask a [`Document`] for the
//! text, attribute or inner HTML of the first (or every) node matching a CSS
//! selector, and for hrefs resolved against the page URL.

use scraper::{ElementRef, Html, Selector};
use url::Url;

/// A parsed HTML page together with the URL relative links resolve against
pub struct Document {
    html: Html,
    base_url: Url,
}

impl std::fmt::Debug for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Document")
            .field("base_url", &self.base_url.as_str())
            .finish_non_exhaustive()
    }
}

impl Document {
    /// Parses an HTML body
    ///
    /// # Example
    ///
    /// ```
    /// use drivelog::crawler::Document;
    /// use url::Url;
    ///
    /// let html = r#"<html><body><h1 class="x-title"> BMW X5 </h1><a href="/s/a/Abc">Album</a></body></html>"#;
    /// let doc = Document::parse(html, Url::parse("https://www.drive2.ru/r/bmw/x5/1/").unwrap());
    /// assert_eq!(doc.select_text("h1.x-title"), Some("BMW X5".to_string()));
    /// assert_eq!(doc.links("a")[0].as_str(), "https://www.drive2.ru/s/a/Abc");
    /// ```
    pub fn parse(body: &str, base_url: Url) -> Self {
        Self {
            html: Html::parse_document(body),
            base_url,
        }
    }

    /// The URL relative links are resolved against
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Returns true if at least one node matches
    pub fn exists(&self, selector: &str) -> bool {
        self.first(selector).is_some()
    }

    /// Trimmed text of the first matching node, `None` when absent or blank
    pub fn select_text(&self, selector: &str) -> Option<String> {
        self.first(selector)
            .map(|element| element_text(&element))
            .filter(|text| !text.is_empty())
    }

    /// Value of `attr` on the first matching node that carries it
    pub fn select_attr(&self, selector: &str, attr: &str) -> Option<String> {
        self.select_all_attr(selector, attr).into_iter().next()
    }

    /// Non-blank values of `attr` across every matching node
    pub fn select_all_attr(&self, selector: &str, attr: &str) -> Vec<String> {
        self.all(selector)
            .iter()
            .filter_map(|element| element.value().attr(attr))
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .collect()
    }

    /// Inner HTML of the first matching node
    pub fn select_inner_html(&self, selector: &str) -> Option<String> {
        self.first(selector)
            .map(|element| element.inner_html().trim().to_string())
            .filter(|html| !html.is_empty())
    }

    /// Absolute URLs of the `href` of every matching node, in document order
    pub fn links(&self, selector: &str) -> Vec<Url> {
        self.resolve_all(self.select_all_attr(selector, "href"))
    }

    /// Absolute URLs of the `src` of every matching node, in document order
    pub fn sources(&self, selector: &str) -> Vec<Url> {
        self.resolve_all(self.select_all_attr(selector, "src"))
    }

    /// Resolves an href against the base URL
    pub fn resolve(&self, href: &str) -> Option<Url> {
        resolve_link(href, &self.base_url)
    }

    fn resolve_all(&self, hrefs: Vec<String>) -> Vec<Url> {
        hrefs.iter().filter_map(|href| self.resolve(href)).collect()
    }

    fn first(&self, selector: &str) -> Option<ElementRef<'_>> {
        let selector = compile(selector)?;
        self.html.select(&selector).next()
    }

    fn all(&self, selector: &str) -> Vec<ElementRef<'_>> {
        match compile(selector) {
            Some(selector) => self.html.select(&selector).collect(),
            None => Vec::new(),
        }
    }
}

fn compile(selector: &str) -> Option<Selector> {
    match Selector::parse(selector) {
        Ok(selector) => Some(selector),
        Err(e) => {
            tracing::warn!("Invalid CSS selector {:?}: {}", selector, e);
            None
        }
    }
}

/// Collapses the text content of an element into single-spaced words
fn element_text(element: &ElementRef<'_>) -> String {
    element
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Resolves a link href to an absolute URL and validates it
///
/// Returns None if the link should be excluded:
/// - javascript:, mailto:, tel: schemes
/// - data: URIs
/// - fragment-only links
/// - Invalid URLs
/// - Non-HTTP(S) URLs after resolution
fn resolve_link(href: &str, base_url: &Url) -> Option<Url> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    if ["javascript:", "mailto:", "tel:", "data:"]
        .iter()
        .any(|scheme| href.starts_with(scheme))
    {
        return None;
    }

    let absolute_url = base_url.join(href).ok()?;
    match absolute_url.scheme() {
        "http" | "https" => Some(absolute_url),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(html: &str) -> Document {
        Document::parse(
            html,
            Url::parse("https://www.drive2.ru/r/bmw/x5/42/").unwrap(),
        )
    }

    #[test]
    fn test_select_text_trims_and_collapses() {
        let d = doc(r#"<h1 class="x-title">  BMW   X5 <small>E53</small> </h1>"#);
        assert_eq!(d.select_text("h1.x-title"), Some("BMW X5 E53".to_string()));
    }

    #[test]
    fn test_select_text_missing_or_blank() {
        let d = doc(r#"<h1 class="x-title">   </h1>"#);
        assert!(d.exists("h1.x-title"));
        assert_eq!(d.select_text("h1.x-title"), None);
        assert_eq!(d.select_text("div.nope"), None);
    }

    #[test]
    fn test_select_attr_skips_nodes_without_attr() {
        let d = doc(
            r#"<meta itemprop="author"><meta itemprop="author" content=" alice ">"#,
        );
        assert_eq!(
            d.select_attr("meta[itemprop='author']", "content"),
            Some("alice".to_string())
        );
    }

    #[test]
    fn test_select_inner_html() {
        let d = doc(r#"<div itemprop="articleBody"> <p>Oil <b>change</b></p> </div>"#);
        assert_eq!(
            d.select_inner_html("div[itemprop='articleBody']"),
            Some("<p>Oil <b>change</b></p>".to_string())
        );
    }

    #[test]
    fn test_links_resolve_relative() {
        let d = doc(
            r#"<a class="c-link" href="logbook">Log</a><a class="c-link" href="/s/a/Abc">Album</a>"#,
        );
        let links: Vec<String> = d.links("a.c-link").into_iter().map(String::from).collect();
        assert_eq!(
            links,
            vec![
                "https://www.drive2.ru/r/bmw/x5/42/logbook",
                "https://www.drive2.ru/s/a/Abc",
            ]
        );
    }

    #[test]
    fn test_links_skip_special_schemes() {
        let d = doc(
            r##"
            <a href="javascript:void(0)">js</a>
            <a href="mailto:a@b.c">mail</a>
            <a href="tel:+100">tel</a>
            <a href="data:text/html,x">data</a>
            <a href="#top">frag</a>
            <a href="ftp://files.example.com/x">ftp</a>
            <a href="/l/1/">ok</a>
            "##,
        );
        let links = d.links("a");
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].as_str(), "https://www.drive2.ru/l/1/");
    }

    #[test]
    fn test_sources() {
        let d = doc(r#"<img src="https://img.drive2.ru/1.jpg"><img src=""><img>"#);
        let sources = d.sources("img");
        assert_eq!(sources.len(), 1);
        assert_eq!(sources[0].as_str(), "https://img.drive2.ru/1.jpg");
    }

    #[test]
    fn test_invalid_selector_yields_nothing() {
        let d = doc(r#"<p>text</p>"#);
        assert!(!d.exists("p[["));
        assert_eq!(d.select_text("p[["), None);
        assert!(d.links("p[[").is_empty());
    }
}
