use url::Url;

/// Extracts the domain from a URL
///
/// This function retrieves the host portion of a URL and converts it to lowercase.
/// If the URL has no host, it returns None.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use drivelog::url::extract_domain;
///
/// let url = Url::parse("https://WWW.DRIVE2.RU/r/bmw/x5/1/").unwrap();
/// assert_eq!(extract_domain(&url), Some("www.drive2.ru".to_string()));
/// ```
pub fn extract_domain(url: &Url) -> Option<String> {
    url.host_str().map(|h| h.to_lowercase())
}

/// The host with any leading `www.` removed
fn site_host(url: &Url) -> Option<String> {
    extract_domain(url).map(|h| match h.strip_prefix("www.") {
        Some(bare) => bare.to_string(),
        None => h,
    })
}

/// Returns true if both URLs live on the same site
///
/// `drive2.ru` and `www.drive2.ru` are one site, and so are its `http` and
/// `https` pages. Explicit non-default ports must agree.
///
/// Links leaving the site are never routed, whatever their path looks like.
pub fn same_site(a: &Url, b: &Url) -> bool {
    match (site_host(a), site_host(b)) {
        (Some(x), Some(y)) => x == y && a.port() == b.port(),
        _ => false,
    }
}
