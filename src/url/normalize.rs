use url::Url;

/// List of tracking query parameters to remove during normalization
const TRACKING_PARAMS: &[&str] = &[
    "utm_source",
    "utm_medium",
    "utm_campaign",
    "utm_term",
    "utm_content",
    "fbclid",
    "gclid",
    "yclid",
    "from",
    "ref",
];

/// Normalizes a discovered link before it is routed
///
/// # Normalization Steps
///
/// 1. Remove fragment (everything after #)
/// 2. Remove tracking query parameters
/// 3. Sort remaining query parameters alphabetically
/// 4. Remove empty query string (trailing ?)
///
/// The path is left untouched: a trailing slash is part of the shape the
/// classifier matches on. Scheme and host are already lowercased by the
/// parser.
///
/// # Examples
///
/// ```
/// use drivelog::url::normalize_url;
/// use url::Url;
///
/// let url = Url::parse("https://www.drive2.ru/r/bmw/x5/42/?utm_source=x#photos").unwrap();
/// assert_eq!(normalize_url(&url).as_str(), "https://www.drive2.ru/r/bmw/x5/42/");
/// ```
pub fn normalize_url(url: &Url) -> Url {
    let mut url = url.clone();
    url.set_fragment(None);

    if url.query().is_some() {
        let params = filter_and_sort_query_params(&url);

        if params.is_empty() {
            url.set_query(None);
        } else {
            url.query_pairs_mut().clear().extend_pairs(params);
        }
    }

    url
}

/// The key a URL is deduplicated under within one run
pub fn visit_key(url: &Url) -> String {
    normalize_url(url).into()
}

/// Filters out tracking parameters and sorts remaining query parameters
fn filter_and_sort_query_params(url: &Url) -> Vec<(String, String)> {
    let mut params: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(key, _)| !is_tracking_param(key))
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

    params.sort_by(|a, b| a.0.cmp(&b.0));

    params
}

/// Checks if a query parameter is a tracking parameter
fn is_tracking_param(key: &str) -> bool {
    TRACKING_PARAMS.contains(&key) || key.starts_with("utm_")
}
