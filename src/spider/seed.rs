//! Turning the crawl start parameters into the first work item

use super::{CrawlContext, WorkItem};
use crate::config::{validate_username, Config};
use crate::url::classify;
use crate::ConfigError;
use url::Url;

/// The first work item of a crawl, plus the subject it is scoped to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Seed {
    pub item: WorkItem,
    pub subject: Option<String>,
}

/// Builds the seed from `[start]`
///
/// A start URL wins and picks the first handler by its shape; the username,
/// if also given, then only scopes the ownership guard. A lone username
/// seeds the user's profile. With neither there is nothing to crawl.
///
/// # Example
///
/// ```
/// use drivelog::spider::seed;
/// use drivelog::{Config, PageKind};
///
/// let mut config = Config::default();
/// config.start.username = Some("alice".to_string());
///
/// let seed = seed(&config).unwrap();
/// assert_eq!(seed.item.url.as_str(), "https://www.drive2.ru/users/alice/");
/// assert_eq!(seed.item.kind, PageKind::UserProfile);
/// ```
pub fn seed(config: &Config) -> Result<Seed, ConfigError> {
    let username = config.start.username.as_deref().filter(|u| !u.is_empty());
    if let Some(username) = username {
        validate_username(username)?;
    }

    let url = match (config.start.start_url.as_deref(), username) {
        (Some(start_url), _) => Url::parse(start_url)
            .map_err(|e| ConfigError::InvalidUrl(format!("start-url {}: {}", start_url, e)))?,
        (None, Some(username)) => profile_url(config, username)?,
        (None, None) => return Err(ConfigError::MissingSeed),
    };

    let kind = classify(&url).ok_or_else(|| ConfigError::UnroutableStart(url.to_string()))?;

    Ok(Seed {
        item: WorkItem {
            context: CrawlContext::entering(kind, &url),
            url,
            kind,
            referrer: None,
        },
        subject: username.map(str::to_string),
    })
}

fn profile_url(config: &Config, username: &str) -> Result<Url, ConfigError> {
    let base = Url::parse(&config.site.base_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("base-url: {}", e)))?;
    let path = config.site.profile_path.replace("{username}", username);

    base.join(&path)
        .map_err(|e| ConfigError::InvalidUrl(format!("profile path {}: {}", path, e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::url::PageKind;

    fn config(username: Option<&str>, start_url: Option<&str>) -> Config {
        let mut config = Config::default();
        config.start.username = username.map(String::from);
        config.start.start_url = start_url.map(String::from);
        config
    }

    #[test]
    fn test_username_seeds_profile() {
        let seed = seed(&config(Some("alice"), None)).unwrap();
        assert_eq!(seed.item.kind, PageKind::UserProfile);
        assert_eq!(seed.item.url.as_str(), "https://www.drive2.ru/users/alice/");
        assert_eq!(seed.item.context.origin, Some(seed.item.url.clone()));
        assert_eq!(seed.subject.as_deref(), Some("alice"));
    }

    #[test]
    fn test_custom_site() {
        let mut c = config(Some("alice"), None);
        c.site.base_url = "http://127.0.0.1:8080/".to_string();
        c.site.profile_path = "/users/{username}/".to_string();
        let seed = seed(&c).unwrap();
        assert_eq!(seed.item.url.as_str(), "http://127.0.0.1:8080/users/alice/");
    }

    #[test]
    fn test_start_url_picks_handler() {
        let seed = seed(&config(Some("alice"), Some("https://www.drive2.ru/r/bmw/x5/1/"))).unwrap();
        assert_eq!(seed.item.kind, PageKind::Vehicle);
        assert_eq!(seed.item.context, CrawlContext::root());
        assert_eq!(seed.subject.as_deref(), Some("alice"));
    }

    #[test]
    fn test_start_url_without_subject() {
        let seed = seed(&config(None, Some("https://www.drive2.ru/s/a/Alb1"))).unwrap();
        assert_eq!(seed.item.kind, PageKind::PhotoAlbum);
        assert_eq!(seed.subject, None);
    }

    #[test]
    fn test_missing_seed() {
        assert!(matches!(seed(&config(None, None)), Err(ConfigError::MissingSeed)));
        assert!(matches!(seed(&config(Some(""), None)), Err(ConfigError::MissingSeed)));
    }

    #[test]
    fn test_unroutable_start() {
        assert!(matches!(
            seed(&config(None, Some("https://www.drive2.ru/about/"))),
            Err(ConfigError::UnroutableStart(_))
        ));
    }

    #[test]
    fn test_invalid_username() {
        assert!(matches!(
            seed(&config(Some("alice/../bob"), None)),
            Err(ConfigError::Validation(_))
        ));
    }
}
