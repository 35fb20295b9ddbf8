//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building HTTP clients with proper user agent strings
//! - GET requests following up to ten redirects
//! - Retry logic for transient failures
//! - Error classification

use crate::config::UserAgentConfig;
use reqwest::{redirect::Policy, Client, StatusCode};
use std::time::Duration;
use url::Url;

/// Maximum redirect hops followed for one request
const MAX_REDIRECTS: usize = 10;

/// Result of a fetch operation
#[derive(Debug)]
pub enum FetchResult {
    /// Successfully fetched the page
    Success {
        /// Final URL after redirects
        final_url: Url,
        /// HTTP status code
        status_code: u16,
        /// Content-Type header value
        content_type: String,
        /// Page body content
        body: String,
    },

    /// Page is not HTML (Content-Type mismatch)
    ContentMismatch {
        /// The actual Content-Type received
        content_type: String,
    },

    /// Non-success HTTP status
    HttpError {
        /// The HTTP status code
        status_code: u16,
    },

    /// Network error (connection refused, timeout, redirect loop, etc.)
    NetworkError {
        /// Error description
        error: String,
        /// Whether a retry may succeed
        transient: bool,
    },
}

impl FetchResult {
    /// Whether the failure is worth another attempt
    ///
    /// Server errors and timeouts are; client errors, content mismatches
    /// and hard network failures are not.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::HttpError { status_code } => *status_code >= 500,
            Self::NetworkError { transient, .. } => *transient,
            Self::Success { .. } | Self::ContentMismatch { .. } => false,
        }
    }

    /// Short description of a failed fetch, for logs
    pub fn describe(&self) -> String {
        match self {
            Self::Success { status_code, .. } => format!("HTTP {}", status_code),
            Self::ContentMismatch { content_type } => {
                format!("not HTML (content type {:?})", content_type)
            }
            Self::HttpError { status_code } => format!("HTTP {}", status_code),
            Self::NetworkError { error, .. } => error.clone(),
        }
    }
}

/// Builds an HTTP client with proper configuration
///
/// # Example
///
/// ```no_run
/// use drivelog::config::UserAgentConfig;
/// use drivelog::crawler::build_http_client;
///
/// let client = build_http_client(&UserAgentConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &UserAgentConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.header_value())
        .timeout(Duration::from_secs(30))
        .connect_timeout(Duration::from_secs(10))
        .redirect(Policy::limited(MAX_REDIRECTS))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches a URL once
///
/// Only `text/html` and XHTML responses count as pages; anything else is a
/// content mismatch.
pub async fn fetch_url(client: &Client, url: &Url) -> FetchResult {
    let response = match client.get(url.clone()).send().await {
        Ok(response) => response,
        Err(e) => return classify_error(&e),
    };

    let status = response.status();
    let final_url = response.url().clone();

    if !status.is_success() {
        if status == StatusCode::TOO_MANY_REQUESTS {
            tracing::warn!("Rate limited by {}", url);
        }
        return FetchResult::HttpError {
            status_code: status.as_u16(),
        };
    }

    let content_type = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string();

    if !is_html(&content_type) {
        return FetchResult::ContentMismatch { content_type };
    }

    match response.text().await {
        Ok(body) => FetchResult::Success {
            final_url,
            status_code: status.as_u16(),
            content_type,
            body,
        },
        Err(e) => classify_error(&e),
    }
}

/// Fetches a URL, retrying transient failures
///
/// # Retry Logic
///
/// | Condition | Action |
/// |-----------|--------|
/// | HTTP 5xx | Retry up to `max_retries` times, `retry_delay` apart |
/// | Timeout | Retry up to `max_retries` times, `retry_delay` apart |
/// | HTTP 4xx | Give up immediately |
/// | Connection refused, TLS, redirect loop | Give up immediately |
pub async fn fetch_with_retry(
    client: &Client,
    url: &Url,
    max_retries: u32,
    retry_delay: Duration,
) -> FetchResult {
    let mut attempt = 0;
    loop {
        let result = fetch_url(client, url).await;
        if !result.is_transient() || attempt >= max_retries {
            return result;
        }

        attempt += 1;
        tracing::debug!(
            "Fetch of {} failed ({}), retry {}/{} in {:?}",
            url,
            result.describe(),
            attempt,
            max_retries,
            retry_delay
        );
        tokio::time::sleep(retry_delay).await;
    }
}

fn is_html(content_type: &str) -> bool {
    let mime = content_type
        .split(';')
        .next()
        .unwrap_or("")
        .trim()
        .to_ascii_lowercase();
    mime == "text/html" || mime == "application/xhtml+xml"
}

fn classify_error(e: &reqwest::Error) -> FetchResult {
    if e.is_timeout() {
        FetchResult::NetworkError {
            error: "Request timeout".to_string(),
            transient: true,
        }
    } else if e.is_redirect() {
        FetchResult::NetworkError {
            error: format!("Redirect error: {}", e),
            transient: false,
        }
    } else if e.is_connect() {
        FetchResult::NetworkError {
            error: "Connection refused".to_string(),
            transient: false,
        }
    } else {
        FetchResult::NetworkError {
            error: e.to_string(),
            transient: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client() -> Client {
        build_http_client(&UserAgentConfig::default()).unwrap()
    }

    fn html(body: &str) -> ResponseTemplate {
        ResponseTemplate::new(200)
            .set_body_raw(body.as_bytes().to_vec(), "text/html; charset=utf-8")
    }

    #[test]
    fn test_build_http_client() {
        assert!(build_http_client(&UserAgentConfig::default()).is_ok());
    }

    #[test]
    fn test_is_html() {
        assert!(is_html("text/html"));
        assert!(is_html("text/html; charset=utf-8"));
        assert!(is_html("application/xhtml+xml"));
        assert!(is_html("TEXT/HTML"));
        assert!(!is_html("image/jpeg"));
        assert!(!is_html(""));
    }

    #[test]
    fn test_transient_classification() {
        assert!(FetchResult::HttpError { status_code: 503 }.is_transient());
        assert!(!FetchResult::HttpError { status_code: 404 }.is_transient());
        assert!(!FetchResult::ContentMismatch {
            content_type: "image/png".to_string()
        }
        .is_transient());
    }

    #[tokio::test]
    async fn test_fetch_success() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/users/alice/"))
            .respond_with(html("<h1>alice</h1>"))
            .mount(&server)
            .await;

        let url = Url::parse(&format!("{}/users/alice/", server.uri())).unwrap();
        match fetch_url(&client(), &url).await {
            FetchResult::Success { final_url, body, .. } => {
                assert_eq!(final_url, url);
                assert!(body.contains("alice"));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_fetch_follows_redirect() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/s/a/Old"))
            .respond_with(
                ResponseTemplate::new(301).insert_header("Location", "/s/a/New"),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/s/a/New"))
            .respond_with(html("<p>album</p>"))
            .mount(&server)
            .await;

        let url = Url::parse(&format!("{}/s/a/Old", server.uri())).unwrap();
        match fetch_url(&client(), &url).await {
            FetchResult::Success { final_url, .. } => assert_eq!(final_url.path(), "/s/a/New"),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_fetch_content_mismatch() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(vec![0u8; 4], "image/jpeg"))
            .mount(&server)
            .await;

        let url = Url::parse(&format!("{}/pic.jpg", server.uri())).unwrap();
        assert!(matches!(
            fetch_url(&client(), &url).await,
            FetchResult::ContentMismatch { .. }
        ));
    }

    #[tokio::test]
    async fn test_retry_gives_up_after_max_retries() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .expect(3)
            .mount(&server)
            .await;

        let url = Url::parse(&format!("{}/l/1/", server.uri())).unwrap();
        let result = fetch_with_retry(&client(), &url, 2, Duration::from_millis(10)).await;
        assert!(matches!(result, FetchResult::HttpError { status_code: 503 }));
    }

    #[tokio::test]
    async fn test_no_retry_on_404() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .expect(1)
            .mount(&server)
            .await;

        let url = Url::parse(&format!("{}/l/1/", server.uri())).unwrap();
        let result = fetch_with_retry(&client(), &url, 3, Duration::from_millis(10)).await;
        assert!(matches!(result, FetchResult::HttpError { status_code: 404 }));
    }
}
