// src/checker/http.rs
// =============================================================================
// Optional live check for external links.
//
// The offline pipeline only checks that an external URL is well-formed. When
// asked to, this module goes one step further and requests every distinct
// http(s) URL that passed the offline check:
// - Makes HTTP HEAD requests (lightweight, no body download)
// - Falls back to GET when the server refuses HEAD
// - Detects various failure modes (404, timeout, SSL errors, etc.)
// - Runs checks concurrently, at most `concurrency` at a time
//
// Outcomes are merged back into the results by URL, so the order in which
// responses arrive does not matter. A link that fails here is demoted to
// invalid with the HTTP explanation as its error.
// =============================================================================

use crate::error::Result;
use crate::model::{LinkCategory, ValidationResult};
use futures::stream::{self, StreamExt}; // StreamExt gives us .buffer_unordered()
use reqwest::{Client, StatusCode};
use std::collections::{BTreeSet, HashMap};
use std::time::Duration;
use tracing::{debug, info};

/// Status of a link after a live request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkStatus {
    /// Link is working (2xx)
    Ok,
    /// Link redirects to another URL (3xx that was not followed)
    Redirect { location: String },
    /// Link is broken (404, 410)
    Broken,
    /// Request timed out
    Timeout,
    /// SSL/TLS certificate error
    SslError,
    /// Too many redirects (redirect loop)
    TooManyRedirects,
    /// Could not resolve hostname
    DnsError,
    /// Other error (5xx, connection refused, ...)
    Error,
}

/// Result of requesting a single URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkCheckResult {
    pub url: String,
    pub status: LinkStatus,
    pub message: String,
}

impl LinkCheckResult {
    /// Ok and Redirect both count as reachable
    pub fn is_ok(&self) -> bool {
        matches!(self.status, LinkStatus::Ok | LinkStatus::Redirect { .. })
    }
}

/// Requests every distinct external http(s) URL among the currently valid,
/// non-skipped results and demotes the ones that turn out unreachable.
///
/// Returns how many results were demoted.
pub async fn recheck_external<'a, I>(results: I, concurrency: usize) -> Result<usize>
where
    I: IntoIterator<Item = &'a mut ValidationResult>,
{
    let mut checkable: Vec<&mut ValidationResult> =
        results.into_iter().filter(|r| is_live_checkable(r)).collect();
    let urls: BTreeSet<String> = checkable.iter().map(|r| r.url().trim().to_string()).collect();

    if urls.is_empty() {
        return Ok(0);
    }

    info!(count = urls.len(), "checking external links over the network");
    let outcomes = check_links(urls.into_iter().collect(), concurrency).await?;

    let mut demoted = 0;
    for result in checkable.iter_mut() {
        let Some(outcome) = outcomes.get(result.url().trim()) else {
            continue;
        };

        if outcome.is_ok() {
            let target = match result.resolved_target() {
                Some(target) => format!("{} ({})", target, outcome.message),
                None => outcome.message.clone(),
            };
            result.set_resolved_target(target);
        } else {
            debug!(url = %outcome.url, message = %outcome.message, "external link unreachable");
            result.demote(format!("Unreachable: {}", outcome.message));
            demoted += 1;
        }
    }

    Ok(demoted)
}

fn is_live_checkable(result: &ValidationResult) -> bool {
    let url = result.url().trim().to_ascii_lowercase();
    result.is_valid()
        && !result.is_skipped()
        && result.category() == Some(LinkCategory::External)
        && (url.starts_with("http://") || url.starts_with("https://"))
}

/// Checks multiple links concurrently and returns the outcomes keyed by URL.
pub async fn check_links(urls: Vec<String>, concurrency: usize) -> Result<HashMap<String, LinkCheckResult>> {
    // One client for every request (connection pooling)
    let client = Client::builder()
        .timeout(Duration::from_secs(10))
        .redirect(reqwest::redirect::Policy::limited(5))
        .user_agent(concat!("fest-link-guardian/", env!("CARGO_PKG_VERSION")))
        .build()?;

    let futures = urls.into_iter().map(|url| {
        let client = client.clone();
        async move { check_single_link(client, url).await }
    });

    // Results come back in completion order, not input order
    let outcomes: Vec<LinkCheckResult> = stream::iter(futures)
        .buffer_unordered(concurrency.max(1))
        .collect()
        .await;

    Ok(outcomes.into_iter().map(|outcome| (outcome.url.clone(), outcome)).collect())
}

async fn check_single_link(client: Client, url: String) -> LinkCheckResult {
    // First, try a HEAD request (faster, no body download)
    match client.head(&url).send().await {
        Ok(response) if refuses_head(response.status()) => match client.get(&url).send().await {
            Ok(response) => analyze_response(url, response),
            Err(e) => categorize_error(url, e),
        },
        Ok(response) => analyze_response(url, response),
        Err(e) => categorize_error(url, e),
    }
}

fn refuses_head(status: StatusCode) -> bool {
    matches!(status, StatusCode::METHOD_NOT_ALLOWED | StatusCode::NOT_IMPLEMENTED)
}

// Maps an HTTP status code onto a LinkStatus
fn analyze_response(url: String, response: reqwest::Response) -> LinkCheckResult {
    let status_code = response.status();
    let message = format!("HTTP {}", status_code.as_u16());

    let status = if status_code.is_success() {
        LinkStatus::Ok
    } else if status_code.is_redirection() {
        let location = response
            .headers()
            .get("location")
            .and_then(|v| v.to_str().ok())
            .unwrap_or("unknown")
            .to_string();
        return LinkCheckResult {
            url,
            message: format!("{} -> {}", message, location),
            status: LinkStatus::Redirect { location },
        };
    } else if matches!(status_code, StatusCode::NOT_FOUND | StatusCode::GONE) {
        LinkStatus::Broken
    } else {
        LinkStatus::Error
    };

    LinkCheckResult { url, status, message }
}

// Categorizes reqwest errors: timeouts, redirect loops, DNS, TLS, ...
fn categorize_error(url: String, error: reqwest::Error) -> LinkCheckResult {
    let error_string = error.to_string().to_lowercase();

    let (status, message) = if error.is_timeout() {
        (LinkStatus::Timeout, "Request timed out".to_string())
    } else if error.is_redirect() {
        (LinkStatus::TooManyRedirects, "Too many redirects".to_string())
    } else if error.is_connect() {
        if error_string.contains("dns") {
            (LinkStatus::DnsError, "Could not resolve hostname".to_string())
        } else {
            (LinkStatus::Error, "Connection failed".to_string())
        }
    } else if error_string.contains("certificate") || error_string.contains("ssl") || error_string.contains("tls") {
        (LinkStatus::SslError, "SSL certificate error".to_string())
    } else {
        (LinkStatus::Error, error.to_string())
    };

    LinkCheckResult { url, status, message }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Classification, LinkOccurrence};
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    // Answers every connection with the given status line and no body
    async fn serve(status_line: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            loop {
                let Ok((mut socket, _)) = listener.accept().await else {
                    break;
                };
                tokio::spawn(async move {
                    let mut buf = [0u8; 2048];
                    let _ = socket.read(&mut buf).await;
                    let response = format!("HTTP/1.1 {}\r\nContent-Length: 0\r\nConnection: close\r\n\r\n", status_line);
                    let _ = socket.write_all(response.as_bytes()).await;
                    let _ = socket.shutdown().await;
                });
            }
        });
        format!("http://{}", addr)
    }

    fn external(url: &str) -> ValidationResult {
        ValidationResult::valid(
            LinkOccurrence::new(url, "index.html", 1, "a"),
            Classification::of(LinkCategory::External),
            "External: 127.0.0.1",
        )
    }

    #[test]
    fn test_link_result_is_ok() {
        let ok = LinkCheckResult {
            url: "https://example.com".to_string(),
            status: LinkStatus::Ok,
            message: "HTTP 200".to_string(),
        };
        assert!(ok.is_ok());

        let redirect = LinkCheckResult {
            status: LinkStatus::Redirect { location: "/new".to_string() },
            ..ok.clone()
        };
        assert!(redirect.is_ok());

        let broken = LinkCheckResult {
            status: LinkStatus::Broken,
            ..ok
        };
        assert!(!broken.is_ok());
    }

    #[tokio::test]
    async fn test_recheck_demotes_broken_links() {
        let base = serve("404 Not Found").await;
        let mut results = vec![external(&format!("{}/gone", base))];

        let demoted = recheck_external(&mut results, 4).await.unwrap();
        assert_eq!(demoted, 1);
        assert!(!results[0].is_valid());
        assert_eq!(results[0].error_message(), Some("Unreachable: HTTP 404"));
    }

    #[tokio::test]
    async fn test_recheck_keeps_reachable_links() {
        let base = serve("200 OK").await;
        let url = format!("{}/page", base);
        let mut results = vec![external(&url), external(&url)];

        let demoted = recheck_external(&mut results, 4).await.unwrap();
        assert_eq!(demoted, 0);
        assert!(results.iter().all(|r| r.is_valid()));
        assert_eq!(results[0].resolved_target(), Some("External: 127.0.0.1 (HTTP 200)"));
    }

    #[tokio::test]
    async fn test_recheck_ignores_invalid_and_skipped_results() {
        let mut results = vec![
            ValidationResult::invalid(
                LinkOccurrence::new("https://instagram.com/", "index.html", 1, "a"),
                Classification::of(LinkCategory::External),
                "Invalid instagram.com URL format",
            ),
            ValidationResult::skipped(
                LinkOccurrence::new("https://fonts.gstatic.com", "index.html", 2, "link"),
                Classification::of(LinkCategory::External),
                "Skipped: preconnect resource hint",
            ),
        ];

        assert_eq!(recheck_external(&mut results, 4).await.unwrap(), 0);
        assert!(results[1].is_skipped());
    }
}
