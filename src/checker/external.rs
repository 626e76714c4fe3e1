// src/checker/external.rs
// =============================================================================
// Offline checks for external links.
//
// No request is made here. A link to a known social platform has to look
// like a profile/page URL on that platform; anything else only needs an
// http(s) scheme and a host. Protocol-relative links (//host/path) need a
// plausible domain name, and allow-listed CDN hosts are skipped outright.
//
// The live check that actually fetches these URLs lives in http.rs.
// =============================================================================

use crate::model::{Classification, LinkOccurrence, ValidationResult};
use regex::Regex;
use std::collections::BTreeSet;
use std::sync::LazyLock;
use url::Url;

// (domain, shape the URL must have on that platform)
const SOCIAL_PATTERNS: &[(&str, &str)] = &[
    ("instagram.com", r"(?i)^https://(?:www\.)?instagram\.com/[\w.]+/?"),
    ("facebook.com", r"(?i)^https://(?:www\.)?facebook\.com/[\w.-]+/?"),
    ("twitter.com", r"(?i)^https://(?:www\.)?twitter\.com/\w+/?"),
    ("x.com", r"(?i)^https://(?:www\.)?x\.com/\w+/?"),
    ("youtube.com", r"(?i)^https://(?:www\.)?youtube\.com/[\w@.-]+/?"),
    ("linkedin.com", r"(?i)^https://(?:www\.)?linkedin\.com/[\w/-]+/?"),
    ("wa.me", r"(?i)^https://wa\.me/[\d+]+/?"),
    ("api.whatsapp.com", r"(?i)^https://api\.whatsapp\.com/send\?phone=[\d+]+"),
];

static SOCIAL_RULES: LazyLock<Vec<(&'static str, Regex)>> = LazyLock::new(|| {
    SOCIAL_PATTERNS
        .iter()
        .map(|(domain, pattern)| (*domain, Regex::new(pattern).expect("Failed to compile social media regex")))
        .collect()
});

static DOMAIN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9.-]+\.[A-Za-z]{2,}$").expect("Failed to compile domain regex"));

/// Checks an `External` occurrence without touching the network.
pub fn validate_external(occurrence: LinkOccurrence, class: Classification, cdn_hosts: &BTreeSet<String>) -> ValidationResult {
    let url = occurrence.url.trim().to_string();

    if let Some(rest) = url.strip_prefix("//") {
        return validate_protocol_relative(occurrence, class, rest, cdn_hosts);
    }

    let parsed = match Url::parse(&url) {
        Ok(parsed) => parsed,
        Err(url::ParseError::EmptyHost) => {
            return ValidationResult::invalid(occurrence, class, "Invalid URL: missing domain");
        }
        Err(e) => return ValidationResult::invalid(occurrence, class, format!("Invalid URL: {}", e)),
    };

    if parsed.scheme() != "http" && parsed.scheme() != "https" {
        let message = format!("Unsupported protocol: {}", parsed.scheme());
        return ValidationResult::invalid(occurrence, class, message);
    }

    let host = match parsed.host_str() {
        Some(host) if !host.is_empty() => host.to_ascii_lowercase(),
        _ => return ValidationResult::invalid(occurrence, class, "Invalid URL: missing domain"),
    };

    let domain = host.strip_prefix("www.").unwrap_or(&host);
    for (social_domain, pattern) in SOCIAL_RULES.iter() {
        let on_platform = domain == *social_domain || domain.ends_with(&format!(".{}", social_domain));
        if !on_platform {
            continue;
        }

        return if pattern.is_match(&url) {
            ValidationResult::valid(occurrence, class, format!("Social media: {}", social_domain))
        } else {
            ValidationResult::invalid(occurrence, class, format!("Invalid {} URL format", social_domain))
        };
    }

    ValidationResult::valid(occurrence, class, format!("External: {}", host))
}

fn validate_protocol_relative(
    occurrence: LinkOccurrence,
    class: Classification,
    rest: &str,
    cdn_hosts: &BTreeSet<String>,
) -> ValidationResult {
    let authority = rest.split(['/', '?', '#']).next().unwrap_or_default();
    // Drop credentials and port, neither is part of the domain name
    let host = authority.rsplit('@').next().unwrap_or_default();
    let host = host.split(':').next().unwrap_or_default().to_ascii_lowercase();

    if cdn_hosts.contains(&host) {
        return ValidationResult::skipped(occurrence, class, format!("Skipped: allow-listed CDN host {}", host));
    }

    if DOMAIN_RE.is_match(&host) {
        ValidationResult::valid(occurrence, class, format!("External: {}", host))
    } else {
        ValidationResult::invalid(occurrence, class, format!("Invalid protocol-relative URL host: '{}'", host))
    }
}

/// Host of an absolute or protocol-relative URL, lowercase. Used for the
/// report's list of external domains.
pub fn external_host(url: &str) -> Option<String> {
    let url = url.trim();
    let parsed = match url.strip_prefix("//") {
        Some(_) => Url::parse(&format!("https:{}", url)),
        None => Url::parse(url),
    };

    parsed
        .ok()
        .and_then(|u| u.host_str().map(str::to_ascii_lowercase))
        .filter(|host| !host.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::LinkCategory;

    fn check(url: &str) -> ValidationResult {
        let cdn: BTreeSet<String> = ["fonts.googleapis.com".to_string()].into_iter().collect();
        validate_external(
            LinkOccurrence::new(url, "index.html", 1, "a"),
            Classification::of(LinkCategory::External),
            &cdn,
        )
    }

    #[test]
    fn test_instagram_profile_is_valid() {
        let result = check("https://www.instagram.com/someuser/");
        assert!(result.is_valid());
        assert_eq!(result.resolved_target(), Some("Social media: instagram.com"));
    }

    #[test]
    fn test_instagram_without_profile_is_invalid() {
        let result = check("https://instagram.com/");
        assert!(!result.is_valid());
        assert_eq!(result.error_message(), Some("Invalid instagram.com URL format"));
    }

    #[test]
    fn test_other_platforms() {
        assert!(check("https://www.facebook.com/alocubano.boulderfest").is_valid());
        assert!(check("https://x.com/someone").is_valid());
        assert!(check("https://www.youtube.com/@channel").is_valid());
        assert!(check("https://wa.me/13035551234").is_valid());
        assert!(check("https://api.whatsapp.com/send?phone=+13035551234&text=hi").is_valid());
        assert!(!check("https://wa.me/not-a-number").is_valid());
        assert!(!check("http://twitter.com/someone").is_valid());
    }

    #[test]
    fn test_generic_external_link() {
        let result = check("https://example.com/path?q=1");
        assert!(result.is_valid());
        assert_eq!(result.resolved_target(), Some("External: example.com"));

        // A domain that merely ends in x.com is not x.com
        assert!(check("https://box.com/").is_valid());
    }

    #[test]
    fn test_missing_host_is_invalid() {
        let result = check("http://");
        assert!(!result.is_valid());
    }

    #[test]
    fn test_protocol_relative() {
        let ok = check("//cdn.example.org/lib.js");
        assert!(ok.is_valid() && !ok.is_skipped());

        let cdn = check("//fonts.googleapis.com/css2?family=Inter");
        assert!(cdn.is_valid() && cdn.is_skipped());

        let bad = check("//localhost/thing");
        assert!(!bad.is_valid());
    }

    #[test]
    fn test_external_host() {
        assert_eq!(external_host("https://WWW.Example.com/a"), Some("www.example.com".to_string()));
        assert_eq!(external_host("//fonts.gstatic.com/x"), Some("fonts.gstatic.com".to_string()));
        assert_eq!(external_host("not a url"), None);
    }
}
