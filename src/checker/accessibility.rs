// src/checker/accessibility.rs
// =============================================================================
// Accessibility audit of link markup.
//
// These findings are advisory. They are listed in the report but never make
// a link invalid and never change the exit code.
//
//   missing_aria_label     icon-only <a> with no aria-label or title
//   empty_link_text        <a> with no text, no icon and no aria-label
//   external_without_rel   external link opening in a new tab without rel
//   image_without_alt      <img> with no alt attribute at all
// =============================================================================

use super::html::parse_srcset;
use crate::model::LinkOccurrence;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessibilityIssue {
    MissingAriaLabel,
    EmptyLinkText,
    ExternalWithoutRel,
    ImageWithoutAlt,
}

impl AccessibilityIssue {
    pub fn label(self) -> &'static str {
        match self {
            AccessibilityIssue::MissingAriaLabel => "missing_aria_label",
            AccessibilityIssue::EmptyLinkText => "empty_link_text",
            AccessibilityIssue::ExternalWithoutRel => "external_without_rel",
            AccessibilityIssue::ImageWithoutAlt => "image_without_alt",
        }
    }
}

/// Lists the accessibility problems of one occurrence.
pub fn audit_accessibility(occurrence: &LinkOccurrence) -> Vec<AccessibilityIssue> {
    let mut issues = Vec::new();
    let has = |name: &str| occurrence.attr(name).is_some_and(|value| !value.trim().is_empty());

    if occurrence.tag == "a" && occurrence.text.is_empty() && !has("aria-label") {
        if occurrence.has_icon {
            if !has("title") {
                issues.push(AccessibilityIssue::MissingAriaLabel);
            }
        } else {
            issues.push(AccessibilityIssue::EmptyLinkText);
        }
    }

    let url = occurrence.url.to_ascii_lowercase();
    let external = url.starts_with("http://") || url.starts_with("https://") || url.starts_with("//");
    let new_tab = occurrence.attr("target").is_some_and(|t| t.trim().eq_ignore_ascii_case("_blank"));
    if external && new_tab && !has("rel") {
        issues.push(AccessibilityIssue::ExternalWithoutRel);
    }

    // alt="" marks a decorative image and is fine
    if occurrence.tag == "img" && occurrence.attr("alt").is_none() && is_primary_image_url(occurrence) {
        issues.push(AccessibilityIssue::ImageWithoutAlt);
    }

    issues
}

// One <img> can yield several occurrences (src plus srcset candidates); only
// one of them stands for the element.
fn is_primary_image_url(occurrence: &LinkOccurrence) -> bool {
    match occurrence.attr("src").map(str::trim).filter(|src| !src.is_empty()) {
        Some(src) => src == occurrence.url,
        None => occurrence
            .attr("srcset")
            .and_then(|srcset| parse_srcset(srcset).into_iter().next())
            .is_some_and(|first| first == occurrence.url),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn link(url: &str, tag: &str, attrs: &[(&str, &str)]) -> LinkOccurrence {
        let mut occurrence = LinkOccurrence::new(url, "index.html", 1, tag);
        for (name, value) in attrs {
            occurrence.attributes.insert(name.to_string(), value.to_string());
        }
        occurrence
    }

    #[test]
    fn test_link_text_rules() {
        let mut with_text = link("/about", "a", &[]);
        with_text.text = "About".to_string();
        assert!(audit_accessibility(&with_text).is_empty());

        assert_eq!(audit_accessibility(&link("/about", "a", &[])), vec![AccessibilityIssue::EmptyLinkText]);
        assert!(audit_accessibility(&link("/about", "a", &[("aria-label", "About us")])).is_empty());

        let mut icon = link("https://www.instagram.com/alocubano/", "a", &[]);
        icon.has_icon = true;
        assert_eq!(audit_accessibility(&icon), vec![AccessibilityIssue::MissingAriaLabel]);
        icon.attributes.insert("title".to_string(), "Instagram".to_string());
        assert!(audit_accessibility(&icon).is_empty());
    }

    #[test]
    fn test_new_tab_needs_rel() {
        let mut bare = link("https://example.com", "a", &[("target", "_blank")]);
        bare.text = "Example".to_string();
        assert_eq!(audit_accessibility(&bare), vec![AccessibilityIssue::ExternalWithoutRel]);

        let mut safe = link("https://example.com", "a", &[("target", "_blank"), ("rel", "noopener")]);
        safe.text = "Example".to_string();
        assert!(audit_accessibility(&safe).is_empty());

        // Internal pages in a new tab are not flagged
        let mut internal = link("/tickets", "a", &[("target", "_blank")]);
        internal.text = "Tickets".to_string();
        assert!(audit_accessibility(&internal).is_empty());
    }

    #[test]
    fn test_images_need_alt_once() {
        let attrs = [("src", "/images/a.jpg"), ("srcset", "/images/a-480.jpg 480w, /images/a-800.jpg 800w")];
        assert_eq!(
            audit_accessibility(&link("/images/a.jpg", "img", &attrs)),
            vec![AccessibilityIssue::ImageWithoutAlt]
        );
        assert!(audit_accessibility(&link("/images/a-480.jpg", "img", &attrs)).is_empty());
        assert!(audit_accessibility(&link("/images/a.jpg", "img", &[("src", "/images/a.jpg"), ("alt", "")])).is_empty());

        let only_srcset = [("srcset", "/images/b-1x.png 1x, /images/b-2x.png 2x")];
        assert_eq!(audit_accessibility(&link("/images/b-1x.png", "img", &only_srcset)).len(), 1);
        assert!(audit_accessibility(&link("/images/b-2x.png", "img", &only_srcset)).is_empty());
    }
}
