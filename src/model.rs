// src/model.rs
// =============================================================================
// Data types shared by every stage of the pipeline.
//
//   LinkOccurrence   - one link-bearing attribute value found in one document
//   LinkCategory     - the closed taxonomy the classifier assigns
//   Classification   - category plus the optional navigation/content sub-tag
//   ValidationResult - the outcome of checking one occurrence
//
// ValidationResult keeps its fields private: the constructors are the only
// way to build one, so a valid result can never carry an error message and an
// invalid one always does.
// =============================================================================

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// One reference found in one document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LinkOccurrence {
    /// Raw attribute value, exactly as written (query and fragment included)
    pub url: String,
    /// Identifier of the document it was found in
    pub source_document: String,
    /// 1-based line of the originating tag
    pub line_number: u64,
    /// Originating element name, lowercase (a, img, script, form, ...)
    pub tag: String,
    /// Every attribute on the originating element
    pub attributes: BTreeMap<String, String>,
    /// True when the element sits inside a <header> or <nav> landmark
    pub in_navigation: bool,
    /// Visible text of an <a> element, whitespace collapsed
    #[serde(skip_serializing_if = "String::is_empty")]
    pub text: String,
    /// True when an <a> element wraps an image or icon
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub has_icon: bool,
}

impl LinkOccurrence {
    pub fn new(url: impl Into<String>, source_document: impl Into<String>, line_number: u64, tag: impl Into<String>) -> Self {
        LinkOccurrence {
            url: url.into(),
            source_document: source_document.into(),
            line_number: line_number.max(1),
            tag: tag.into(),
            attributes: BTreeMap::new(),
            in_navigation: false,
            text: String::new(),
            has_icon: false,
        }
    }

    /// Looks up an attribute of the originating element.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }
}

/// The closed set of link kinds. Declaration order is the classifier's
/// priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkCategory {
    Javascript,
    Fragment,
    External,
    Mailto,
    ApiEndpoint,
    InternalAsset,
    SpecialRoute,
    InternalPage,
}

impl LinkCategory {
    pub const ALL: [LinkCategory; 8] = [
        LinkCategory::Javascript,
        LinkCategory::Fragment,
        LinkCategory::External,
        LinkCategory::Mailto,
        LinkCategory::ApiEndpoint,
        LinkCategory::InternalAsset,
        LinkCategory::SpecialRoute,
        LinkCategory::InternalPage,
    ];

    /// Stable snake_case name used as a report key.
    pub fn label(self) -> &'static str {
        match self {
            LinkCategory::Javascript => "javascript",
            LinkCategory::Fragment => "fragment",
            LinkCategory::External => "external",
            LinkCategory::Mailto => "mailto",
            LinkCategory::ApiEndpoint => "api_endpoint",
            LinkCategory::InternalAsset => "internal_asset",
            LinkCategory::SpecialRoute => "special_route",
            LinkCategory::InternalPage => "internal_page",
        }
    }
}

impl fmt::Display for LinkCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Report-only refinement of internal pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PageContext {
    Navigation,
    Content,
}

impl PageContext {
    pub fn label(self) -> &'static str {
        match self {
            PageContext::Navigation => "navigation",
            PageContext::Content => "content",
        }
    }
}

/// What the classifier decided for one occurrence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Classification {
    pub category: LinkCategory,
    /// Only ever set for `InternalPage`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<PageContext>,
}

impl Classification {
    pub fn of(category: LinkCategory) -> Self {
        Classification { category, context: None }
    }
}

/// Report key used for results that come from an unreadable document rather
/// than from a link.
pub const FILE_GROUP: &str = "file";

/// Outcome of checking one occurrence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationResult {
    occurrence: LinkOccurrence,
    /// None when the result stands for a document that could not be read
    #[serde(skip_serializing_if = "Option::is_none")]
    category: Option<LinkCategory>,
    #[serde(skip_serializing_if = "Option::is_none")]
    context: Option<PageContext>,
    is_valid: bool,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    skipped: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    error_message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    resolved_target: Option<String>,
}

impl ValidationResult {
    pub fn valid(occurrence: LinkOccurrence, class: Classification, target: impl Into<String>) -> Self {
        ValidationResult {
            occurrence,
            category: Some(class.category),
            context: class.context,
            is_valid: true,
            skipped: false,
            error_message: None,
            resolved_target: Some(target.into()),
        }
    }

    /// Valid, but exempt from checking. Still counted in the totals.
    pub fn skipped(occurrence: LinkOccurrence, class: Classification, reason: impl Into<String>) -> Self {
        ValidationResult {
            skipped: true,
            ..ValidationResult::valid(occurrence, class, reason)
        }
    }

    pub fn invalid(occurrence: LinkOccurrence, class: Classification, error: impl Into<String>) -> Self {
        ValidationResult {
            occurrence,
            category: Some(class.category),
            context: class.context,
            is_valid: false,
            skipped: false,
            error_message: Some(error.into()),
            resolved_target: None,
        }
    }

    /// Synthetic failure for a document that could not be read at all.
    pub fn unreadable_document(document: &str, error: impl fmt::Display) -> Self {
        ValidationResult {
            occurrence: LinkOccurrence::new(document, document, 1, FILE_GROUP),
            category: None,
            context: None,
            is_valid: false,
            skipped: false,
            error_message: Some(format!("Error reading file: {}", error)),
            resolved_target: None,
        }
    }

    /// Turns a valid result into an invalid one, e.g. after a live check
    /// found the target gone.
    pub fn demote(&mut self, error: impl Into<String>) {
        self.is_valid = false;
        self.skipped = false;
        self.error_message = Some(error.into());
        self.resolved_target = None;
    }

    /// Replaces the description of what a valid link resolved to.
    pub fn set_resolved_target(&mut self, target: impl Into<String>) {
        if self.is_valid {
            self.resolved_target = Some(target.into());
        }
    }

    pub fn occurrence(&self) -> &LinkOccurrence {
        &self.occurrence
    }

    pub fn url(&self) -> &str {
        &self.occurrence.url
    }

    pub fn category(&self) -> Option<LinkCategory> {
        self.category
    }

    pub fn context(&self) -> Option<PageContext> {
        self.context
    }

    pub fn is_valid(&self) -> bool {
        self.is_valid
    }

    pub fn is_skipped(&self) -> bool {
        self.skipped
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    pub fn resolved_target(&self) -> Option<&str> {
        self.resolved_target.as_deref()
    }

    /// Key this result is grouped under in the report.
    pub fn group_label(&self) -> &'static str {
        self.category.map_or(FILE_GROUP, LinkCategory::label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn occurrence() -> LinkOccurrence {
        LinkOccurrence::new("/about", "index.html", 3, "a")
    }

    #[test]
    fn test_valid_result_has_no_error() {
        let result = ValidationResult::valid(occurrence(), Classification::of(LinkCategory::InternalPage), "pages/about.html");
        assert!(result.is_valid());
        assert!(result.error_message().is_none());
        assert_eq!(result.resolved_target(), Some("pages/about.html"));
    }

    #[test]
    fn test_invalid_result_always_has_error() {
        let result = ValidationResult::invalid(occurrence(), Classification::of(LinkCategory::InternalPage), "nope");
        assert!(!result.is_valid());
        assert_eq!(result.error_message(), Some("nope"));
        assert!(result.resolved_target().is_none());
    }

    #[test]
    fn test_demote_clears_target_and_skip() {
        let mut result = ValidationResult::skipped(occurrence(), Classification::of(LinkCategory::External), "Skipped: preconnect hint");
        assert!(result.is_valid() && result.is_skipped());

        result.demote("HTTP 404");
        assert!(!result.is_valid());
        assert!(!result.is_skipped());
        assert_eq!(result.error_message(), Some("HTTP 404"));
        assert!(result.resolved_target().is_none());
    }

    #[test]
    fn test_unreadable_document_groups_under_file() {
        let result = ValidationResult::unreadable_document("pages/broken.html", "permission denied");
        assert_eq!(result.group_label(), FILE_GROUP);
        assert_eq!(result.category(), None);
        assert_eq!(result.occurrence().line_number, 1);
        assert!(result.error_message().unwrap().contains("permission denied"));
    }

    #[test]
    fn test_line_number_is_at_least_one() {
        assert_eq!(LinkOccurrence::new("/", "doc", 0, "a").line_number, 1);
    }
}
