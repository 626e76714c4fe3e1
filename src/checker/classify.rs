// src/checker/classify.rs
// =============================================================================
// This module decides what kind of link an occurrence is.
//
// Classification only looks at the URL string (and, for internal pages, at
// whether the link sits in the site's navigation chrome). It never touches
// the filesystem or the network; that is the validators' job.
//
// Rules are tried in order, first match wins:
//   1. javascript:                       -> Javascript
//   2. #...                              -> Fragment
//   3. http://, https://, //             -> External
//   4. mailto:                           -> Mailto
//   5. /api/...                          -> ApiEndpoint
//   6. path ends in a static extension   -> InternalAsset
//   7. "/" or <data prefix>...json       -> SpecialRoute (checked before 6)
//   8. anything else                     -> InternalPage
// =============================================================================

use crate::config::SiteConfig;
use crate::model::{Classification, LinkCategory, LinkOccurrence, PageContext};
use std::collections::BTreeSet;

// Stylesheets, scripts, data files, images, fonts and media
const ASSET_EXTENSIONS: &[&str] = &[
    ".css", ".js", ".mjs", ".map", ".json", ".xml", ".txt", ".webmanifest", ".pdf", ".png", ".jpg",
    ".jpeg", ".gif", ".svg", ".ico", ".webp", ".avif", ".woff", ".woff2", ".ttf", ".otf", ".eot",
    ".mp3", ".mp4", ".webm", ".ogg", ".wav", ".vtt",
];

#[derive(Debug, Clone)]
pub struct Classifier {
    navigation_pages: BTreeSet<String>,
    data_route_prefixes: Vec<String>,
}

impl Default for Classifier {
    fn default() -> Self {
        Classifier::new(&SiteConfig::default())
    }
}

impl Classifier {
    pub fn new(config: &SiteConfig) -> Self {
        Classifier {
            navigation_pages: config.navigation_pages.clone(),
            data_route_prefixes: config.data_route_prefixes.iter().map(|p| p.to_ascii_lowercase()).collect(),
        }
    }

    /// Classifies one occurrence. Internal pages found in a header or nav
    /// landmark that point at a top-level page are tagged as navigation.
    pub fn classify(&self, occurrence: &LinkOccurrence) -> Classification {
        let category = self.category_of(&occurrence.url);
        if category != LinkCategory::InternalPage {
            return Classification::of(category);
        }

        let path = strip_query_and_fragment(occurrence.url.trim());
        let context = if occurrence.in_navigation && self.navigation_pages.contains(path) {
            PageContext::Navigation
        } else {
            PageContext::Content
        };

        Classification {
            category,
            context: Some(context),
        }
    }

    /// The category of a bare URL. Total: every string gets one.
    pub fn category_of(&self, url: &str) -> LinkCategory {
        let url = url.trim().to_ascii_lowercase();

        if url.starts_with("javascript:") {
            return LinkCategory::Javascript;
        }
        if url.starts_with('#') {
            return LinkCategory::Fragment;
        }
        if url.starts_with("http://") || url.starts_with("https://") || url.starts_with("//") {
            return LinkCategory::External;
        }
        if url.starts_with("mailto:") {
            return LinkCategory::Mailto;
        }
        if url.starts_with("/api/") {
            return LinkCategory::ApiEndpoint;
        }

        let path = strip_query_and_fragment(&url);
        let is_data_route = path.ends_with(".json")
            && self.data_route_prefixes.iter().any(|prefix| path.starts_with(prefix.as_str()));

        // Data files end in .json too, but are served from the public dir
        if !is_data_route && ASSET_EXTENSIONS.iter().any(|ext| path.ends_with(ext)) {
            return LinkCategory::InternalAsset;
        }
        if url == "/" || is_data_route {
            return LinkCategory::SpecialRoute;
        }

        LinkCategory::InternalPage
    }
}

/// Drops everything from the first `?` or `#` on.
pub fn strip_query_and_fragment(url: &str) -> &str {
    match url.find(['?', '#']) {
        Some(index) => &url[..index],
        None => url,
    }
}
