// src/checker/validate.rs
// =============================================================================
// One validation rule per link category.
//
//   Javascript     always valid
//   Fragment       empty, or an identifier-shaped anchor
//   Mailto         address (query dropped) must look like local@domain.tld
//   External       see external.rs
//   ApiEndpoint    known endpoint, or /api/image-proxy/<10-50 char id>
//   InternalAsset  file exists under the root or a static dir
//   SpecialRoute   "/" needs the root document, data routes need public/<path>
//   InternalPage   route table, pages/<p>.html, pages/<p>/index.html, <p>.html
//
// Every rule returns a ValidationResult; nothing here returns an error or
// panics on link content. The filesystem is only ever read.
// =============================================================================

use super::classify::strip_query_and_fragment;
use super::external::validate_external;
use crate::config::SiteConfig;
use crate::error::Result;
use crate::model::{Classification, LinkCategory, LinkOccurrence, ValidationResult};
use regex::Regex;
use std::path::{Component, Path, PathBuf};
use std::sync::LazyLock;
use tracing::debug;

static ANCHOR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z][\w-]*$").expect("Failed to compile anchor regex"));

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[\w.%+-]+@[\w.-]+\.[A-Za-z]{2,}$").expect("Failed to compile email regex")
});

static IMAGE_PROXY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^/api/image-proxy/[A-Za-z0-9_-]{10,50}$").expect("Failed to compile image proxy regex")
});

const IMAGE_PROXY_PREFIX: &str = "/api/image-proxy/";

/// Checks classified occurrences against the project on disk.
#[derive(Debug, Clone)]
pub struct Validator {
    root: PathBuf,
    config: SiteConfig,
    skip_patterns: Vec<Regex>,
}

impl Validator {
    /// Fails only if the configured skip patterns do not compile.
    pub fn new(root: impl Into<PathBuf>, config: SiteConfig) -> Result<Self> {
        let skip_patterns = config.skip_regexes()?;
        Ok(Validator {
            root: root.into(),
            config,
            skip_patterns,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config(&self) -> &SiteConfig {
        &self.config
    }

    /// Validates one occurrence.
    ///
    /// `source` is the document's path relative to the project root, when it
    /// has one; relative links cannot be checked without it.
    pub fn validate(&self, occurrence: LinkOccurrence, class: Classification, source: Option<&Path>) -> ValidationResult {
        if let Some(reason) = self.skip_reason(&occurrence) {
            debug!(url = %occurrence.url, %reason, "skipping link");
            return ValidationResult::skipped(occurrence, class, reason);
        }

        // Exhaustive on purpose: a new category does not compile until it has a rule
        match class.category {
            LinkCategory::Javascript => ValidationResult::valid(occurrence, class, "JavaScript pseudo-URL"),
            LinkCategory::Fragment => validate_fragment(occurrence, class),
            LinkCategory::External => validate_external(occurrence, class, &self.config.cdn_hosts),
            LinkCategory::Mailto => validate_mailto(occurrence, class),
            LinkCategory::ApiEndpoint => self.validate_api(occurrence, class),
            LinkCategory::InternalAsset => self.validate_asset(occurrence, class, source),
            LinkCategory::SpecialRoute => self.validate_special_route(occurrence, class),
            LinkCategory::InternalPage => self.validate_page(occurrence, class, source),
        }
    }

    // Resource hints and configured exclusions are reported, not checked
    fn skip_reason(&self, occurrence: &LinkOccurrence) -> Option<String> {
        if let Some(rel) = occurrence.attr("rel") {
            let hint = rel
                .split_whitespace()
                .map(str::to_ascii_lowercase)
                .find(|value| self.config.skip_rel.contains(value));
            if let Some(hint) = hint {
                return Some(format!("Skipped: {} resource hint", hint));
            }
        }

        self.skip_patterns
            .iter()
            .find(|pattern| pattern.is_match(&occurrence.url))
            .map(|pattern| format!("Skipped: matches pattern '{}'", pattern.as_str()))
    }

    fn validate_api(&self, occurrence: LinkOccurrence, class: Classification) -> ValidationResult {
        let path = strip_query_and_fragment(occurrence.url.trim()).to_string();

        if self.config.api_endpoints.contains(&path) {
            return ValidationResult::valid(occurrence, class, format!("Server endpoint: {}", path));
        }
        if IMAGE_PROXY_RE.is_match(&path) {
            return ValidationResult::valid(occurrence, class, format!("Image proxy endpoint: {}", path));
        }
        if path.starts_with(IMAGE_PROXY_PREFIX) {
            return ValidationResult::invalid(occurrence, class, format!("Invalid image proxy file ID format: {}", path));
        }

        ValidationResult::invalid(occurrence, class, format!("Unknown API endpoint: {}", path))
    }

    fn validate_asset(&self, occurrence: LinkOccurrence, class: Classification, source: Option<&Path>) -> ValidationResult {
        let raw = occurrence.url.trim().to_string();
        let path = strip_query_and_fragment(&raw);

        let relative = match self.resolve_local(path, source) {
            Ok(relative) => relative,
            Err(message) => return ValidationResult::invalid(occurrence, class, message),
        };

        let found = std::iter::once(self.root.join(&relative))
            .chain(self.config.static_dirs.iter().map(|dir| self.root.join(dir).join(&relative)))
            .find(|candidate| candidate.is_file());

        match found {
            Some(file) => {
                let query = raw.split_once('?').map(|(_, q)| q).unwrap_or_default();
                let target = self.display(&file);
                let target = if query.is_empty() {
                    target
                } else {
                    format!("{} (with query: {})", target, query)
                };
                ValidationResult::valid(occurrence, class, target)
            }
            None => {
                let message = format!("Asset not found: {}", relative.display());
                ValidationResult::invalid(occurrence, class, message)
            }
        }
    }

    fn validate_special_route(&self, occurrence: LinkOccurrence, class: Classification) -> ValidationResult {
        let path = strip_query_and_fragment(occurrence.url.trim()).to_string();

        if path == "/" {
            let document = self.root.join(&self.config.root_document);
            return if document.is_file() {
                ValidationResult::valid(occurrence, class, format!("Root document: {}", self.config.root_document))
            } else {
                ValidationResult::invalid(occurrence, class, format!("Root document not found: {}", self.config.root_document))
            };
        }

        if !path.to_ascii_lowercase().ends_with(".json") {
            return ValidationResult::invalid(occurrence, class, format!("Data routes only serve .json files: {}", path));
        }

        let Some(relative) = normalize(Path::new(path.trim_start_matches('/'))) else {
            return ValidationResult::invalid(occurrence, class, format!("Relative link escapes the project root: {}", path));
        };
        let file = self.root.join(&self.config.public_dir).join(relative);
        if file.is_file() {
            let target = self.display(&file);
            ValidationResult::valid(occurrence, class, target)
        } else {
            let message = format!("Gallery data JSON not found: {}", self.display(&file));
            ValidationResult::invalid(occurrence, class, message)
        }
    }

    fn validate_page(&self, occurrence: LinkOccurrence, class: Classification, source: Option<&Path>) -> ValidationResult {
        let raw = strip_query_and_fragment(occurrence.url.trim()).to_string();

        // Every page link becomes a root-relative path first
        let relative = match self.resolve_local(&raw, source) {
            Ok(relative) => relative,
            Err(message) => return ValidationResult::invalid(occurrence, class, message),
        };

        // A link that names an existing file is valid as it stands
        let direct = self.root.join(&relative);
        if !relative.as_os_str().is_empty() && direct.is_file() {
            return ValidationResult::valid(occurrence, class, self.display(&direct));
        }

        let requested = format!("/{}", relative.to_string_lossy().replace('\\', "/"));
        let path = if requested == "/" || self.config.legacy_home_aliases.contains(&requested) {
            self.config.home_route.clone()
        } else {
            requested.clone()
        };

        let name = path.trim_start_matches('/');
        let pages = self.root.join(&self.config.pages_dir);

        let routed = self.config.routes.get(&path);
        let mut candidates: Vec<PathBuf> = Vec::new();
        if let Some(file) = routed {
            candidates.push(self.root.join(file.trim_start_matches('/')));
        }
        if !name.is_empty() {
            candidates.push(pages.join(format!("{}.html", name)));
            candidates.push(pages.join(name).join("index.html"));
            candidates.push(self.root.join(format!("{}.html", name)));
        }

        if let Some(file) = candidates.iter().find(|candidate| candidate.is_file()) {
            return ValidationResult::valid(occurrence, class, self.display(file));
        }

        let mut message = format!("No matching page found for clean URL: {}", requested);
        if path != requested {
            message.push_str(&format!(" (home route {})", path));
        }
        if let Some(file) = routed {
            message.push_str(&format!(" (route target missing: {})", file));
        }
        ValidationResult::invalid(occurrence, class, message)
    }

    // Turns a link path into a path relative to the project root.
    // Rooted paths are taken from the root; anything else is resolved against
    // the directory of the source document. Neither may climb above the root.
    fn resolve_local(&self, path: &str, source: Option<&Path>) -> std::result::Result<PathBuf, String> {
        if let Some(rooted) = path.strip_prefix('/') {
            return normalize(Path::new(rooted))
                .ok_or_else(|| format!("Relative link escapes the project root: {}", path));
        }

        let Some(source) = source else {
            return Err(format!(
                "Cannot validate relative link '{}' without source document context",
                path
            ));
        };

        let base = source.parent().unwrap_or_else(|| Path::new(""));
        normalize(&base.join(path)).ok_or_else(|| format!("Relative link escapes the project root: {}", path))
    }

    fn display(&self, file: &Path) -> String {
        file.strip_prefix(&self.root).unwrap_or(file).display().to_string()
    }
}

/// Checks a `#fragment` link.
fn validate_fragment(occurrence: LinkOccurrence, class: Classification) -> ValidationResult {
    let anchor = occurrence.url.trim().trim_start_matches('#').to_string();

    if anchor.is_empty() {
        return ValidationResult::valid(occurrence, class, "Page top");
    }
    if ANCHOR_RE.is_match(&anchor) {
        return ValidationResult::valid(occurrence, class, format!("Page anchor: #{}", anchor));
    }

    ValidationResult::invalid(occurrence, class, format!("Invalid anchor format: {}", anchor))
}

/// Checks a `mailto:` link. Only the address is checked, `?subject=...` is dropped.
fn validate_mailto(occurrence: LinkOccurrence, class: Classification) -> ValidationResult {
    let url = occurrence.url.trim();
    let address = url.get("mailto:".len()..).unwrap_or_default();
    let address = address.split('?').next().unwrap_or_default().to_string();

    if EMAIL_RE.is_match(&address) {
        ValidationResult::valid(occurrence, class, format!("Email: {}", address))
    } else {
        ValidationResult::invalid(occurrence, class, format!("Invalid email address: {}", address))
    }
}

// Lexically removes `.` and `..`. Returns None if the path climbs above its start.
fn normalize(path: &Path) -> Option<PathBuf> {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    return None;
                }
            }
            Component::Normal(part) => out.push(part),
            Component::RootDir | Component::Prefix(_) => return None,
        }
    }
    Some(out)
}
