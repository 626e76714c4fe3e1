// src/config.rs
// =============================================================================
// Site configuration: where things live on disk and which routes exist.
//
// The known-routes table mirrors the router that serves the real site. It is
// configuration input, never computed here. Everything has a built-in default
// for the festival site, and a `linkcheck.toml` in the project root can
// override any field:
//
//   home_route = "/home"
//   api_endpoints = ["/api/gallery"]
//
//   [routes]
//   "/about" = "pages/about.html"
//
// A broken config file must not stop a run: `load_or_default` logs a warning
// and carries on with the defaults.
// =============================================================================

use crate::error::{Error, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Canonical page that `/` redirects to
    pub home_route: String,
    /// Older spellings of the home page that are still accepted
    pub legacy_home_aliases: Vec<String>,
    /// The document served at `/`, relative to the project root
    pub root_document: String,
    pub pages_dir: String,
    pub public_dir: String,
    /// Directories that static assets may live in, relative to the project root
    pub static_dirs: Vec<String>,
    /// Clean URL path -> file that serves it, relative to the project root
    pub routes: BTreeMap<String, String>,
    pub api_endpoints: BTreeSet<String>,
    /// Top-level pages that count as site navigation when linked from
    /// a header or nav landmark
    pub navigation_pages: BTreeSet<String>,
    /// Prefixes of statically served data routes (`/gallery-data/2025.json`)
    pub data_route_prefixes: Vec<String>,
    /// Hosts that protocol-relative links may point at without a check
    pub cdn_hosts: BTreeSet<String>,
    /// `rel` values of resource hints that are reported as skipped
    pub skip_rel: BTreeSet<String>,
    /// Regexes; a URL matching any of them is reported as skipped
    pub skip_patterns: Vec<String>,
    /// Path fragments; documents whose relative path contains one are not scanned
    pub exclude_documents: Vec<String>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        SiteConfig {
            home_route: "/home".to_string(),
            legacy_home_aliases: vec!["/index.html".to_string()],
            root_document: "index.html".to_string(),
            pages_dir: "pages".to_string(),
            public_dir: "public".to_string(),
            static_dirs: strings(&["css", "js", "images", "assets", "public"]),
            routes: default_routes(),
            api_endpoints: strings(&[
                "/api/featured-photos",
                "/api/gallery",
                "/api/drive-folders",
                "/api/debug-gallery",
            ])
            .into_iter()
            .collect(),
            navigation_pages: strings(&[
                "/home",
                "/about",
                "/artists",
                "/schedule",
                "/gallery",
                "/tickets",
                "/donations",
            ])
            .into_iter()
            .collect(),
            data_route_prefixes: vec!["/gallery-data/".to_string()],
            cdn_hosts: strings(&[
                "fonts.googleapis.com",
                "fonts.gstatic.com",
                "cdn.jsdelivr.net",
                "cdnjs.cloudflare.com",
                "unpkg.com",
            ])
            .into_iter()
            .collect(),
            skip_rel: strings(&["dns-prefetch", "preconnect"]).into_iter().collect(),
            skip_patterns: Vec::new(),
            exclude_documents: strings(&[
                "node_modules",
                "coverage",
                "lcov-report",
                "test-reports",
            ]),
        }
    }
}

impl SiteConfig {
    pub const FILE_NAME: &'static str = "linkcheck.toml";

    /// Reads a config file. A missing file yields the defaults; a file that
    /// exists but cannot be read or parsed is an error.
    pub fn load(path: &Path) -> Result<Self> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "no config file, using built-in defaults");
                return Ok(SiteConfig::default());
            }
            Err(e) => return Err(Error::Io(e)),
        };

        let config: SiteConfig = toml::from_str(&content).map_err(|source| Error::ConfigParse {
            path: path.to_path_buf(),
            source,
        })?;

        // Surface bad skip patterns now rather than halfway through a run
        config.skip_regexes()?;
        Ok(config)
    }

    /// Like `load`, but never fails: any problem is logged and the built-in
    /// defaults are used instead.
    pub fn load_or_default(path: &Path) -> Self {
        match SiteConfig::load(path) {
            Ok(config) => config,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "ignoring unusable config, falling back to defaults");
                SiteConfig::default()
            }
        }
    }

    /// Compiles `skip_patterns`.
    pub fn skip_regexes(&self) -> Result<Vec<Regex>> {
        self.skip_patterns
            .iter()
            .map(|pattern| {
                Regex::new(pattern).map_err(|source| Error::InvalidPattern {
                    pattern: pattern.clone(),
                    source,
                })
            })
            .collect()
    }

    /// Every internal URL that currently resolves: `/`, the home route, each
    /// route whose file exists, one clean URL per page and the API endpoints.
    pub fn valid_internal_urls(&self, root: &Path) -> BTreeSet<String> {
        let mut urls = BTreeSet::new();
        urls.insert("/".to_string());
        urls.insert(self.home_route.clone());

        for (route, file) in &self.routes {
            if root.join(file.trim_start_matches('/')).is_file() {
                urls.insert(route.clone());
            }
        }

        if let Ok(entries) = std::fs::read_dir(root.join(&self.pages_dir)) {
            for entry in entries.flatten() {
                let path = entry.path();
                if path.extension().is_some_and(|ext| ext == "html") {
                    if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                        urls.insert(format!("/{}", stem));
                    }
                }
            }
        }

        urls.extend(self.api_endpoints.iter().cloned());
        urls
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

// The festival site's clean URLs, as served by its router
fn default_routes() -> BTreeMap<String, String> {
    let table = [
        ("/home", "pages/home.html"),
        ("/about", "pages/about.html"),
        ("/contact", "pages/contact.html"),
        ("/tickets", "pages/tickets.html"),
        ("/donations", "pages/donations.html"),
        ("/boulder-fest-2025", "pages/boulder-fest-2025-index.html"),
        ("/boulder-fest-2025/artists", "pages/boulder-fest-2025-artists.html"),
        ("/boulder-fest-2025/schedule", "pages/boulder-fest-2025-schedule.html"),
        ("/boulder-fest-2025/gallery", "pages/boulder-fest-2025-gallery.html"),
        ("/boulder-fest-2026", "pages/boulder-fest-2026-index.html"),
        ("/boulder-fest-2026/artists", "pages/boulder-fest-2026-artists.html"),
        ("/boulder-fest-2026/schedule", "pages/boulder-fest-2026-schedule.html"),
        ("/boulder-fest-2026/gallery", "pages/boulder-fest-2026-gallery.html"),
        ("/weekender-2026-09", "pages/weekender-2026-09-index.html"),
        ("/weekender-2026-09/artists", "pages/weekender-2026-09-artists.html"),
        ("/weekender-2026-09/schedule", "pages/weekender-2026-09-schedule.html"),
        ("/weekender-2026-09/gallery", "pages/weekender-2026-09-gallery.html"),
        ("/2026-artists", "pages/boulder-fest-2026-artists.html"),
        ("/2026-schedule", "pages/boulder-fest-2026-schedule.html"),
        ("/2026-gallery", "pages/boulder-fest-2026-gallery.html"),
        ("/2025-artists", "pages/boulder-fest-2025-artists.html"),
        ("/2025-schedule", "pages/boulder-fest-2025-schedule.html"),
        ("/2025-gallery", "pages/boulder-fest-2025-gallery.html"),
        ("/2026-sept-artists", "pages/weekender-2026-09-artists.html"),
        ("/2026-sept-schedule", "pages/weekender-2026-09-schedule.html"),
        ("/2026-sept-gallery", "pages/weekender-2026-09-gallery.html"),
        ("/gallery-2025", "pages/boulder-fest-2025-gallery.html"),
        ("/weekender-2026-09-tickets", "pages/tickets.html"),
        ("/artists", "pages/boulder-fest-2026-artists.html"),
        ("/schedule", "pages/boulder-fest-2026-schedule.html"),
        ("/gallery", "pages/boulder-fest-2026-gallery.html"),
    ];

    table
        .iter()
        .map(|(route, file)| (route.to_string(), file.to_string()))
        .collect()
}
