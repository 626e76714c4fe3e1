// src/discover.rs
// =============================================================================
// Finds the HTML documents of a project on disk.
//
// Scanned: every `*.html` directly in the project root, and every `*.html`
// anywhere under the pages directory. Skipped: build and test output
// (node_modules, coverage reports, ...), test fixtures (`*test*.html`),
// generated favicon pages, and whatever `exclude_documents` adds.
//
// Output is sorted by path so two runs over the same tree list documents in
// the same order.
// =============================================================================

use crate::config::SiteConfig;
use crate::document::Document;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::{DirEntry, WalkDir};

/// Lists and reads the project's HTML documents.
///
/// Files that cannot be read are still returned; their read error travels
/// with the document and shows up in the report.
pub fn find_documents(root: &Path, config: &SiteConfig) -> Vec<Document> {
    let mut paths = Vec::new();

    // Root level only
    paths.extend(walk(root, Some(1), root, config));
    // The whole pages tree
    let pages = root.join(&config.pages_dir);
    if pages.is_dir() {
        paths.extend(walk(&pages, None, root, config));
    }

    paths.sort();
    paths.dedup();
    debug!(root = %root.display(), count = paths.len(), "discovered documents");

    paths.into_iter().map(|relative| Document::read(root, relative)).collect()
}

// Relative paths of the HTML files under `dir` that should be scanned
fn walk(dir: &Path, max_depth: Option<usize>, root: &Path, config: &SiteConfig) -> Vec<PathBuf> {
    let mut walker = WalkDir::new(dir).sort_by_file_name();
    if let Some(depth) = max_depth {
        walker = walker.max_depth(depth);
    }

    walker
        .into_iter()
        .filter_entry(|entry| entry.depth() == 0 || !is_excluded_dir(entry, config))
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file() && is_scannable_file(entry))
        .filter_map(|entry| {
            let relative = entry.path().strip_prefix(root).ok()?.to_path_buf();
            let relative_str = relative.to_string_lossy().replace('\\', "/");
            if config.exclude_documents.iter().any(|fragment| relative_str.contains(fragment.as_str())) {
                return None;
            }
            Some(relative)
        })
        .collect()
}

fn is_excluded_dir(entry: &DirEntry, config: &SiteConfig) -> bool {
    entry.file_type().is_dir()
        && entry
            .file_name()
            .to_str()
            .is_some_and(|name| name.starts_with('.') || config.exclude_documents.iter().any(|e| e == name))
}

fn is_scannable_file(entry: &DirEntry) -> bool {
    let Some(name) = entry.file_name().to_str() else {
        return false;
    };
    let lower = name.to_ascii_lowercase();
    lower.ends_with(".html") && !lower.contains("test") && !lower.starts_with("favicon-")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn touch(root: &Path, relative: &str) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "<html></html>").unwrap();
    }

    fn ids(docs: &[Document]) -> Vec<&str> {
        docs.iter().map(|d| d.id.as_str()).collect()
    }

    #[test]
    fn test_finds_root_and_pages_documents() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        touch(root, "index.html");
        touch(root, "404.html");
        touch(root, "pages/about.html");
        touch(root, "pages/admin/dashboard.html");
        touch(root, "pages/notes.txt");
        touch(root, "other/stray.html");

        let docs = find_documents(root, &SiteConfig::default());
        assert_eq!(
            ids(&docs),
            vec!["404.html", "index.html", "pages/about.html", "pages/admin/dashboard.html"]
        );
        assert!(docs.iter().all(|d| d.content.is_ok()));
    }

    #[test]
    fn test_skips_test_fixtures_and_build_output() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        touch(root, "index.html");
        touch(root, "link-test.html");
        touch(root, "favicon-preview.html");
        touch(root, "pages/node_modules/pkg/readme.html");
        touch(root, "pages/coverage/index.html");
        touch(root, "pages/drafts/wip.html");

        let config = SiteConfig {
            exclude_documents: vec!["coverage".to_string(), "node_modules".to_string(), "drafts".to_string()],
            ..SiteConfig::default()
        };
        let docs = find_documents(root, &config);
        assert_eq!(ids(&docs), vec!["index.html"]);
    }

    #[test]
    fn test_missing_pages_dir_is_fine() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "index.html");
        assert_eq!(find_documents(dir.path(), &SiteConfig::default()).len(), 1);
    }
}
