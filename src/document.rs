// src/document.rs
// =============================================================================
// An HTML document handed to the pipeline.
//
// Documents come from outside the engine (the CLI walks the project with
// discover.rs; tests build them from strings). A document whose file could
// not be read still travels through the pipeline so the failure shows up in
// the report instead of aborting the run.
// =============================================================================

use std::io;
use std::path::{Path, PathBuf};

#[derive(Debug)]
pub struct Document {
    /// Name used in the report
    pub id: String,
    /// Location relative to the project root, used to resolve relative links
    pub path: Option<PathBuf>,
    /// The HTML text, or why it could not be read
    pub content: io::Result<String>,
}

impl Document {
    /// An in-memory document with no location on disk.
    pub fn from_text(id: impl Into<String>, text: impl Into<String>) -> Self {
        Document {
            id: id.into(),
            path: None,
            content: Ok(text.into()),
        }
    }

    /// An in-memory document that pretends to live at `path` (relative to
    /// the project root).
    pub fn at_path(path: impl Into<PathBuf>, text: impl Into<String>) -> Self {
        let path = path.into();
        Document {
            id: display_id(&path),
            path: Some(path),
            content: Ok(text.into()),
        }
    }

    /// Reads `relative` from under `root`. Read errors are kept, not returned.
    pub fn read(root: &Path, relative: impl Into<PathBuf>) -> Self {
        let relative = relative.into();
        let content = std::fs::read_to_string(root.join(&relative));
        Document {
            id: display_id(&relative),
            path: Some(relative),
            content,
        }
    }
}

// Forward slashes on every platform so reports are stable
fn display_id(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_keeps_io_errors() {
        let dir = tempfile::tempdir().unwrap();
        let doc = Document::read(dir.path(), "pages/missing.html");
        assert_eq!(doc.id, "pages/missing.html");
        assert!(doc.content.is_err());
    }

    #[test]
    fn test_read_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("index.html"), "<a href=\"/home\">").unwrap();
        let doc = Document::read(dir.path(), "index.html");
        assert_eq!(doc.content.unwrap(), "<a href=\"/home\">");
        assert_eq!(doc.path, Some(PathBuf::from("index.html")));
    }
}
