// tests/pipeline.rs
// End-to-end runs over small projects built in a temp directory.

use fest_link_guardian::discover::find_documents;
use fest_link_guardian::{Document, LinkCategory, SiteChecker, SiteConfig, ValidationResult};
use std::fs;
use std::io;
use std::path::Path;

fn write(root: &Path, relative: &str, contents: &str) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, contents).unwrap();
}

fn project() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    write(root, "pages/home.html", "<html></html>");
    write(root, "pages/about.html", "<html></html>");
    write(root, "css/base.css", "body {}");
    write(root, "public/gallery-data/2025.json", "{}");
    write(
        root,
        "index.html",
        r##"<!DOCTYPE html>
<html>
<head>
  <link rel="stylesheet" href="/css/base.css?v=2">
  <link rel="preconnect" href="https://fonts.gstatic.com">
</head>
<body>
  <header><nav><a href="/about">About</a></nav></header>
  <a href="/home">Home</a>
  <a href="/nonexistent-page">Gone</a>
  <img src="/css/base.css?v=2">
  <a href="mailto:foo@bar">Mail</a>
  <a href="/api/image-proxy/AbC123xyz9">Photo</a>
  <a href="/api/image-proxy/short">Bad photo</a>
  <a href="https://www.instagram.com/someuser/">Instagram</a>
  <a href="https://instagram.com/">Instagram root</a>
  <a href="/gallery-data/2025.json">Data</a>
  <a href="#tickets">Jump</a>
  <script>var u = "<a href='/not-a-link'>";</script>
</body>
</html>
"##,
    );
    dir
}

fn by_url<'a>(results: &'a [ValidationResult], url: &str) -> &'a ValidationResult {
    results
        .iter()
        .find(|r| r.url() == url)
        .unwrap_or_else(|| panic!("no result for {}", url))
}

#[test]
fn test_site_scenarios() {
    let dir = project();
    let checker = SiteChecker::new(dir.path(), SiteConfig::default()).unwrap();
    let report = checker.run(find_documents(dir.path(), &SiteConfig::default()));
    let results = &report.per_document_results["index.html"];

    let home = by_url(results, "/home");
    assert_eq!(home.category(), Some(LinkCategory::InternalPage));
    assert!(home.is_valid());

    let missing = by_url(results, "/nonexistent-page");
    assert_eq!(missing.category(), Some(LinkCategory::InternalPage));
    assert!(!missing.is_valid());
    assert!(missing.error_message().unwrap().to_lowercase().contains("no matching page"));

    let image = results.iter().find(|r| r.occurrence().tag == "img").unwrap();
    assert_eq!(image.category(), Some(LinkCategory::InternalAsset));
    assert!(image.is_valid());

    let mail = by_url(results, "mailto:foo@bar");
    assert_eq!(mail.category(), Some(LinkCategory::Mailto));
    assert!(!mail.is_valid());

    let proxy = by_url(results, "/api/image-proxy/AbC123xyz9");
    assert_eq!(proxy.category(), Some(LinkCategory::ApiEndpoint));
    assert!(proxy.is_valid());
    assert!(!by_url(results, "/api/image-proxy/short").is_valid());

    let profile = by_url(results, "https://www.instagram.com/someuser/");
    assert_eq!(profile.category(), Some(LinkCategory::External));
    assert!(profile.is_valid());
    let bare = by_url(results, "https://instagram.com/");
    assert!(!bare.is_valid());
    assert!(bare.error_message().unwrap().contains("instagram"));

    assert_eq!(by_url(results, "/gallery-data/2025.json").category(), Some(LinkCategory::SpecialRoute));
    assert!(by_url(results, "/gallery-data/2025.json").is_valid());
    assert!(by_url(results, "https://fonts.gstatic.com").is_skipped());
    assert!(results.iter().all(|r| r.url() != "/not-a-link"));

    // Nav link is tagged as navigation, the body link as content
    assert_eq!(report.page_context_breakdown["navigation"], 1);
    assert_eq!(report.page_context_breakdown["content"], 2);
}

#[test]
fn test_totals_add_up() {
    let dir = project();
    let checker = SiteChecker::new(dir.path(), SiteConfig::default()).unwrap();
    let report = checker.run(find_documents(dir.path(), &SiteConfig::default()));

    let summary = &report.summary;
    let all: usize = report.per_document_results.values().map(Vec::len).sum();
    assert_eq!(summary.total_links, all);
    assert_eq!(summary.total_links, summary.valid_links + summary.invalid_links);
    assert_eq!(summary.invalid_links, report.failures().count());
    assert_eq!(summary.invalid_links, 4);
    assert!(!report.is_success());

    for results in report.per_document_results.values() {
        for result in results {
            assert_eq!(result.is_valid(), result.error_message().is_none());
        }
    }
}

#[test]
fn test_runs_are_idempotent() {
    let dir = project();
    let checker = SiteChecker::new(dir.path(), SiteConfig::default()).unwrap();
    let first = checker.run(find_documents(dir.path(), &SiteConfig::default()));
    let second = checker.run(find_documents(dir.path(), &SiteConfig::default()));
    assert_eq!(first, second);
    assert_eq!(first.to_json().unwrap(), second.to_json().unwrap());
}

#[test]
fn test_empty_document_set() {
    let dir = tempfile::tempdir().unwrap();
    let checker = SiteChecker::new(dir.path(), SiteConfig::default()).unwrap();
    let report = checker.run(Vec::new());
    assert_eq!(report.summary.total_links, 0);
    assert_eq!(report.validation_rate(), 0.0);
    assert!(report.is_success());
}

#[test]
fn test_unreadable_document_does_not_stop_the_run() {
    let dir = project();
    let checker = SiteChecker::new(dir.path(), SiteConfig::default()).unwrap();

    let broken = Document {
        id: "pages/broken.html".to_string(),
        path: Some("pages/broken.html".into()),
        content: Err(io::Error::new(io::ErrorKind::InvalidData, "stream did not contain valid UTF-8")),
    };
    let fine = Document::at_path("pages/about.html", r#"<a href="../index.html">Back</a>"#);

    let report = checker.run(vec![broken, fine]);
    assert_eq!(report.summary.total_links, 2);
    assert_eq!(report.summary.invalid_links, 1);

    let failure = &report.issues_by_category["file"][0];
    assert_eq!(failure.file, "pages/broken.html");
    assert!(failure.error.starts_with("Error reading file"));
    assert!(report.per_document_results["pages/about.html"][0].is_valid());
}

#[test]
fn test_relative_link_without_context() {
    let dir = project();
    let checker = SiteChecker::new(dir.path(), SiteConfig::default()).unwrap();
    let report = checker.run(vec![Document::from_text("snippet", r#"<a href="about.html">x</a>"#)]);

    let result = &report.per_document_results["snippet"][0];
    assert!(!result.is_valid());
    assert!(result.error_message().unwrap().contains("without source document context"));
}

#[test]
fn test_accessibility_and_exports() {
    let dir = project();
    let checker = SiteChecker::new(dir.path(), SiteConfig::default()).unwrap();
    let report = checker.run(find_documents(dir.path(), &SiteConfig::default()));

    // The stylesheet is referenced by both <link> and <img>
    assert_eq!(report.summary.unique_links, report.summary.total_links - 1);

    let missing_alt = &report.accessibility["image_without_alt"];
    assert_eq!(missing_alt.len(), 1);
    assert_eq!(missing_alt[0].line, 11);
    assert_eq!(report.summary.accessibility_issues, 1);

    let about = by_url(&report.per_document_results["index.html"], "/about");
    assert_eq!(about.occurrence().text, "About");

    let csv = report.to_csv().unwrap();
    assert_eq!(csv.lines().count(), report.summary.total_links + 1);
    assert!(csv.contains("/about,About,index.html,8,a,internal_page,navigation,true,"));
}
