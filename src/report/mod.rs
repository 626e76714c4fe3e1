// src/report/mod.rs
// =============================================================================
// Runs the pipeline over a set of documents and aggregates the outcome.
//
//   Document -> extract_links -> Classifier -> Validator -> ValidationResult
//
// SiteChecker does the per-document work; ValidationReport is the aggregate.
// One unreadable document becomes a single failed "file" result and the run
// carries on with the others. A run reads the filesystem and nothing else,
// so running it twice over the same tree gives the same report.
//
// The accessibility audit is reported alongside but never fails a run.
// =============================================================================

mod render;

use crate::checker::{audit_accessibility, external_host, extract_links, Classifier, Validator};
use crate::config::SiteConfig;
use crate::document::Document;
use crate::error::{Error, Result};
use crate::model::{LinkCategory, ValidationResult};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Classifies and validates the links of whole documents.
#[derive(Debug, Clone)]
pub struct SiteChecker {
    classifier: Classifier,
    validator: Validator,
}

/// Every result for one document, in document order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentResults {
    pub document: String,
    pub results: Vec<ValidationResult>,
}

impl SiteChecker {
    /// Fails only if the config carries skip patterns that do not compile.
    pub fn new(root: impl Into<PathBuf>, config: SiteConfig) -> Result<Self> {
        Ok(SiteChecker {
            classifier: Classifier::new(&config),
            validator: Validator::new(root, config)?,
        })
    }

    pub fn root(&self) -> &Path {
        self.validator.root()
    }

    pub fn config(&self) -> &SiteConfig {
        self.validator.config()
    }

    /// Extracts, classifies and validates every link in one document.
    pub fn check_document(&self, document: &Document) -> DocumentResults {
        let text = match &document.content {
            Ok(text) => text,
            Err(e) => {
                warn!(document = %document.id, error = %e, "could not read document");
                return DocumentResults {
                    document: document.id.clone(),
                    results: vec![ValidationResult::unreadable_document(&document.id, e)],
                };
            }
        };

        let results: Vec<ValidationResult> = extract_links(text, &document.id)
            .into_iter()
            .map(|occurrence| {
                let class = self.classifier.classify(&occurrence);
                let result = self.validator.validate(occurrence, class, document.path.as_deref());
                if !result.is_valid() {
                    debug!(
                        document = %document.id,
                        line = result.occurrence().line_number,
                        url = %result.url(),
                        error = result.error_message().unwrap_or_default(),
                        "invalid link"
                    );
                }
                result
            })
            .collect();

        info!(document = %document.id, links = results.len(), "checked document");
        DocumentResults {
            document: document.id.clone(),
            results,
        }
    }

    /// Checks every document, keeping per-document results.
    pub fn check_documents<I>(&self, documents: I) -> Vec<DocumentResults>
    where
        I: IntoIterator<Item = Document>,
    {
        documents.into_iter().map(|document| self.check_document(&document)).collect()
    }

    /// Checks every document and aggregates the outcome.
    pub fn run<I>(&self, documents: I) -> ValidationReport
    where
        I: IntoIterator<Item = Document>,
    {
        ValidationReport::from_results(self.check_documents(documents))
    }
}

/// Headline counts.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub documents: usize,
    pub total_links: usize,
    pub valid_links: usize,
    pub invalid_links: usize,
    /// Distinct URLs across every document
    pub unique_links: usize,
    /// Valid links that were exempt from checking (already in valid_links)
    pub skipped_links: usize,
    /// Percentage of valid links, two decimals; 0 when there are no links
    pub validation_rate: f64,
    /// Advisory findings, not counted as invalid links
    pub accessibility_issues: usize,
}

/// One failing link, as listed in the report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailureRecord {
    pub file: String,
    pub line: u64,
    pub link: String,
    pub error: String,
}

/// One accessibility finding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccessibilityRecord {
    pub file: String,
    pub line: u64,
    pub link: String,
}

/// The aggregate outcome of a run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationReport {
    pub summary: Summary,
    /// Failures grouped by category label ("file" for unreadable documents)
    pub issues_by_category: BTreeMap<String, Vec<FailureRecord>>,
    /// How many links fell in each category
    pub category_breakdown: BTreeMap<String, usize>,
    /// Internal pages split into navigation and content links
    pub page_context_breakdown: BTreeMap<String, usize>,
    /// Hosts referenced by external links; informational only
    pub external_domains: BTreeSet<String>,
    /// Accessibility findings grouped by issue label
    pub accessibility: BTreeMap<String, Vec<AccessibilityRecord>>,
    pub per_document_results: BTreeMap<String, Vec<ValidationResult>>,
    /// Filled in by callers that know the project layout
    #[serde(skip_serializing_if = "BTreeSet::is_empty")]
    pub valid_internal_urls: BTreeSet<String>,
}

impl ValidationReport {
    /// Aggregates per-document results. Documents with the same id are merged.
    pub fn from_results(documents: Vec<DocumentResults>) -> Self {
        let mut per_document_results: BTreeMap<String, Vec<ValidationResult>> = BTreeMap::new();
        let mut issues_by_category: BTreeMap<String, Vec<FailureRecord>> = BTreeMap::new();
        let mut category_breakdown: BTreeMap<String, usize> = BTreeMap::new();
        let mut page_context_breakdown: BTreeMap<String, usize> = BTreeMap::new();
        let mut external_domains = BTreeSet::new();
        let mut accessibility: BTreeMap<String, Vec<AccessibilityRecord>> = BTreeMap::new();
        let mut unique = BTreeSet::new();
        let (mut total, mut valid, mut skipped) = (0, 0, 0);

        for DocumentResults { document, results } in documents {
            for result in &results {
                total += 1;
                *category_breakdown.entry(result.group_label().to_string()).or_insert(0) += 1;

                if let Some(context) = result.context() {
                    *page_context_breakdown.entry(context.label().to_string()).or_insert(0) += 1;
                }
                if result.category() == Some(LinkCategory::External) {
                    external_domains.extend(external_host(result.url()));
                }
                if result.category().is_some() {
                    unique.insert(result.url().to_string());
                    for issue in audit_accessibility(result.occurrence()) {
                        accessibility.entry(issue.label().to_string()).or_default().push(AccessibilityRecord {
                            file: document.clone(),
                            line: result.occurrence().line_number,
                            link: result.url().to_string(),
                        });
                    }
                }

                if result.is_valid() {
                    valid += 1;
                    if result.is_skipped() {
                        skipped += 1;
                    }
                } else {
                    issues_by_category
                        .entry(result.group_label().to_string())
                        .or_default()
                        .push(FailureRecord {
                            file: document.clone(),
                            line: result.occurrence().line_number,
                            link: result.url().to_string(),
                            error: result.error_message().unwrap_or_default().to_string(),
                        });
                }
            }
            per_document_results.entry(document).or_default().extend(results);
        }

        let summary = Summary {
            documents: per_document_results.len(),
            total_links: total,
            valid_links: valid,
            invalid_links: total - valid,
            unique_links: unique.len(),
            skipped_links: skipped,
            validation_rate: (rate(valid, total) * 100.0).round() / 100.0,
            accessibility_issues: accessibility.values().map(Vec::len).sum(),
        };

        ValidationReport {
            summary,
            issues_by_category,
            category_breakdown,
            page_context_breakdown,
            external_domains,
            accessibility,
            per_document_results,
            valid_internal_urls: BTreeSet::new(),
        }
    }

    /// `100 * valid / total`, or 0 for an empty report.
    pub fn validation_rate(&self) -> f64 {
        rate(self.summary.valid_links, self.summary.total_links)
    }

    /// True when no link failed. This is the run's exit signal.
    pub fn is_success(&self) -> bool {
        self.summary.invalid_links == 0
    }

    /// Every failure, in category then document order.
    pub fn failures(&self) -> impl Iterator<Item = (&str, &FailureRecord)> {
        self.issues_by_category
            .iter()
            .flat_map(|(category, records)| records.iter().map(move |record| (category.as_str(), record)))
    }

    /// Machine-readable form.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// One row per link, for spreadsheets.
    pub fn to_csv(&self) -> Result<String> {
        let mut buffer = Vec::new();
        {
            let mut writer = csv::Writer::from_writer(&mut buffer);
            for result in self.per_document_results.values().flatten() {
                writer.serialize(CsvRow::from(result))?;
            }
            writer.flush()?;
        }
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }

    /// Human-readable form.
    pub fn render_text(&self) -> String {
        render::render_text(self)
    }
}

#[derive(Serialize)]
struct CsvRow<'a> {
    href: &'a str,
    text: &'a str,
    source_file: &'a str,
    line_number: u64,
    tag: &'a str,
    category: &'static str,
    context: &'static str,
    is_valid: bool,
    error: &'a str,
    target: &'a str,
    rel: &'a str,
    aria_label: &'a str,
    class: &'a str,
}

impl<'a> From<&'a ValidationResult> for CsvRow<'a> {
    fn from(result: &'a ValidationResult) -> Self {
        let occurrence = result.occurrence();
        CsvRow {
            href: result.url(),
            text: &occurrence.text,
            source_file: &occurrence.source_document,
            line_number: occurrence.line_number,
            tag: &occurrence.tag,
            category: result.group_label(),
            context: result.context().map(|c| c.label()).unwrap_or_default(),
            is_valid: result.is_valid(),
            error: result.error_message().unwrap_or_default(),
            target: occurrence.attr("target").unwrap_or_default(),
            rel: occurrence.attr("rel").unwrap_or_default(),
            aria_label: occurrence.attr("aria-label").unwrap_or_default(),
            class: occurrence.attr("class").unwrap_or_default(),
        }
    }
}

fn rate(valid: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        valid as f64 / total as f64 * 100.0
    }
}

/// Saves a rendered report. The one failure that is fatal to a run.
pub fn write_report(path: &Path, contents: &str) -> Result<()> {
    std::fs::write(path, contents).map_err(|source| Error::ReportWrite {
        path: path.to_path_buf(),
        source,
    })
}
