// src/lib.rs
// =============================================================================
// fest-link-guardian: offline link validation for the festival static site.
//
// Every href/src/action in the site's HTML is extracted with its line number,
// put in exactly one category, and checked against the project on disk, the
// clean-URL route table and a few format rules. The result is a report that
// says, per link, valid or not and why.
//
// Module map:
// - checker:  extraction, classification and per-category validation
// - config:   SiteConfig, the project layout and route table
// - discover: finds the HTML documents of a project
// - document: a document handed to the pipeline
// - model:    the data types every stage shares
// - report:   runs the pipeline and aggregates the outcome
// - error:    the library's error type
// =============================================================================

pub mod checker;
pub mod config;
pub mod discover;
pub mod document;
pub mod error;
pub mod model;
pub mod report;

pub use config::SiteConfig;
pub use document::Document;
pub use error::{Error, Result};
pub use model::{Classification, LinkCategory, LinkOccurrence, PageContext, ValidationResult};
pub use report::{
    write_report, AccessibilityRecord, DocumentResults, FailureRecord, SiteChecker, Summary, ValidationReport,
};
