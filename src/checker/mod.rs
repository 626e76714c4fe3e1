// src/checker/mod.rs
// =============================================================================
// This module contains the link checking stages.
//
// Submodules:
// - html: extracts link occurrences from HTML text
// - classify: assigns every occurrence exactly one LinkCategory
// - validate: one validation rule per category, against the project on disk
// - external: offline shape checks for external URLs
// - http: optional live requests for external URLs
// - accessibility: advisory audit of link markup
//
// Extraction and classification never touch the filesystem; only the
// validators do, and only to read.
// =============================================================================

mod accessibility;
mod classify;
mod external;
mod html;
pub mod http;
mod validate;

pub use accessibility::{audit_accessibility, AccessibilityIssue};
pub use classify::{strip_query_and_fragment, Classifier};
pub use external::{external_host, validate_external};
pub use html::{extract_links, is_checkable, parse_srcset};
pub use validate::Validator;
