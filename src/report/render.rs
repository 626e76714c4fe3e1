// src/report/render.rs
// =============================================================================
// Human-readable rendering of a ValidationReport.
//
// Sections, in order:
//   summary, links by category, page contexts, external domains,
//   broken links (grouped by category, with file:line and error),
//   accessibility, links per document, recommendations.
//
// The renderer only reads the report; it never changes a count.
// =============================================================================

use super::ValidationReport;
use crate::model::LinkCategory;

const RULE_WIDTH: usize = 80;

pub(super) fn render_text(report: &ValidationReport) -> String {
    let mut lines = Vec::new();
    let summary = &report.summary;

    lines.push("=".repeat(RULE_WIDTH));
    lines.push("FESTIVAL SITE LINK VALIDATION REPORT".to_string());
    lines.push("=".repeat(RULE_WIDTH));
    lines.push(String::new());

    section(&mut lines, "📊 SUMMARY");
    lines.push(format!("Documents Checked: {}", summary.documents));
    lines.push(format!("Total Links Tested: {}", summary.total_links));
    lines.push(format!("Unique Links: {}", summary.unique_links));
    lines.push(format!("✅ Valid Links: {}", summary.valid_links));
    lines.push(format!("❌ Invalid Links: {}", summary.invalid_links));
    lines.push(format!("⏭️  Skipped Links: {}", summary.skipped_links));
    lines.push(format!("Success Rate: {:.1}%", report.validation_rate()));
    lines.push(String::new());

    if !report.category_breakdown.is_empty() {
        section(&mut lines, "📂 LINKS BY CATEGORY");
        for (category, count) in &report.category_breakdown {
            lines.push(format!("{:<20} {:>5}", category, count));
        }
        lines.push(String::new());
    }

    if !report.page_context_breakdown.is_empty() {
        section(&mut lines, "🧭 PAGE LINK CONTEXT");
        for (context, count) in &report.page_context_breakdown {
            lines.push(format!("{:<20} {:>5}", context, count));
        }
        lines.push(String::new());
    }

    if !report.external_domains.is_empty() {
        section(&mut lines, "🌐 EXTERNAL DOMAINS");
        for domain in &report.external_domains {
            lines.push(format!("  • {}", domain));
        }
        lines.push(String::new());
    }

    if report.issues_by_category.is_empty() {
        lines.push("🎉 ALL LINKS ARE VALID!".to_string());
        lines.push(String::new());
    } else {
        section(&mut lines, "❌ BROKEN LINKS");
        for (category, records) in &report.issues_by_category {
            lines.push(format!("{} ({} broken):", category.to_uppercase(), records.len()));
            for record in records {
                lines.push(format!("  • {}", record.link));
                lines.push(format!("    Source: {}:{}", record.file, record.line));
                lines.push(format!("    Error: {}", record.error));
            }
            lines.push(String::new());
        }
    }

    if !report.accessibility.is_empty() {
        section(&mut lines, "♿ ACCESSIBILITY");
        for (issue, records) in &report.accessibility {
            lines.push(format!("{} ({}):", issue, records.len()));
            for record in records {
                lines.push(format!("  • {} ({}:{})", record.link, record.file, record.line));
            }
        }
        lines.push(String::new());
    }

    if !report.per_document_results.is_empty() {
        section(&mut lines, "📄 LINKS PER DOCUMENT");
        for (document, results) in &report.per_document_results {
            let invalid = results.iter().filter(|r| !r.is_valid()).count();
            let marker = if invalid == 0 { "✅" } else { "❌" };
            lines.push(format!(
                "{} {:<40} {:>4} links, {} invalid",
                marker,
                document,
                results.len(),
                invalid
            ));
        }
        lines.push(String::new());
    }

    let advice = recommendations(report);
    if !advice.is_empty() {
        section(&mut lines, "💡 RECOMMENDATIONS");
        for line in advice {
            lines.push(format!("  • {}", line));
        }
        lines.push(String::new());
    }

    lines.push("=".repeat(RULE_WIDTH));
    lines.join("\n")
}

fn section(lines: &mut Vec<String>, title: &str) {
    lines.push(title.to_string());
    lines.push("-".repeat(40));
}

// One hint per category that has failures, plus one for accessibility
fn recommendations(report: &ValidationReport) -> Vec<&'static str> {
    let failing = |category: LinkCategory| report.issues_by_category.contains_key(category.label());

    let mut advice = Vec::new();
    if failing(LinkCategory::InternalPage) {
        advice.push("Add missing pages or fix clean URLs in the route table");
    }
    if failing(LinkCategory::InternalAsset) {
        advice.push("Check asset paths against the static directories");
    }
    if failing(LinkCategory::SpecialRoute) {
        advice.push("Generate missing gallery data files under the public directory");
    }
    if failing(LinkCategory::ApiEndpoint) {
        advice.push("Register new API endpoints in the site configuration");
    }
    if failing(LinkCategory::External) {
        advice.push("Fix malformed external URLs and social media profile links");
    }
    if failing(LinkCategory::Mailto) {
        advice.push("Correct malformed email addresses");
    }
    if failing(LinkCategory::Fragment) {
        advice.push("Use anchors that start with a letter");
    }
    if report.issues_by_category.contains_key(crate::model::FILE_GROUP) {
        advice.push("Make sure every HTML document is readable UTF-8");
    }
    if !report.accessibility.is_empty() {
        advice.push("Label icon-only links, add alt text and rel=\"noopener\" where flagged");
    }
    advice
}
