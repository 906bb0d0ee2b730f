//! Report assembly: per-category results into one multi-section report plus a
//! short summary.

use quayside_core::EntityKind;

use crate::query::{QueryCategory, QueryOutcome, QueryResult};

const SUMMARY_MAX_CHARS: usize = 280;

/// Assembled research output, written to an entity's draft fields on job
/// completion.
#[derive(Debug, Clone, PartialEq)]
pub struct ResearchReport {
    pub report: String,
    pub summary: String,
}

/// Merge per-category results into the canonical report.
///
/// Every category of the kind gets a section in canonical order, whatever
/// order results arrived in. Headers are unconditional: a failed or missing
/// category renders its header over a failure marker, so downstream consumers
/// can count expected vs. found sections without parsing ambiguity.
pub fn assemble(kind: EntityKind, results: &[QueryResult]) -> ResearchReport {
    let mut report = String::new();
    let mut summary = String::new();

    for category in QueryCategory::for_kind(kind) {
        let body = match results.iter().find(|r| r.category == *category) {
            Some(QueryResult {
                outcome: QueryOutcome::Answer(text),
                ..
            }) => {
                if summary.is_empty() {
                    summary = lead_line(text);
                }
                text.trim().to_string()
            }
            Some(QueryResult {
                outcome: QueryOutcome::Failed(reason),
                ..
            }) => format!("_Research unavailable: {reason}_"),
            None => "_Research unavailable: no result recorded_".to_string(),
        };

        report.push_str(category.header());
        report.push_str("\n\n");
        report.push_str(&body);
        report.push_str("\n\n");
    }

    ResearchReport {
        report: report.trim_end().to_string(),
        summary,
    }
}

/// First non-empty line, truncated on a char boundary.
fn lead_line(text: &str) -> String {
    let line = text
        .lines()
        .map(str::trim)
        .find(|l| !l.is_empty())
        .unwrap_or_default();

    if line.chars().count() <= SUMMARY_MAX_CHARS {
        return line.to_string();
    }

    let truncated: String = line.chars().take(SUMMARY_MAX_CHARS).collect();
    format!("{}…", truncated.trim_end())
}
