//! Draft-research fields shared by all researchable entities.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Unreviewed AI-produced research attached to an entity.
///
/// These fields are never read as canonical truth. The job pipeline clears
/// them when a new job is created and writes them when it completes; the
/// review gate is the only path from here into canonical fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResearchDrafts {
    pub last_deep_research_at: Option<DateTime<Utc>>,
    pub last_deep_research_summary: Option<String>,
    pub last_deep_research_report: Option<String>,
}

impl ResearchDrafts {
    /// Clear drafts so stale content is never displayed next to an in-flight
    /// job.
    pub fn clear(&mut self) {
        self.last_deep_research_at = None;
        self.last_deep_research_summary = None;
        self.last_deep_research_report = None;
    }

    /// Record a completed research run.
    pub fn record(&mut self, report: String, summary: String, at: DateTime<Utc>) {
        self.last_deep_research_report = Some(report);
        self.last_deep_research_summary = Some(summary);
        self.last_deep_research_at = Some(at);
    }
}
