//! Query configuration and per-category results.

use serde::{Deserialize, Serialize};

use quayside_core::EntityKind;

/// Topical subdivision of research for an entity kind.
///
/// The set is closed per kind and each category maps to exactly one canonical
/// report-section header; the assembler counts on both.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryCategory {
    // Ports
    Governance,
    IspsRisk,
    StrategicIntelligence,
    // Terminals
    Location,
    CapacityOperations,
    // Terminal operators
    CorporateStructure,
    GlobalFootprint,
}

impl QueryCategory {
    /// The fixed category set for a kind, in canonical report order.
    pub fn for_kind(kind: EntityKind) -> &'static [QueryCategory] {
        match kind {
            EntityKind::Port => &[
                QueryCategory::Governance,
                QueryCategory::IspsRisk,
                QueryCategory::StrategicIntelligence,
            ],
            EntityKind::Terminal => &[
                QueryCategory::Location,
                QueryCategory::CapacityOperations,
            ],
            EntityKind::TerminalOperator => &[
                QueryCategory::CorporateStructure,
                QueryCategory::GlobalFootprint,
            ],
        }
    }

    /// Canonical section header for this category.
    pub fn header(&self) -> &'static str {
        match self {
            QueryCategory::Governance => "## Governance & Port Authority",
            QueryCategory::IspsRisk => "## ISPS Risk & Enforcement",
            QueryCategory::StrategicIntelligence => "## Strategic Intelligence",
            QueryCategory::Location => "## Location",
            QueryCategory::CapacityOperations => "## Capacity & Operations",
            QueryCategory::CorporateStructure => "## Ownership & Corporate Structure",
            QueryCategory::GlobalFootprint => "## Global Footprint",
        }
    }
}

/// Provider-model hint, letting the planner trade cost against source
/// authority per category.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelTier {
    /// Default search model.
    Standard,
    /// Stronger/slower model reserved for official-authority lookups.
    Deep,
}

/// A single planned provider query. Ephemeral; never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryConfig {
    pub category: QueryCategory,
    pub query: String,
    /// Lower runs first when dispatch is sequential; also the planner's
    /// output order.
    pub priority: u8,
    pub model: ModelTier,
    pub system_prompt: Option<String>,
}

/// Result of executing one query. Failures are data, not errors: one query's
/// failure must never abort the job.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryResult {
    pub category: QueryCategory,
    pub outcome: QueryOutcome,
}

#[derive(Debug, Clone, PartialEq)]
pub enum QueryOutcome {
    Answer(String),
    Failed(String),
}

impl QueryOutcome {
    pub fn is_answer(&self) -> bool {
        matches!(self, QueryOutcome::Answer(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_sets_are_fixed_per_kind() {
        assert_eq!(QueryCategory::for_kind(EntityKind::Port).len(), 3);
        assert_eq!(QueryCategory::for_kind(EntityKind::Terminal).len(), 2);
        assert_eq!(QueryCategory::for_kind(EntityKind::TerminalOperator).len(), 2);
    }

    #[test]
    fn every_category_has_a_distinct_header() {
        let all = [
            EntityKind::Port,
            EntityKind::Terminal,
            EntityKind::TerminalOperator,
        ]
        .iter()
        .flat_map(|k| QueryCategory::for_kind(*k))
        .map(|c| c.header())
        .collect::<Vec<_>>();

        let mut deduped = all.clone();
        deduped.sort();
        deduped.dedup();
        assert_eq!(all.len(), deduped.len());
    }
}
