//! Query planning: subject in, ordered query set out.
//!
//! Pure and deterministic, no I/O. Each emitted category maps to exactly one
//! canonical report section (see [`QueryCategory::header`]); the Deep model
//! tier is reserved for categories that hinge on official-authority sources.

use crate::query::{ModelTier, QueryCategory, QueryConfig};
use crate::subject::ResearchSubject;

const ANALYST_PROMPT: &str = "You are a maritime infrastructure analyst. \
Answer from authoritative, verifiable sources; name the source where possible \
and state clearly when information could not be confirmed.";

/// Produce the ordered query set for a subject.
pub fn plan(subject: &ResearchSubject) -> Vec<QueryConfig> {
    let mut queries: Vec<QueryConfig> = QueryCategory::for_kind(subject.kind())
        .iter()
        .enumerate()
        .map(|(i, category)| QueryConfig {
            category: *category,
            query: query_text(*category, subject),
            priority: i as u8 + 1,
            model: model_for(*category),
            system_prompt: Some(ANALYST_PROMPT.to_string()),
        })
        .collect();

    queries.sort_by_key(|q| q.priority);
    queries
}

fn model_for(category: QueryCategory) -> ModelTier {
    match category {
        // Official-authority lookups: port governance records and corporate
        // registries reward the stronger model.
        QueryCategory::Governance | QueryCategory::CorporateStructure => ModelTier::Deep,
        _ => ModelTier::Standard,
    }
}

fn query_text(category: QueryCategory, subject: &ResearchSubject) -> String {
    match (category, subject) {
        (
            QueryCategory::Governance,
            ResearchSubject::Port { name, country, locode },
        ) => {
            let locode = locode
                .as_deref()
                .map(|l| format!(" (UN/LOCODE {l})"))
                .unwrap_or_default();
            format!(
                "Who governs the port of {name}, {country}{locode}? Identify the \
                 port authority, its governance model (landlord, tool, full \
                 service), ownership, and any concession framework for terminals."
            )
        }
        (
            QueryCategory::IspsRisk,
            ResearchSubject::Port { name, country, .. },
        ) => format!(
            "Assess ISPS Code compliance and enforcement at the port of {name}, \
             {country}: current security level practices, recent port state \
             control findings, and any published security incidents or advisories."
        ),
        (
            QueryCategory::StrategicIntelligence,
            ResearchSubject::Port { name, country, .. },
        ) => format!(
            "What is strategically notable about the port of {name}, {country}? \
             Cover hinterland connections, major trade lanes, expansion projects, \
             foreign investment or operator concessions, and competitive position \
             against neighbouring ports."
        ),
        (
            QueryCategory::Location,
            ResearchSubject::Terminal { name, port_name, .. },
        ) => format!(
            "Where exactly is the {name} terminal within the port of {port_name}? \
             Give coordinates, berth layout, and nautical access (channel depth, \
             tidal windows, lock or river constraints)."
        ),
        (
            QueryCategory::CapacityOperations,
            ResearchSubject::Terminal { name, port_name, operator },
        ) => {
            let operator = operator
                .as_deref()
                .map(|o| format!(" operated by {o}"))
                .unwrap_or_default();
            format!(
                "Describe capacity and operations of the {name} terminal{operator} \
                 in the port of {port_name}: quay length, berth count, maximum \
                 draft, equipment, annual throughput, and cargo types handled."
            )
        }
        (
            QueryCategory::CorporateStructure,
            ResearchSubject::TerminalOperator { name, headquarters },
        ) => {
            let hq = headquarters
                .as_deref()
                .map(|h| format!(" headquartered in {h}"))
                .unwrap_or_default();
            format!(
                "Detail the ownership and corporate structure of terminal operator \
                 {name}{hq}: parent company, major shareholders, state ownership \
                 if any, and corporate registry facts."
            )
        }
        (
            QueryCategory::GlobalFootprint,
            ResearchSubject::TerminalOperator { name, .. },
        ) => format!(
            "Map the global footprint of terminal operator {name}: countries of \
             operation, flagship terminals, recent acquisitions or divestments, \
             and total handled volume."
        ),
        // for_kind never pairs a category with a foreign subject kind.
        (category, subject) => {
            unreachable!("category {category:?} not planned for {:?}", subject.kind())
        }
    }
}
