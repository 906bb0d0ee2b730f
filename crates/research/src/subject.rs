//! Planner input: a snapshot of the identifying attributes of the entity
//! under research.
//!
//! Subjects are provided by callers (infra/workers); this crate stays
//! storage-agnostic. The closed enum makes an unknown entity type
//! unrepresentable, so planning cannot fail at runtime.

use quayside_core::EntityKind;

#[derive(Debug, Clone, PartialEq)]
pub enum ResearchSubject {
    Port {
        name: String,
        country: String,
        locode: Option<String>,
    },
    Terminal {
        name: String,
        port_name: String,
        operator: Option<String>,
    },
    TerminalOperator {
        name: String,
        headquarters: Option<String>,
    },
}

impl ResearchSubject {
    pub fn kind(&self) -> EntityKind {
        match self {
            ResearchSubject::Port { .. } => EntityKind::Port,
            ResearchSubject::Terminal { .. } => EntityKind::Terminal,
            ResearchSubject::TerminalOperator { .. } => EntityKind::TerminalOperator,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            ResearchSubject::Port { name, .. }
            | ResearchSubject::Terminal { name, .. }
            | ResearchSubject::TerminalOperator { name, .. } => name,
        }
    }
}
