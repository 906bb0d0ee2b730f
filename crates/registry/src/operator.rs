use serde::{Deserialize, Serialize};

use quayside_core::EntityId;

use crate::drafts::ResearchDrafts;

/// Terminal operator identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OperatorId(pub EntityId);

impl OperatorId {
    pub fn new(id: EntityId) -> Self {
        Self(id)
    }
}

impl core::fmt::Display for OperatorId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// A company operating one or more terminals (e.g. global stevedores,
/// carrier-owned terminal arms).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TerminalOperator {
    pub id: OperatorId,
    pub name: String,
    pub headquarters_country: Option<String>,
    pub parent_company: Option<String>,
    pub countries_of_operation: Vec<String>,
    pub strategic_notes: Option<String>,
    pub research: ResearchDrafts,
}

impl TerminalOperator {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: OperatorId::new(EntityId::new()),
            name: name.into(),
            headquarters_country: None,
            parent_company: None,
            countries_of_operation: Vec::new(),
            strategic_notes: None,
            research: ResearchDrafts::default(),
        }
    }
}
