//! The closed set of researchable entity kinds.

use serde::{Deserialize, Serialize};

/// Kind of entity a research job targets.
///
/// Closed but extensible: adding a kind means adding its query categories and
/// canonical report headers as well, so downstream matches are exhaustive on
/// purpose.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Port,
    Terminal,
    TerminalOperator,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Port => "port",
            EntityKind::Terminal => "terminal",
            EntityKind::TerminalOperator => "terminal_operator",
        }
    }
}

impl core::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}
