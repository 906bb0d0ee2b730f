use serde::{Deserialize, Serialize};

use quayside_core::EntityId;

use crate::drafts::ResearchDrafts;
use crate::port::PortId;

/// Terminal identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TerminalId(pub EntityId);

impl TerminalId {
    pub fn new(id: EntityId) -> Self {
        Self(id)
    }
}

impl core::fmt::Display for TerminalId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// Primary cargo handling profile of a terminal.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TerminalType {
    Container,
    DryBulk,
    LiquidBulk,
    RoRo,
    Multipurpose,
}

impl TerminalType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TerminalType::Container => "container",
            TerminalType::DryBulk => "dry_bulk",
            TerminalType::LiquidBulk => "liquid_bulk",
            TerminalType::RoRo => "roro",
            TerminalType::Multipurpose => "multipurpose",
        }
    }
}

/// A cargo terminal inside a port.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Terminal {
    pub id: TerminalId,
    pub port_id: PortId,
    pub name: String,
    pub terminal_type: TerminalType,
    /// Operating company name; linkage by name rather than id because many
    /// terminals are run by operators not (yet) tracked in the registry.
    pub operator_name: Option<String>,
    pub berth_count: Option<u32>,
    pub quay_length_m: Option<u32>,
    pub max_draft_m: Option<f64>,
    pub annual_capacity_teu: Option<u64>,
    pub cargo_types: Vec<String>,
    pub research: ResearchDrafts,
}

impl Terminal {
    pub fn new(
        port_id: PortId,
        name: impl Into<String>,
        terminal_type: TerminalType,
    ) -> Self {
        Self {
            id: TerminalId::new(EntityId::new()),
            port_id,
            name: name.into(),
            terminal_type,
            operator_name: None,
            berth_count: None,
            quay_length_m: None,
            max_draft_m: None,
            annual_capacity_teu: None,
            cargo_types: Vec::new(),
            research: ResearchDrafts::default(),
        }
    }
}
