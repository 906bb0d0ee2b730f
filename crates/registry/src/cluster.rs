use serde::{Deserialize, Serialize};

use quayside_core::EntityId;

/// Cluster identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClusterId(pub EntityId);

impl ClusterId {
    pub fn new(id: EntityId) -> Self {
        Self(id)
    }
}

impl core::fmt::Display for ClusterId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// A geographic grouping of ports researched and reviewed together
/// (e.g. "Rhine-Scheldt Delta", "Pearl River Delta").
///
/// Clusters are organizational only; they carry no draft-research fields and
/// are never themselves the target of a research job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortCluster {
    pub id: ClusterId,
    pub name: String,
    pub region: String,
    pub countries: Vec<String>,
    pub description: Option<String>,
}

impl PortCluster {
    pub fn new(name: impl Into<String>, region: impl Into<String>) -> Self {
        Self {
            id: ClusterId::new(EntityId::new()),
            name: name.into(),
            region: region.into(),
            countries: Vec::new(),
            description: None,
        }
    }
}
