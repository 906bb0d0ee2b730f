use serde::{Deserialize, Serialize};

use quayside_core::EntityId;

use crate::cluster::ClusterId;
use crate::drafts::ResearchDrafts;

/// Port identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PortId(pub EntityId);

impl PortId {
    pub fn new(id: EntityId) -> Self {
        Self(id)
    }
}

impl core::fmt::Display for PortId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// A seaport within a cluster.
///
/// Canonical fields are authoritative business data, written only through the
/// review gate; `research` holds unreviewed drafts written by the job
/// pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Port {
    pub id: PortId,
    pub cluster_id: ClusterId,
    pub name: String,
    pub country: String,
    /// UN/LOCODE, e.g. "NLRTM".
    pub locode: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub port_authority: Option<String>,
    /// Governance form, e.g. "landlord", "tool port", "full service".
    pub governance_model: Option<String>,
    pub isps_compliant: Option<bool>,
    pub strategic_notes: Option<String>,
    pub annual_teu: Option<u64>,
    pub research: ResearchDrafts,
}

impl Port {
    pub fn new(
        cluster_id: ClusterId,
        name: impl Into<String>,
        country: impl Into<String>,
    ) -> Self {
        Self {
            id: PortId::new(EntityId::new()),
            cluster_id,
            name: name.into(),
            country: country.into(),
            locode: None,
            latitude: None,
            longitude: None,
            port_authority: None,
            governance_model: None,
            isps_compliant: None,
            strategic_notes: None,
            annual_teu: None,
            research: ResearchDrafts::default(),
        }
    }
}
