use serde::Deserialize;
use serde_json::json;

use quayside_infra::ResearchJob;
use quayside_registry::{ClusterId, PortId, TerminalType};

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize)]
pub struct CreateClusterRequest {
    pub name: String,
    pub region: String,
    #[serde(default)]
    pub countries: Vec<String>,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreatePortRequest {
    pub cluster_id: ClusterId,
    pub name: String,
    pub country: String,
    pub locode: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub port_authority: Option<String>,
    pub governance_model: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateTerminalRequest {
    pub port_id: PortId,
    pub name: String,
    pub terminal_type: TerminalType,
    pub operator_name: Option<String>,
    #[serde(default)]
    pub cargo_types: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateOperatorRequest {
    pub name: String,
    pub headquarters_country: Option<String>,
    pub parent_company: Option<String>,
    #[serde(default)]
    pub countries_of_operation: Vec<String>,
}

/// Body for `/research/pipeline/start`. Fields are optional so that a missing
/// `clusterId` can be answered with a descriptive 400 instead of a rejection.
#[derive(Debug, Deserialize)]
pub struct PipelineStartRequest {
    #[serde(rename = "clusterId")]
    pub cluster_id: Option<String>,
    #[serde(rename = "portIds")]
    pub port_ids: Option<Vec<String>>,
}

/// Body for the deep-research apply endpoints. `data_to_update` carries the
/// typed per-entity review schema; `approved_fields` is the reviewer's
/// allow-list.
#[derive(Debug, Deserialize)]
pub struct ApplyRequest<T> {
    pub data_to_update: Option<T>,
    #[serde(default)]
    pub approved_fields: Vec<String>,
}

// -------------------------
// Response mapping
// -------------------------

/// Full job record as served by `/research/jobs/:id`.
pub fn job_to_json(job: &ResearchJob) -> serde_json::Value {
    json!({
        "id": job.id.to_string(),
        "type": job.kind.as_str(),
        "entityId": job.entity_id.to_string(),
        "status": job.status.as_str(),
        "progress": job.progress,
        "error": job.error(),
        "createdAt": job.created_at,
        "startedAt": job.started_at,
        "completedAt": job.completed_at,
        "lastHeartbeat": job.last_heartbeat,
    })
}
