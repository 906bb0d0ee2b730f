//! Registry storage: trait seam plus the in-memory implementation.
//!
//! The relational schema behind this is out of scope; a SQL implementation
//! plugs in behind the same trait. List-valued fields (countries, cargo
//! types) stay native sequences here — any text encoding is confined to that
//! persistence boundary.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use quayside_core::{EntityId, EntityKind};
use quayside_registry::{
    ClusterId, OperatorId, Port, PortCluster, PortId, Terminal, TerminalId, TerminalOperator,
};
use quayside_research::ResearchSubject;

/// Registry store error.
#[derive(Debug, Clone, thiserror::Error)]
pub enum RegistryStoreError {
    #[error("entity not found")]
    NotFound,

    #[error("storage error: {0}")]
    Storage(String),
}

/// Storage seam for the entity registry.
///
/// Draft-research fields are only ever mutated through `clear_drafts` /
/// `record_research` (called by the job lifecycle); canonical fields are only
/// ever mutated through the `update_*` methods (called by the review gate).
#[async_trait]
pub trait RegistryStore: Send + Sync {
    async fn insert_cluster(&self, cluster: PortCluster) -> Result<(), RegistryStoreError>;
    async fn get_cluster(&self, id: ClusterId) -> Result<Option<PortCluster>, RegistryStoreError>;
    async fn list_clusters(&self) -> Result<Vec<PortCluster>, RegistryStoreError>;

    async fn insert_port(&self, port: Port) -> Result<(), RegistryStoreError>;
    async fn get_port(&self, id: PortId) -> Result<Option<Port>, RegistryStoreError>;
    async fn list_ports(&self) -> Result<Vec<Port>, RegistryStoreError>;
    async fn ports_in_cluster(&self, cluster: ClusterId) -> Result<Vec<Port>, RegistryStoreError>;
    async fn update_port(&self, port: Port) -> Result<(), RegistryStoreError>;

    async fn insert_terminal(&self, terminal: Terminal) -> Result<(), RegistryStoreError>;
    async fn get_terminal(&self, id: TerminalId) -> Result<Option<Terminal>, RegistryStoreError>;
    async fn list_terminals(&self) -> Result<Vec<Terminal>, RegistryStoreError>;
    async fn update_terminal(&self, terminal: Terminal) -> Result<(), RegistryStoreError>;

    async fn insert_operator(&self, operator: TerminalOperator)
        -> Result<(), RegistryStoreError>;
    async fn get_operator(
        &self,
        id: OperatorId,
    ) -> Result<Option<TerminalOperator>, RegistryStoreError>;
    async fn list_operators(&self) -> Result<Vec<TerminalOperator>, RegistryStoreError>;
    async fn update_operator(&self, operator: TerminalOperator)
        -> Result<(), RegistryStoreError>;

    /// Whether a researchable entity of `kind` with this id exists.
    async fn contains(&self, kind: EntityKind, id: EntityId) -> Result<bool, RegistryStoreError>;

    /// Clear the entity's draft-research fields (job start).
    async fn clear_drafts(&self, kind: EntityKind, id: EntityId)
        -> Result<(), RegistryStoreError>;

    /// Write the entity's draft-research fields (job completion).
    async fn record_research(
        &self,
        kind: EntityKind,
        id: EntityId,
        report: String,
        summary: String,
        at: DateTime<Utc>,
    ) -> Result<(), RegistryStoreError>;

    /// Snapshot of the identifying attributes the query planner needs.
    async fn research_subject(
        &self,
        kind: EntityKind,
        id: EntityId,
    ) -> Result<Option<ResearchSubject>, RegistryStoreError>;
}

#[derive(Debug, Default)]
struct RegistryState {
    clusters: HashMap<EntityId, PortCluster>,
    ports: HashMap<EntityId, Port>,
    terminals: HashMap<EntityId, Terminal>,
    operators: HashMap<EntityId, TerminalOperator>,
}

/// In-memory registry for tests/dev and single-node runs.
#[derive(Debug, Default)]
pub struct InMemoryRegistry {
    state: RwLock<RegistryState>,
}

impl InMemoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RegistryStore for InMemoryRegistry {
    async fn insert_cluster(&self, cluster: PortCluster) -> Result<(), RegistryStoreError> {
        self.state
            .write()
            .await
            .clusters
            .insert(cluster.id.0, cluster);
        Ok(())
    }

    async fn get_cluster(&self, id: ClusterId) -> Result<Option<PortCluster>, RegistryStoreError> {
        Ok(self.state.read().await.clusters.get(&id.0).cloned())
    }

    async fn list_clusters(&self) -> Result<Vec<PortCluster>, RegistryStoreError> {
        let mut clusters: Vec<_> = self.state.read().await.clusters.values().cloned().collect();
        clusters.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(clusters)
    }

    async fn insert_port(&self, port: Port) -> Result<(), RegistryStoreError> {
        self.state.write().await.ports.insert(port.id.0, port);
        Ok(())
    }

    async fn get_port(&self, id: PortId) -> Result<Option<Port>, RegistryStoreError> {
        Ok(self.state.read().await.ports.get(&id.0).cloned())
    }

    async fn list_ports(&self) -> Result<Vec<Port>, RegistryStoreError> {
        let mut ports: Vec<_> = self.state.read().await.ports.values().cloned().collect();
        ports.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(ports)
    }

    async fn ports_in_cluster(&self, cluster: ClusterId) -> Result<Vec<Port>, RegistryStoreError> {
        let mut ports: Vec<_> = self
            .state
            .read()
            .await
            .ports
            .values()
            .filter(|p| p.cluster_id == cluster)
            .cloned()
            .collect();
        ports.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(ports)
    }

    async fn update_port(&self, port: Port) -> Result<(), RegistryStoreError> {
        let mut state = self.state.write().await;
        if !state.ports.contains_key(&port.id.0) {
            return Err(RegistryStoreError::NotFound);
        }
        state.ports.insert(port.id.0, port);
        Ok(())
    }

    async fn insert_terminal(&self, terminal: Terminal) -> Result<(), RegistryStoreError> {
        self.state
            .write()
            .await
            .terminals
            .insert(terminal.id.0, terminal);
        Ok(())
    }

    async fn get_terminal(&self, id: TerminalId) -> Result<Option<Terminal>, RegistryStoreError> {
        Ok(self.state.read().await.terminals.get(&id.0).cloned())
    }

    async fn list_terminals(&self) -> Result<Vec<Terminal>, RegistryStoreError> {
        let mut terminals: Vec<_> = self
            .state
            .read()
            .await
            .terminals
            .values()
            .cloned()
            .collect();
        terminals.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(terminals)
    }

    async fn update_terminal(&self, terminal: Terminal) -> Result<(), RegistryStoreError> {
        let mut state = self.state.write().await;
        if !state.terminals.contains_key(&terminal.id.0) {
            return Err(RegistryStoreError::NotFound);
        }
        state.terminals.insert(terminal.id.0, terminal);
        Ok(())
    }

    async fn insert_operator(
        &self,
        operator: TerminalOperator,
    ) -> Result<(), RegistryStoreError> {
        self.state
            .write()
            .await
            .operators
            .insert(operator.id.0, operator);
        Ok(())
    }

    async fn get_operator(
        &self,
        id: OperatorId,
    ) -> Result<Option<TerminalOperator>, RegistryStoreError> {
        Ok(self.state.read().await.operators.get(&id.0).cloned())
    }

    async fn list_operators(&self) -> Result<Vec<TerminalOperator>, RegistryStoreError> {
        let mut operators: Vec<_> = self
            .state
            .read()
            .await
            .operators
            .values()
            .cloned()
            .collect();
        operators.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(operators)
    }

    async fn update_operator(
        &self,
        operator: TerminalOperator,
    ) -> Result<(), RegistryStoreError> {
        let mut state = self.state.write().await;
        if !state.operators.contains_key(&operator.id.0) {
            return Err(RegistryStoreError::NotFound);
        }
        state.operators.insert(operator.id.0, operator);
        Ok(())
    }

    async fn contains(&self, kind: EntityKind, id: EntityId) -> Result<bool, RegistryStoreError> {
        let state = self.state.read().await;
        Ok(match kind {
            EntityKind::Port => state.ports.contains_key(&id),
            EntityKind::Terminal => state.terminals.contains_key(&id),
            EntityKind::TerminalOperator => state.operators.contains_key(&id),
        })
    }

    async fn clear_drafts(
        &self,
        kind: EntityKind,
        id: EntityId,
    ) -> Result<(), RegistryStoreError> {
        let mut state = self.state.write().await;
        match kind {
            EntityKind::Port => {
                let port = state.ports.get_mut(&id).ok_or(RegistryStoreError::NotFound)?;
                port.research.clear();
            }
            EntityKind::Terminal => {
                let terminal = state
                    .terminals
                    .get_mut(&id)
                    .ok_or(RegistryStoreError::NotFound)?;
                terminal.research.clear();
            }
            EntityKind::TerminalOperator => {
                let operator = state
                    .operators
                    .get_mut(&id)
                    .ok_or(RegistryStoreError::NotFound)?;
                operator.research.clear();
            }
        }
        Ok(())
    }

    async fn record_research(
        &self,
        kind: EntityKind,
        id: EntityId,
        report: String,
        summary: String,
        at: DateTime<Utc>,
    ) -> Result<(), RegistryStoreError> {
        let mut state = self.state.write().await;
        match kind {
            EntityKind::Port => {
                let port = state.ports.get_mut(&id).ok_or(RegistryStoreError::NotFound)?;
                port.research.record(report, summary, at);
            }
            EntityKind::Terminal => {
                let terminal = state
                    .terminals
                    .get_mut(&id)
                    .ok_or(RegistryStoreError::NotFound)?;
                terminal.research.record(report, summary, at);
            }
            EntityKind::TerminalOperator => {
                let operator = state
                    .operators
                    .get_mut(&id)
                    .ok_or(RegistryStoreError::NotFound)?;
                operator.research.record(report, summary, at);
            }
        }
        Ok(())
    }

    async fn research_subject(
        &self,
        kind: EntityKind,
        id: EntityId,
    ) -> Result<Option<ResearchSubject>, RegistryStoreError> {
        let state = self.state.read().await;
        let subject = match kind {
            EntityKind::Port => state.ports.get(&id).map(|p| ResearchSubject::Port {
                name: p.name.clone(),
                country: p.country.clone(),
                locode: p.locode.clone(),
            }),
            EntityKind::Terminal => state.terminals.get(&id).map(|t| {
                let port_name = state
                    .ports
                    .get(&t.port_id.0)
                    .map(|p| p.name.clone())
                    .unwrap_or_else(|| "unknown port".to_string());
                ResearchSubject::Terminal {
                    name: t.name.clone(),
                    port_name,
                    operator: t.operator_name.clone(),
                }
            }),
            EntityKind::TerminalOperator => {
                state
                    .operators
                    .get(&id)
                    .map(|o| ResearchSubject::TerminalOperator {
                        name: o.name.clone(),
                        headquarters: o.headquarters_country.clone(),
                    })
            }
        };
        Ok(subject)
    }
}
