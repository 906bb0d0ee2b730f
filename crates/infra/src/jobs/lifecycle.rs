//! Job lifecycle service: the only writer of job rows and of entity
//! draft-research fields.

use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use thiserror::Error;
use tokio::sync::broadcast;
use tracing::{debug, info};

use quayside_core::{EntityId, EntityKind};
use quayside_research::ResearchReport;

use crate::registry::{RegistryStore, RegistryStoreError};

use super::store::{JobStats, JobStore, JobStoreError};
use super::types::{JobId, JobStatus, ResearchJob};

#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error(transparent)]
    Store(#[from] JobStoreError),

    #[error(transparent)]
    Registry(#[from] RegistryStoreError),

    #[error("{kind} {entity_id} not found")]
    EntityNotFound {
        kind: EntityKind,
        entity_id: EntityId,
    },

    #[error("job not found: {0}")]
    JobNotFound(JobId),

    #[error("invalid transition: {0}")]
    InvalidTransition(String),
}

/// Outcome of an enqueue request. A dedup hit is not an error: the caller
/// gets the active job's identity and status instead of new work.
#[derive(Debug, Clone)]
pub enum EnqueueOutcome {
    Created(ResearchJob),
    AlreadyActive(ResearchJob),
}

impl EnqueueOutcome {
    pub fn job(&self) -> &ResearchJob {
        match self {
            EnqueueOutcome::Created(job) | EnqueueOutcome::AlreadyActive(job) => job,
        }
    }

    pub fn is_created(&self) -> bool {
        matches!(self, EnqueueOutcome::Created(_))
    }
}

/// Lifecycle transition notification, broadcast to realtime subscribers.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobEvent {
    pub job_id: JobId,
    #[serde(rename = "type")]
    pub kind: EntityKind,
    pub entity_id: EntityId,
    pub status: &'static str,
    pub progress: u8,
    pub error: Option<String>,
}

impl JobEvent {
    fn from_job(job: &ResearchJob) -> Self {
        Self {
            job_id: job.id,
            kind: job.kind,
            entity_id: job.entity_id,
            status: job.status.as_str(),
            progress: job.progress,
            error: job.error().map(str::to_string),
        }
    }
}

/// Durable state machine for research jobs.
///
/// `Pending → Running → {Completed, Failed}`; terminal jobs are immutable
/// history. All transitions go through this service so draft-field side
/// effects and event broadcasts stay consistent with the job row.
pub struct JobLifecycle {
    jobs: Arc<dyn JobStore>,
    registry: Arc<dyn RegistryStore>,
    events: broadcast::Sender<JobEvent>,
}

impl JobLifecycle {
    pub fn new(jobs: Arc<dyn JobStore>, registry: Arc<dyn RegistryStore>) -> Self {
        let (events, _) = broadcast::channel(64);
        Self {
            jobs,
            registry,
            events,
        }
    }

    /// Subscribe to lifecycle transitions (lossy; no backpressure on the
    /// pipeline).
    pub fn subscribe(&self) -> broadcast::Receiver<JobEvent> {
        self.events.subscribe()
    }

    fn emit(&self, job: &ResearchJob) {
        let _ = self.events.send(JobEvent::from_job(job));
    }

    /// Request research for an entity.
    ///
    /// Dedup: when an active job covers the pair, that job is returned and no
    /// new work is scheduled. Otherwise a pending job is inserted and the
    /// entity's draft fields are cleared so stale content is never displayed
    /// next to an in-flight job.
    pub async fn enqueue(
        &self,
        kind: EntityKind,
        entity_id: EntityId,
    ) -> Result<EnqueueOutcome, LifecycleError> {
        if !self.registry.contains(kind, entity_id).await? {
            return Err(LifecycleError::EntityNotFound { kind, entity_id });
        }

        if let Some(active) = self.jobs.find_active(kind, entity_id).await? {
            debug!(job_id = %active.id, %kind, %entity_id, "research already active");
            return Ok(EnqueueOutcome::AlreadyActive(active));
        }

        self.registry.clear_drafts(kind, entity_id).await?;

        let job = ResearchJob::new(kind, entity_id);
        match self.jobs.insert(job.clone()).await {
            Ok(_) => {
                info!(job_id = %job.id, %kind, %entity_id, "research job enqueued");
                self.emit(&job);
                Ok(EnqueueOutcome::Created(job))
            }
            // Lost a race with a concurrent enqueue: surface the winner.
            Err(JobStoreError::ActiveConflict(existing)) => {
                let job = self
                    .jobs
                    .get(existing)
                    .await?
                    .ok_or(LifecycleError::JobNotFound(existing))?;
                Ok(EnqueueOutcome::AlreadyActive(job))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Claim a specific pending job.
    pub async fn claim(&self, job_id: JobId) -> Result<ResearchJob, LifecycleError> {
        let mut job = self.load(job_id).await?;
        if job.status != JobStatus::Pending {
            return Err(LifecycleError::InvalidTransition(format!(
                "cannot claim job {job_id} in status {}",
                job.status.as_str()
            )));
        }
        job.mark_running();
        self.jobs.update(&job).await?;
        self.emit(&job);
        Ok(job)
    }

    /// Claim the oldest pending job, if any (worker poll path; the store
    /// performs the transition atomically).
    pub async fn claim_next(&self) -> Result<Option<ResearchJob>, LifecycleError> {
        let claimed = self.jobs.claim_next_pending().await?;
        if let Some(job) = &claimed {
            debug!(job_id = %job.id, kind = %job.kind, "claimed research job");
            self.emit(job);
        }
        Ok(claimed)
    }

    /// Renew the liveness signal of a running job.
    pub async fn heartbeat(&self, job_id: JobId) -> Result<(), LifecycleError> {
        let mut job = self.load(job_id).await?;
        if job.status != JobStatus::Running {
            return Err(LifecycleError::InvalidTransition(format!(
                "cannot heartbeat job {job_id} in status {}",
                job.status.as_str()
            )));
        }
        job.heartbeat();
        self.jobs.update(&job).await?;
        Ok(())
    }

    /// Monotonic progress update of a running job.
    pub async fn progress(&self, job_id: JobId, percent: u8) -> Result<(), LifecycleError> {
        let mut job = self.load(job_id).await?;
        if job.status != JobStatus::Running {
            return Err(LifecycleError::InvalidTransition(format!(
                "cannot update progress of job {job_id} in status {}",
                job.status.as_str()
            )));
        }
        job.set_progress(percent);
        self.jobs.update(&job).await?;
        self.emit(&job);
        Ok(())
    }

    /// Terminal success: write the report to the entity's drafts and close
    /// the job.
    pub async fn complete(
        &self,
        job_id: JobId,
        report: &ResearchReport,
    ) -> Result<ResearchJob, LifecycleError> {
        let mut job = self.load(job_id).await?;
        if job.status != JobStatus::Running {
            return Err(LifecycleError::InvalidTransition(format!(
                "cannot complete job {job_id} in status {}",
                job.status.as_str()
            )));
        }

        self.registry
            .record_research(
                job.kind,
                job.entity_id,
                report.report.clone(),
                report.summary.clone(),
                Utc::now(),
            )
            .await?;

        job.mark_completed();
        self.jobs.update(&job).await?;
        info!(job_id = %job_id, kind = %job.kind, "research job completed");
        self.emit(&job);
        Ok(job)
    }

    /// Terminal failure. Valid from any active state (a pending job can fail
    /// when its entity disappears before the worker gets to it).
    pub async fn fail(
        &self,
        job_id: JobId,
        error: impl Into<String>,
    ) -> Result<ResearchJob, LifecycleError> {
        let mut job = self.load(job_id).await?;
        if job.status.is_terminal() {
            return Err(LifecycleError::InvalidTransition(format!(
                "cannot fail job {job_id} in status {}",
                job.status.as_str()
            )));
        }
        job.mark_failed(error);
        self.jobs.update(&job).await?;
        info!(job_id = %job_id, error = job.error().unwrap_or(""), "research job failed");
        self.emit(&job);
        Ok(job)
    }

    pub async fn get(&self, job_id: JobId) -> Result<Option<ResearchJob>, LifecycleError> {
        Ok(self.jobs.get(job_id).await?)
    }

    pub async fn running(&self) -> Result<Vec<ResearchJob>, LifecycleError> {
        Ok(self.jobs.list_running().await?)
    }

    pub async fn recent(&self, limit: usize) -> Result<Vec<ResearchJob>, LifecycleError> {
        Ok(self.jobs.list_recent(limit).await?)
    }

    pub async fn stats(&self) -> Result<JobStats, LifecycleError> {
        Ok(self.jobs.stats().await?)
    }

    async fn load(&self, job_id: JobId) -> Result<ResearchJob, LifecycleError> {
        self.jobs
            .get(job_id)
            .await?
            .ok_or(LifecycleError::JobNotFound(job_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jobs::store::InMemoryJobStore;
    use crate::registry::InMemoryRegistry;
    use quayside_registry::{Port, PortCluster};

    async fn setup() -> (JobLifecycle, Arc<InMemoryRegistry>, EntityId) {
        let registry = Arc::new(InMemoryRegistry::new());
        let cluster = PortCluster::new("Test Cluster", "Test Region");
        let mut port = Port::new(cluster.id, "Hamburg", "Germany");
        port.research
            .record("old report".to_string(), "old summary".to_string(), Utc::now());
        let entity_id = port.id.0;

        registry.insert_cluster(cluster).await.unwrap();
        registry.insert_port(port).await.unwrap();

        let lifecycle = JobLifecycle::new(InMemoryJobStore::arc(), registry.clone());
        (lifecycle, registry, entity_id)
    }

    fn report() -> ResearchReport {
        ResearchReport {
            report: "## Governance & Port Authority\n\nHPA.".to_string(),
            summary: "HPA.".to_string(),
        }
    }

    #[tokio::test]
    async fn enqueue_clears_drafts_and_creates_pending_job() {
        let (lifecycle, registry, entity_id) = setup().await;

        let outcome = lifecycle.enqueue(EntityKind::Port, entity_id).await.unwrap();
        assert!(outcome.is_created());
        assert_eq!(outcome.job().status, JobStatus::Pending);
        assert_eq!(outcome.job().progress, 0);

        let port = registry
            .get_port(quayside_registry::PortId::new(entity_id))
            .await
            .unwrap()
            .unwrap();
        assert!(port.research.last_deep_research_report.is_none());
        assert!(port.research.last_deep_research_at.is_none());
    }

    #[tokio::test]
    async fn duplicate_enqueue_returns_existing_job() {
        let (lifecycle, _registry, entity_id) = setup().await;

        let first = lifecycle.enqueue(EntityKind::Port, entity_id).await.unwrap();
        let second = lifecycle.enqueue(EntityKind::Port, entity_id).await.unwrap();

        assert!(first.is_created());
        assert!(!second.is_created());
        assert_eq!(first.job().id, second.job().id);

        let stats = lifecycle.stats().await.unwrap();
        assert_eq!(stats.pending, 1);
    }

    #[tokio::test]
    async fn enqueue_unknown_entity_is_a_validation_error() {
        let (lifecycle, _registry, _entity_id) = setup().await;

        let err = lifecycle
            .enqueue(EntityKind::Port, EntityId::new())
            .await
            .unwrap_err();
        assert!(matches!(err, LifecycleError::EntityNotFound { .. }));
    }

    #[tokio::test]
    async fn complete_writes_drafts_and_closes_job_once() {
        let (lifecycle, registry, entity_id) = setup().await;

        let job = lifecycle
            .enqueue(EntityKind::Port, entity_id)
            .await
            .unwrap()
            .job()
            .clone();
        lifecycle.claim(job.id).await.unwrap();

        let completed = lifecycle.complete(job.id, &report()).await.unwrap();
        assert_eq!(completed.status, JobStatus::Completed);
        assert_eq!(completed.progress, 100);
        let completed_at = completed.completed_at.unwrap();

        let port = registry
            .get_port(quayside_registry::PortId::new(entity_id))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(
            port.research.last_deep_research_summary.as_deref(),
            Some("HPA.")
        );
        assert!(port.research.last_deep_research_at.is_some());

        // Terminal jobs are immutable history.
        assert!(lifecycle.complete(job.id, &report()).await.is_err());
        assert!(lifecycle.fail(job.id, "nope").await.is_err());
        let stored = lifecycle.get(job.id).await.unwrap().unwrap();
        assert_eq!(stored.completed_at, Some(completed_at));
    }

    #[tokio::test]
    async fn claim_requires_pending() {
        let (lifecycle, _registry, entity_id) = setup().await;

        let job = lifecycle
            .enqueue(EntityKind::Port, entity_id)
            .await
            .unwrap()
            .job()
            .clone();
        lifecycle.claim(job.id).await.unwrap();

        assert!(matches!(
            lifecycle.claim(job.id).await,
            Err(LifecycleError::InvalidTransition(_))
        ));
    }

    #[tokio::test]
    async fn completed_at_not_set_before_terminal_transition() {
        let (lifecycle, _registry, entity_id) = setup().await;

        let job = lifecycle
            .enqueue(EntityKind::Port, entity_id)
            .await
            .unwrap()
            .job()
            .clone();
        assert!(job.completed_at.is_none());

        let running = lifecycle.claim(job.id).await.unwrap();
        assert!(running.completed_at.is_none());

        lifecycle.progress(job.id, 50).await.unwrap();
        let stored = lifecycle.get(job.id).await.unwrap().unwrap();
        assert!(stored.completed_at.is_none());
        assert_eq!(stored.progress, 50);
    }

    #[tokio::test]
    async fn events_are_broadcast_per_transition() {
        let (lifecycle, _registry, entity_id) = setup().await;
        let mut events = lifecycle.subscribe();

        let job = lifecycle
            .enqueue(EntityKind::Port, entity_id)
            .await
            .unwrap()
            .job()
            .clone();
        lifecycle.claim(job.id).await.unwrap();
        lifecycle.fail(job.id, "boom").await.unwrap();

        assert_eq!(events.recv().await.unwrap().status, "pending");
        assert_eq!(events.recv().await.unwrap().status, "running");
        let failed = events.recv().await.unwrap();
        assert_eq!(failed.status, "failed");
        assert_eq!(failed.error.as_deref(), Some("boom"));
    }
}
