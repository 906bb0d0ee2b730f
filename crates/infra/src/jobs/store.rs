//! Job storage: trait seam plus the in-memory implementation.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use quayside_core::{EntityId, EntityKind};

use super::types::{JobId, JobStatus, ResearchJob};

/// Job store error.
#[derive(Debug, Clone, thiserror::Error)]
pub enum JobStoreError {
    #[error("job not found: {0}")]
    NotFound(JobId),

    #[error("job already exists: {0}")]
    AlreadyExists(JobId),

    /// An active (pending/running) job already covers the same entity.
    #[error("active job already exists for entity: {0}")]
    ActiveConflict(JobId),

    #[error("storage error: {0}")]
    Storage(String),
}

/// Aggregate queue counts.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
pub struct JobStats {
    pub pending: usize,
    pub running: usize,
    pub completed: usize,
    pub failed: usize,
}

/// Job store abstraction.
///
/// The in-memory implementation below backs tests and single-node
/// deployments; a SQL implementation must honour the same contracts, in
/// particular `insert`'s active-uniqueness check and `claim_next_pending`'s
/// conditional transition (`UPDATE … SET status = 'running' WHERE status =
/// 'pending'`, verifying exactly one row was affected) so two workers cannot
/// claim the same job.
#[async_trait]
pub trait JobStore: Send + Sync {
    /// Insert a new job. Fails with [`JobStoreError::ActiveConflict`] when an
    /// active job for the same (kind, entity) pair exists — this is the
    /// store-level guarantee behind the single-active-job invariant.
    async fn insert(&self, job: ResearchJob) -> Result<JobId, JobStoreError>;

    async fn get(&self, job_id: JobId) -> Result<Option<ResearchJob>, JobStoreError>;

    async fn update(&self, job: &ResearchJob) -> Result<(), JobStoreError>;

    /// The pending/running job for an entity, if any.
    async fn find_active(
        &self,
        kind: EntityKind,
        entity_id: EntityId,
    ) -> Result<Option<ResearchJob>, JobStoreError>;

    /// Atomically claim the oldest pending job: transition it to running and
    /// return it. `None` when nothing is claimable.
    async fn claim_next_pending(&self) -> Result<Option<ResearchJob>, JobStoreError>;

    async fn list_running(&self) -> Result<Vec<ResearchJob>, JobStoreError>;

    /// Most recent jobs first.
    async fn list_recent(&self, limit: usize) -> Result<Vec<ResearchJob>, JobStoreError>;

    async fn stats(&self) -> Result<JobStats, JobStoreError>;
}

/// In-memory job store for tests/dev and single-node runs.
#[derive(Debug, Default)]
pub struct InMemoryJobStore {
    jobs: RwLock<HashMap<JobId, ResearchJob>>,
}

impl InMemoryJobStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn arc() -> Arc<Self> {
        Arc::new(Self::new())
    }
}

#[async_trait]
impl JobStore for InMemoryJobStore {
    async fn insert(&self, job: ResearchJob) -> Result<JobId, JobStoreError> {
        let mut jobs = self.jobs.write().await;
        if jobs.contains_key(&job.id) {
            return Err(JobStoreError::AlreadyExists(job.id));
        }
        if let Some(active) = jobs
            .values()
            .find(|j| j.kind == job.kind && j.entity_id == job.entity_id && j.is_active())
        {
            return Err(JobStoreError::ActiveConflict(active.id));
        }
        let id = job.id;
        jobs.insert(id, job);
        Ok(id)
    }

    async fn get(&self, job_id: JobId) -> Result<Option<ResearchJob>, JobStoreError> {
        Ok(self.jobs.read().await.get(&job_id).cloned())
    }

    async fn update(&self, job: &ResearchJob) -> Result<(), JobStoreError> {
        let mut jobs = self.jobs.write().await;
        if !jobs.contains_key(&job.id) {
            return Err(JobStoreError::NotFound(job.id));
        }
        jobs.insert(job.id, job.clone());
        Ok(())
    }

    async fn find_active(
        &self,
        kind: EntityKind,
        entity_id: EntityId,
    ) -> Result<Option<ResearchJob>, JobStoreError> {
        Ok(self
            .jobs
            .read()
            .await
            .values()
            .find(|j| j.kind == kind && j.entity_id == entity_id && j.is_active())
            .cloned())
    }

    async fn claim_next_pending(&self) -> Result<Option<ResearchJob>, JobStoreError> {
        let mut jobs = self.jobs.write().await;

        let next = jobs
            .values()
            .filter(|j| j.status == JobStatus::Pending)
            .min_by_key(|j| j.created_at)
            .map(|j| j.id);

        if let Some(job_id) = next {
            if let Some(job) = jobs.get_mut(&job_id) {
                job.mark_running();
                return Ok(Some(job.clone()));
            }
        }

        Ok(None)
    }

    async fn list_running(&self) -> Result<Vec<ResearchJob>, JobStoreError> {
        let mut running: Vec<_> = self
            .jobs
            .read()
            .await
            .values()
            .filter(|j| j.status == JobStatus::Running)
            .cloned()
            .collect();
        running.sort_by_key(|j| j.created_at);
        Ok(running)
    }

    async fn list_recent(&self, limit: usize) -> Result<Vec<ResearchJob>, JobStoreError> {
        let mut all: Vec<_> = self.jobs.read().await.values().cloned().collect();
        all.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        all.truncate(limit);
        Ok(all)
    }

    async fn stats(&self) -> Result<JobStats, JobStoreError> {
        let jobs = self.jobs.read().await;
        let mut stats = JobStats::default();
        for job in jobs.values() {
            match &job.status {
                JobStatus::Pending => stats.pending += 1,
                JobStatus::Running => stats.running += 1,
                JobStatus::Completed => stats.completed += 1,
                JobStatus::Failed { .. } => stats.failed += 1,
            }
        }
        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_job() -> ResearchJob {
        ResearchJob::new(EntityKind::Port, EntityId::new())
    }

    #[tokio::test]
    async fn insert_and_claim_fifo() {
        let store = InMemoryJobStore::new();

        let first = store.insert(test_job()).await.unwrap();
        let second = store.insert(test_job()).await.unwrap();

        let claimed = store.claim_next_pending().await.unwrap().unwrap();
        assert_eq!(claimed.id, first);
        assert_eq!(claimed.status, JobStatus::Running);
        assert!(claimed.last_heartbeat.is_some());

        let claimed = store.claim_next_pending().await.unwrap().unwrap();
        assert_eq!(claimed.id, second);

        assert!(store.claim_next_pending().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn insert_rejects_second_active_job_for_entity() {
        let store = InMemoryJobStore::new();
        let entity_id = EntityId::new();

        let first = store
            .insert(ResearchJob::new(EntityKind::Port, entity_id))
            .await
            .unwrap();

        let err = store
            .insert(ResearchJob::new(EntityKind::Port, entity_id))
            .await
            .unwrap_err();
        assert!(matches!(err, JobStoreError::ActiveConflict(id) if id == first));

        // Same entity id under a different kind is a different pair.
        store
            .insert(ResearchJob::new(EntityKind::Terminal, entity_id))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn terminal_job_frees_the_entity_for_new_work() {
        let store = InMemoryJobStore::new();
        let entity_id = EntityId::new();

        store
            .insert(ResearchJob::new(EntityKind::Port, entity_id))
            .await
            .unwrap();
        let mut claimed = store.claim_next_pending().await.unwrap().unwrap();
        claimed.mark_failed("boom");
        store.update(&claimed).await.unwrap();

        assert!(store
            .find_active(EntityKind::Port, entity_id)
            .await
            .unwrap()
            .is_none());
        store
            .insert(ResearchJob::new(EntityKind::Port, entity_id))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn stats_track_statuses() {
        let store = InMemoryJobStore::new();
        for _ in 0..3 {
            store.insert(test_job()).await.unwrap();
        }
        store.claim_next_pending().await.unwrap();

        let stats = store.stats().await.unwrap();
        assert_eq!(stats.pending, 2);
        assert_eq!(stats.running, 1);
    }
}
