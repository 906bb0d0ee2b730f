//! Stale-job reaping: the sole recovery path for crashed or hung workers.

use std::sync::Arc;

use chrono::{Duration, Utc};
use tracing::warn;

use super::lifecycle::{JobLifecycle, LifecycleError};
use super::types::JobId;

/// Liveness window in seconds: a running job silent for longer is stale.
pub const STALE_WINDOW_SECS: i64 = 600;

/// Scans running jobs and force-fails those whose liveness signal expired.
///
/// Re-invocation only touches jobs still running, so reaping is idempotent.
/// There is no cancel API; this is how abandoned work gets resolved.
#[derive(Clone)]
pub struct StaleJobReaper {
    lifecycle: Arc<JobLifecycle>,
    window: Duration,
}

impl StaleJobReaper {
    pub fn new(lifecycle: Arc<JobLifecycle>) -> Self {
        Self {
            lifecycle,
            window: Duration::seconds(STALE_WINDOW_SECS),
        }
    }

    pub fn with_window(mut self, window: Duration) -> Self {
        self.window = window;
        self
    }

    /// Fail every stale running job; returns the reaped job ids.
    pub async fn reap(&self) -> Result<Vec<JobId>, LifecycleError> {
        let now = Utc::now();
        let mut reaped = Vec::new();

        for job in self.lifecycle.running().await? {
            if !job.is_stale(now, self.window) {
                continue;
            }

            let started = job
                .started_at
                .map(|t| t.to_rfc3339())
                .unwrap_or_else(|| "unknown".to_string());
            let error = format!(
                "no heartbeat for over {}s; job presumed dead (started at {started})",
                self.window.num_seconds()
            );

            warn!(job_id = %job.id, kind = %job.kind, %started, "reaping stale job");
            self.lifecycle.fail(job.id, error).await?;
            reaped.push(job.id);
        }

        Ok(reaped)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jobs::store::{InMemoryJobStore, JobStore};
    use crate::jobs::types::{JobStatus, ResearchJob};
    use crate::registry::InMemoryRegistry;
    use quayside_core::{EntityId, EntityKind};

    fn setup() -> (StaleJobReaper, Arc<InMemoryJobStore>) {
        let registry = Arc::new(InMemoryRegistry::new());
        let jobs = InMemoryJobStore::arc();
        let lifecycle = Arc::new(JobLifecycle::new(jobs.clone(), registry));
        let reaper = StaleJobReaper::new(lifecycle);
        (reaper, jobs)
    }

    /// Insert a running job with aged liveness timestamps directly into the
    /// store (the lifecycle would stamp them with now).
    async fn running_job(
        jobs: &InMemoryJobStore,
        heartbeat_age_mins: Option<i64>,
        started_age_mins: i64,
    ) -> JobId {
        let mut job = ResearchJob::new(EntityKind::Port, EntityId::new());
        job.mark_running();
        let now = Utc::now();
        job.started_at = Some(now - Duration::minutes(started_age_mins));
        job.last_heartbeat = heartbeat_age_mins.map(|m| now - Duration::minutes(m));
        let id = job.id;
        jobs.insert(job).await.unwrap();
        id
    }

    #[tokio::test]
    async fn reaps_expired_heartbeat_and_spares_fresh_one() {
        let (reaper, jobs) = setup();

        let stale = running_job(&jobs, Some(11), 30).await;
        let healthy = running_job(&jobs, Some(5), 30).await;

        let reaped = reaper.reap().await.unwrap();

        assert_eq!(reaped, vec![stale]);
        let stale_job = jobs.get(stale).await.unwrap().unwrap();
        assert!(matches!(stale_job.status, JobStatus::Failed { .. }));
        assert!(stale_job.error().unwrap().contains("no heartbeat for over 600s"));
        assert!(stale_job.error().unwrap().contains("started at"));

        let healthy_job = jobs.get(healthy).await.unwrap().unwrap();
        assert_eq!(healthy_job.status, JobStatus::Running);
    }

    #[tokio::test]
    async fn falls_back_to_start_time_when_no_heartbeat_recorded() {
        let (reaper, jobs) = setup();

        let stale = running_job(&jobs, None, 11).await;
        let fresh = running_job(&jobs, None, 2).await;

        let reaped = reaper.reap().await.unwrap();

        assert_eq!(reaped, vec![stale]);
        assert_eq!(
            jobs.get(fresh).await.unwrap().unwrap().status,
            JobStatus::Running
        );
    }

    #[tokio::test]
    async fn reaping_is_idempotent() {
        let (reaper, jobs) = setup();

        let stale = running_job(&jobs, Some(60), 90).await;

        let first = reaper.reap().await.unwrap();
        assert_eq!(first, vec![stale]);

        let second = reaper.reap().await.unwrap();
        assert!(second.is_empty());
    }

    #[tokio::test]
    async fn pending_jobs_are_never_reaped() {
        let (reaper, jobs) = setup();

        let mut job = ResearchJob::new(EntityKind::Port, EntityId::new());
        job.created_at = Utc::now() - Duration::hours(5);
        let id = job.id;
        jobs.insert(job).await.unwrap();

        assert!(reaper.reap().await.unwrap().is_empty());
        assert_eq!(jobs.get(id).await.unwrap().unwrap().status, JobStatus::Pending);
    }
}
