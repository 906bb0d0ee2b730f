//! Background research worker.
//!
//! Polls the job store for pending work, runs the plan → fan-out → assemble
//! pipeline per job and resolves the job through the lifecycle service. Job
//! execution is decoupled from any HTTP request lifetime: a crash here leaves
//! a running row behind, which the reaper resolves on its next pass.

use std::sync::Arc;
use std::time::Duration;

use futures::stream::{FuturesUnordered, StreamExt};
use thiserror::Error;
use tokio::sync::{mpsc, Semaphore};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use quayside_core::{EntityId, EntityKind};
use quayside_research::{plan, assemble, ResearchExecutor, ResearchReport};

use crate::jobs::lifecycle::{JobLifecycle, LifecycleError};
use crate::jobs::types::ResearchJob;
use crate::registry::{RegistryStore, RegistryStoreError};

/// Worker tuning.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// How often to poll for claimable jobs.
    pub poll_interval: Duration,
    /// Liveness renewal cadence; must be materially shorter than the
    /// reaper's staleness window.
    pub heartbeat_interval: Duration,
    /// Concurrently running jobs (each job additionally fans out its own
    /// category queries).
    pub max_concurrent_jobs: usize,
    /// Name for logging.
    pub name: String,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(2),
            heartbeat_interval: Duration::from_secs(60),
            max_concurrent_jobs: 2,
            name: "research-worker".to_string(),
        }
    }
}

impl WorkerConfig {
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn with_max_concurrent_jobs(mut self, max: usize) -> Self {
        self.max_concurrent_jobs = max;
        self
    }
}

#[derive(Debug, Error)]
enum WorkerError {
    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),

    #[error(transparent)]
    Registry(#[from] RegistryStoreError),

    #[error("{kind} {entity_id} no longer exists")]
    SubjectMissing {
        kind: EntityKind,
        entity_id: EntityId,
    },
}

struct WorkerInner {
    lifecycle: Arc<JobLifecycle>,
    registry: Arc<dyn RegistryStore>,
    executor: Arc<ResearchExecutor>,
}

/// Handle to control a spawned worker.
pub struct WorkerHandle {
    shutdown: mpsc::Sender<()>,
    join: JoinHandle<()>,
}

impl WorkerHandle {
    /// Request graceful shutdown and wait for the poll loop to exit.
    /// In-flight jobs keep running on the runtime until they resolve.
    pub async fn shutdown(self) {
        let _ = self.shutdown.send(()).await;
        let _ = self.join.await;
    }
}

/// Polling executor for research jobs.
pub struct ResearchWorker {
    inner: Arc<WorkerInner>,
    config: WorkerConfig,
}

impl ResearchWorker {
    pub fn new(
        lifecycle: Arc<JobLifecycle>,
        registry: Arc<dyn RegistryStore>,
        executor: Arc<ResearchExecutor>,
        config: WorkerConfig,
    ) -> Self {
        Self {
            inner: Arc::new(WorkerInner {
                lifecycle,
                registry,
                executor,
            }),
            config,
        }
    }

    /// Spawn the poll loop onto the runtime.
    pub fn spawn(self) -> WorkerHandle {
        let (shutdown_tx, shutdown_rx) = mpsc::channel(1);
        let join = tokio::spawn(self.run(shutdown_rx));
        WorkerHandle {
            shutdown: shutdown_tx,
            join,
        }
    }

    /// Run one already-claimed job to a terminal state (also the direct entry
    /// point for tests — no polling involved).
    pub async fn process(&self, job: ResearchJob) {
        Self::process_job(self.inner.clone(), self.config.heartbeat_interval, job).await;
    }

    async fn run(self, mut shutdown: mpsc::Receiver<()>) {
        info!(worker = %self.config.name, "research worker started");

        let semaphore = Arc::new(Semaphore::new(self.config.max_concurrent_jobs.max(1)));
        let mut poll = tokio::time::interval(self.config.poll_interval);

        loop {
            tokio::select! {
                _ = shutdown.recv() => break,
                _ = poll.tick() => {
                    loop {
                        let Ok(permit) = semaphore.clone().try_acquire_owned() else {
                            break; // at capacity; try again next tick
                        };

                        match self.inner.lifecycle.claim_next().await {
                            Ok(Some(job)) => {
                                debug!(worker = %self.config.name, job_id = %job.id, "claimed job");
                                let inner = self.inner.clone();
                                let heartbeat_interval = self.config.heartbeat_interval;
                                tokio::spawn(async move {
                                    let _permit = permit;
                                    Self::process_job(inner, heartbeat_interval, job).await;
                                });
                            }
                            Ok(None) => break,
                            Err(e) => {
                                error!(worker = %self.config.name, error = %e, "failed to claim job");
                                break;
                            }
                        }
                    }
                }
            }
        }

        info!(worker = %self.config.name, "research worker stopped");
    }

    async fn process_job(inner: Arc<WorkerInner>, heartbeat_interval: Duration, job: ResearchJob) {
        let job_id = job.id;

        let heartbeat = {
            let lifecycle = inner.lifecycle.clone();
            tokio::spawn(async move {
                let mut ticker = tokio::time::interval(heartbeat_interval);
                loop {
                    ticker.tick().await;
                    if let Err(e) = lifecycle.heartbeat(job_id).await {
                        debug!(job_id = %job_id, error = %e, "heartbeat stopped");
                        break;
                    }
                }
            })
        };

        let outcome = Self::run_pipeline(&inner, &job).await;
        heartbeat.abort();

        match outcome {
            Ok(report) => {
                if let Err(e) = inner.lifecycle.complete(job_id, &report).await {
                    error!(job_id = %job_id, error = %e, "failed to record completion");
                }
            }
            Err(e) => {
                warn!(job_id = %job_id, error = %e, "research job failed");
                if let Err(e) = inner.lifecycle.fail(job_id, e.to_string()).await {
                    error!(job_id = %job_id, error = %e, "failed to record failure");
                }
            }
        }
    }

    async fn run_pipeline(
        inner: &WorkerInner,
        job: &ResearchJob,
    ) -> Result<ResearchReport, WorkerError> {
        let subject = inner
            .registry
            .research_subject(job.kind, job.entity_id)
            .await?
            .ok_or(WorkerError::SubjectMissing {
                kind: job.kind,
                entity_id: job.entity_id,
            })?;

        let queries = plan(&subject);
        inner.lifecycle.progress(job.id, 10).await?;

        let total = queries.len().max(1);
        let mut in_flight: FuturesUnordered<_> =
            queries.iter().map(|q| inner.executor.execute(q)).collect();

        let mut results = Vec::with_capacity(queries.len());
        while let Some(result) = in_flight.next().await {
            results.push(result);
            let percent = (10 + 80 * results.len() / total) as u8;
            inner.lifecycle.progress(job.id, percent).await?;
        }

        Ok(assemble(job.kind, &results))
    }
}
