//! `quayside-infra` — runtime infrastructure for the research pipeline.
//!
//! Job queue, lifecycle service, stale-job reaper, registry store and the
//! background research worker. Stores are trait seams with in-memory
//! implementations; a SQL implementation slots in behind the same traits.

pub mod jobs;
pub mod registry;
pub mod worker;

pub use jobs::{
    EnqueueOutcome, InMemoryJobStore, JobEvent, JobId, JobLifecycle, JobStats, JobStore,
    JobStoreError, JobStatus, LifecycleError, ResearchJob, StaleJobReaper,
};
pub use registry::{InMemoryRegistry, RegistryStore, RegistryStoreError};
pub use worker::{ResearchWorker, WorkerConfig, WorkerHandle};
