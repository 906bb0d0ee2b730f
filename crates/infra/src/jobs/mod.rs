//! Durable research-job queue: types, storage, lifecycle, reaping.

pub mod lifecycle;
pub mod reaper;
pub mod store;
pub mod types;

pub use lifecycle::{EnqueueOutcome, JobEvent, JobLifecycle, LifecycleError};
pub use reaper::StaleJobReaper;
pub use store::{InMemoryJobStore, JobStats, JobStore, JobStoreError};
pub use types::{JobId, JobStatus, ResearchJob};
