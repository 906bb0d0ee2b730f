//! Service wiring shared by all routes.

use std::sync::Arc;

use quayside_infra::{
    InMemoryJobStore, InMemoryRegistry, JobLifecycle, JobStore, RegistryStore, StaleJobReaper,
};

/// Application services handed to handlers via `Extension`.
///
/// Stores are trait objects so a persistent backend can replace the in-memory
/// ones without touching the routes.
pub struct AppServices {
    pub registry: Arc<dyn RegistryStore>,
    pub lifecycle: Arc<JobLifecycle>,
    pub reaper: StaleJobReaper,
}

impl AppServices {
    pub fn new(registry: Arc<dyn RegistryStore>, jobs: Arc<dyn JobStore>) -> Arc<Self> {
        let lifecycle = Arc::new(JobLifecycle::new(jobs, registry.clone()));
        let reaper = StaleJobReaper::new(lifecycle.clone());
        Arc::new(Self {
            registry,
            lifecycle,
            reaper,
        })
    }

    /// In-memory wiring for dev, tests and single-node runs.
    pub fn in_memory() -> Arc<Self> {
        Self::new(Arc::new(InMemoryRegistry::new()), InMemoryJobStore::arc())
    }
}
