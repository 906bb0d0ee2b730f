//! Query execution against the provider: per-query timeout, bounded retry,
//! failures absorbed as category-level markers.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use crate::provider::{ProviderRequest, ResearchProvider};
use crate::query::{QueryConfig, QueryOutcome, QueryResult};

/// Executor tuning.
#[derive(Debug, Clone)]
pub struct ExecutorConfig {
    /// Wall-clock bound per provider attempt.
    pub query_timeout: Duration,
    /// Total attempts per query, including the first. Must be >= 1; this is
    /// the bounded-retry decision for transient provider failures.
    pub max_attempts: u32,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            query_timeout: Duration::from_secs(90),
            max_attempts: 2,
        }
    }
}

/// Remote-call wrapper around the research provider.
///
/// Executing a query is idempotent and has no local side effects; a failed or
/// timed-out query yields a [`QueryOutcome::Failed`] marker rather than an
/// error, so one query can never abort the job it belongs to.
pub struct ResearchExecutor {
    provider: Arc<dyn ResearchProvider>,
    config: ExecutorConfig,
}

impl ResearchExecutor {
    pub fn new(provider: Arc<dyn ResearchProvider>) -> Self {
        Self {
            provider,
            config: ExecutorConfig::default(),
        }
    }

    pub fn with_config(mut self, config: ExecutorConfig) -> Self {
        self.config = config;
        self
    }

    /// Run one planned query to a terminal outcome.
    pub async fn execute(&self, query: &QueryConfig) -> QueryResult {
        let attempts = self.config.max_attempts.max(1);
        let mut last_failure = String::new();

        for attempt in 1..=attempts {
            let request = ProviderRequest {
                query: query.query.clone(),
                system_prompt: query.system_prompt.clone(),
                model: query.model,
            };

            match tokio::time::timeout(self.config.query_timeout, self.provider.research(request))
                .await
            {
                Ok(Ok(text)) => {
                    debug!(category = ?query.category, attempt, "query answered");
                    return QueryResult {
                        category: query.category,
                        outcome: QueryOutcome::Answer(text),
                    };
                }
                Ok(Err(e)) => {
                    warn!(category = ?query.category, attempt, error = %e, "provider call failed");
                    last_failure = e.to_string();
                }
                Err(_) => {
                    warn!(
                        category = ?query.category,
                        attempt,
                        timeout_secs = self.config.query_timeout.as_secs(),
                        "provider call timed out"
                    );
                    last_failure = format!(
                        "timed out after {}s",
                        self.config.query_timeout.as_secs()
                    );
                }
            }
        }

        QueryResult {
            category: query.category,
            outcome: QueryOutcome::Failed(format!(
                "{last_failure} ({attempts} attempts)"
            )),
        }
    }
}
