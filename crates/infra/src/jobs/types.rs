//! Core research-job types and the job state machine.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use quayside_core::{EntityId, EntityKind};

/// Unique job identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(pub Uuid);

impl JobId {
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for JobId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for JobId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// Job execution status.
///
/// `Pending` and `Running` are the only non-terminal states; once terminal, a
/// job is immutable history. No transition returns to a prior state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    /// Queued, waiting to be claimed by the worker.
    Pending,
    /// Claimed and executing.
    Running,
    /// Completed successfully; report written to the entity's drafts.
    Completed,
    /// Failed with a diagnostic (worker error or reaped as stale).
    Failed { error: String },
}

impl JobStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed { .. })
    }

    pub fn is_active(&self) -> bool {
        !self.is_terminal()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Pending => "pending",
            JobStatus::Running => "running",
            JobStatus::Completed => "completed",
            JobStatus::Failed { .. } => "failed",
        }
    }
}

/// A durable unit of research work enriching one entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResearchJob {
    pub id: JobId,
    pub kind: EntityKind,
    /// Reference to the target entity; not owned, looked up in the registry.
    pub entity_id: EntityId,
    pub status: JobStatus,
    /// 0–100, monotonically non-decreasing while running.
    pub progress: u8,
    pub created_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    /// Set exactly once, on the terminal transition.
    pub completed_at: Option<DateTime<Utc>>,
    /// Liveness signal renewed by the worker while running.
    pub last_heartbeat: Option<DateTime<Utc>>,
}

impl ResearchJob {
    pub fn new(kind: EntityKind, entity_id: EntityId) -> Self {
        Self {
            id: JobId::new(),
            kind,
            entity_id,
            status: JobStatus::Pending,
            progress: 0,
            created_at: Utc::now(),
            started_at: None,
            completed_at: None,
            last_heartbeat: None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.status.is_active()
    }

    /// Diagnostic string when failed.
    pub fn error(&self) -> Option<&str> {
        match &self.status {
            JobStatus::Failed { error } => Some(error),
            _ => None,
        }
    }

    /// Claim: pending → running, stamping start and initial heartbeat.
    pub fn mark_running(&mut self) {
        let now = Utc::now();
        self.status = JobStatus::Running;
        self.started_at = Some(now);
        self.last_heartbeat = Some(now);
    }

    /// Renew the liveness signal. No-op unless running.
    pub fn heartbeat(&mut self) {
        if self.status == JobStatus::Running {
            self.last_heartbeat = Some(Utc::now());
        }
    }

    /// Monotonic progress update while running; regressions and values over
    /// 100 clamp.
    pub fn set_progress(&mut self, percent: u8) {
        if self.status == JobStatus::Running {
            self.progress = self.progress.max(percent.min(100));
        }
    }

    /// Terminal success transition.
    pub fn mark_completed(&mut self) {
        self.status = JobStatus::Completed;
        self.progress = 100;
        self.completed_at = Some(Utc::now());
    }

    /// Terminal failure transition.
    pub fn mark_failed(&mut self, error: impl Into<String>) {
        self.status = JobStatus::Failed {
            error: error.into(),
        };
        self.completed_at = Some(Utc::now());
    }

    /// A running job is stale when its liveness signal has expired: the last
    /// heartbeat (or the start time, when no heartbeat was ever recorded) is
    /// older than `window`.
    pub fn is_stale(&self, now: DateTime<Utc>, window: Duration) -> bool {
        if self.status != JobStatus::Running {
            return false;
        }
        match (self.last_heartbeat, self.started_at) {
            (Some(heartbeat), _) => now - heartbeat > window,
            (None, Some(started)) => now - started > window,
            (None, None) => false,
        }
    }
}
