//! Job lifecycle types.
//!
//! A job is one batch of single-qubit programs, each executed for a single
//! shot. A BB84 session submits up to four of them: three Hadamard-and-measure
//! batches for the random draws and one prepare-and-measure batch for the
//! channel.
//!
//! ```text
//!   submit() ──→ Queued ──→ Running ──→ Completed   one outcome per program
//!                  │           │
//!                  │           ├──→ Failed(reason)
//!                  │           │
//!                  └───────────┴──→ Cancelled
//! ```
//!
//! A freshly submitted job is `Queued`. Status only moves forward, and once
//! terminal it never changes again. Outcomes exist only for `Completed`
//! jobs, and the batch never completes partially.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Backend-assigned identifier of a submitted batch.
///
/// Carried into session reports so a key can be traced to the job that
/// measured it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(pub String);

impl JobId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for JobId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for JobId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

/// Where a batch is in its lifecycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum JobStatus {
    /// Accepted; no program has run yet.
    Queued,
    /// Programs are executing; outcomes are not readable yet.
    Running,
    /// Every program ran its single shot; one outcome per program is ready.
    Completed,
    /// The batch as a whole failed; no outcome is reported for any program.
    Failed(String),
    /// Withdrawn before completion; no outcomes.
    Cancelled,
}

impl JobStatus {
    /// No further transition is possible.
    pub fn is_terminal(&self) -> bool {
        !self.is_pending()
    }

    /// Still waiting for outcomes.
    pub fn is_pending(&self) -> bool {
        matches!(self, JobStatus::Queued | JobStatus::Running)
    }

    /// Outcomes are available.
    pub fn is_success(&self) -> bool {
        *self == JobStatus::Completed
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobStatus::Queued => f.write_str("queued"),
            JobStatus::Running => f.write_str("running"),
            JobStatus::Completed => f.write_str("completed"),
            JobStatus::Failed(reason) => write!(f, "failed ({reason})"),
            JobStatus::Cancelled => f.write_str("cancelled"),
        }
    }
}

/// Bookkeeping for one submitted batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    pub id: JobId,
    pub status: JobStatus,
    /// Programs in the batch; a completed job reports this many outcomes.
    pub batch_size: usize,
    /// Backend that accepted the batch.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backend: Option<String>,
    pub submitted_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<DateTime<Utc>>,
}

impl Job {
    /// A newly queued batch of `batch_size` programs.
    pub fn new(id: impl Into<JobId>, batch_size: usize) -> Self {
        Self {
            id: id.into(),
            status: JobStatus::Queued,
            batch_size,
            backend: None,
            submitted_at: Utc::now(),
            started_at: None,
            finished_at: None,
        }
    }

    pub fn with_backend(mut self, backend: impl Into<String>) -> Self {
        self.backend = Some(backend.into());
        self
    }

    /// Move to `status`, stamping start and finish times.
    ///
    /// A terminal job ignores the request.
    pub fn advance(mut self, status: JobStatus) -> Self {
        if self.status.is_terminal() {
            return self;
        }
        let now = Utc::now();
        if matches!(status, JobStatus::Running | JobStatus::Completed) {
            self.started_at.get_or_insert(now);
        }
        if status.is_terminal() {
            self.finished_at = Some(now);
        }
        self.status = status;
        self
    }
}
