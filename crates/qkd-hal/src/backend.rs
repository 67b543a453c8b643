//! Backend trait and configuration.
//!
//! The [`Backend`] trait defines the lifecycle for running a batch of
//! single-qubit programs on an execution backend:
//!
//! ```text
//!   capabilities() ──→ validate() ──→ submit() ──→ status() ──→ result()
//!    (sync, &ref)       (async)       (async)      (async)      (async)
//! ```
//!
//! ## Method table
//!
//! | Method | Kind | Required | Returns |
//! |--------|------|----------|---------|
//! | `name()` | sync | yes | `&str` |
//! | `capabilities()` | sync | yes | `&Capabilities` |
//! | `availability()` | async | yes | `HalResult<BackendAvailability>` |
//! | `validate()` | async | provided | `HalResult<ValidationResult>` |
//! | `submit()` | async | yes | `HalResult<JobId>` |
//! | `status()` | async | yes | `HalResult<JobStatus>` |
//! | `result()` | async | yes | `HalResult<ExecutionResult>` |
//! | `cancel()` | async | yes | `HalResult<()>` |
//! | `wait()` | async | provided | `HalResult<ExecutionResult>` |

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use qkd_ir::QubitProgram;

use crate::capability::Capabilities;
use crate::error::{HalError, HalResult};
use crate::job::{JobId, JobStatus};
use crate::result::ExecutionResult;

/// Configuration for a backend instance.
#[derive(Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Name of the backend.
    pub name: String,
    /// API endpoint URL.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    /// Authentication token.
    #[serde(skip_serializing)]
    pub token: Option<String>,
    /// Additional configuration.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl BackendConfig {
    /// Create a new backend configuration.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            endpoint: None,
            token: None,
            extra: serde_json::Map::new(),
        }
    }

    /// Set the endpoint URL.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Set the authentication token.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Add extra configuration.
    pub fn with_extra(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.extra.insert(key.into(), value);
        self
    }

    /// Read a float from the extra map.
    pub fn extra_f64(&self, key: &str) -> Option<f64> {
        self.extra.get(key).and_then(serde_json::Value::as_f64)
    }

    /// Read an unsigned integer from the extra map.
    pub fn extra_u64(&self, key: &str) -> Option<u64> {
        self.extra.get(key).and_then(serde_json::Value::as_u64)
    }
}

impl fmt::Debug for BackendConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BackendConfig")
            .field("name", &self.name)
            .field("endpoint", &self.endpoint)
            .field("token", &"[REDACTED]")
            .field("extra", &self.extra)
            .finish()
    }
}

/// How long and how often [`Backend::wait`] polls a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitPolicy {
    /// Delay between status polls.
    pub poll_interval: Duration,
    /// Give up with [`HalError::Timeout`] after this long.
    pub max_wait: Duration,
}

impl WaitPolicy {
    /// Create a policy.
    pub fn new(poll_interval: Duration, max_wait: Duration) -> Self {
        Self {
            poll_interval,
            max_wait,
        }
    }

    /// Number of polls before giving up (at least one).
    pub fn max_polls(&self) -> u64 {
        let interval = self.poll_interval.as_millis().max(1);
        u64::try_from(self.max_wait.as_millis() / interval)
            .unwrap_or(u64::MAX)
            .max(1)
    }
}

impl Default for WaitPolicy {
    /// 500ms poll, 5-minute timeout.
    fn default() -> Self {
        Self::new(Duration::from_millis(500), Duration::from_secs(300))
    }
}

/// Trait for execution backends.
///
/// A backend runs batches of single-qubit programs, one shot each, and
/// reports one collapsed bit per program in submission order.
///
/// # Contract
///
/// - `capabilities()` MUST be synchronous and infallible.
/// - `submit()` MUST return a `JobId` whose initial status is `Queued`.
/// - `result()` MUST only be called when status is `Completed`, and MUST
///   return exactly one outcome per submitted program, in order. A backend
///   may release a job once its result is collected; later calls for the
///   same id then fail with `JobNotFound`.
/// - Failures are reported, never retried, by the backend itself.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Get the name of this backend.
    fn name(&self) -> &str;

    /// Get the capabilities of this backend.
    fn capabilities(&self) -> &Capabilities;

    /// Check backend availability with queue depth information.
    async fn availability(&self) -> HalResult<BackendAvailability>;

    /// Validate a batch against backend constraints.
    ///
    /// Default implementation checks batch size, program structure and
    /// gate support.
    async fn validate(&self, programs: &[QubitProgram]) -> HalResult<ValidationResult> {
        let caps = self.capabilities();
        let mut reasons = Vec::new();

        if programs.len() > caps.max_batch {
            reasons.push(format!(
                "batch of {} programs exceeds limit of {}",
                programs.len(),
                caps.max_batch
            ));
        }

        for (index, program) in programs.iter().enumerate() {
            if let Err(e) = program.validate() {
                reasons.push(format!("program {index}: {e}"));
                continue;
            }
            for inst in program.instructions() {
                if inst.is_gate() && !caps.supports_gate(inst.name()) {
                    reasons.push(format!(
                        "program {index}: gate '{}' is not supported",
                        inst.name()
                    ));
                }
            }
        }

        if reasons.is_empty() {
            Ok(ValidationResult::Valid)
        } else {
            Ok(ValidationResult::Invalid { reasons })
        }
    }

    /// Submit a batch of programs for execution.
    async fn submit(&self, programs: &[QubitProgram]) -> HalResult<JobId>;

    /// Get the status of a job.
    async fn status(&self, job_id: &JobId) -> HalResult<JobStatus>;

    /// Get the result of a completed job.
    async fn result(&self, job_id: &JobId) -> HalResult<ExecutionResult>;

    /// Cancel a running job.
    async fn cancel(&self, job_id: &JobId) -> HalResult<()>;

    /// Wait for a job to complete and return its result.
    ///
    /// Polls according to `policy`; returns [`HalError::Timeout`] when the
    /// job is still pending after `policy.max_wait`.
    async fn wait(&self, job_id: &JobId, policy: WaitPolicy) -> HalResult<ExecutionResult> {
        use tokio::time::sleep;

        for _ in 0..policy.max_polls() {
            let status = self.status(job_id).await?;

            match status {
                JobStatus::Completed => return self.result(job_id).await,
                JobStatus::Failed(msg) => return Err(HalError::JobFailed(msg)),
                JobStatus::Cancelled => return Err(HalError::JobCancelled),
                JobStatus::Queued | JobStatus::Running => {
                    sleep(policy.poll_interval).await;
                }
            }
        }

        Err(HalError::Timeout(job_id.0.clone()))
    }
}

/// Backend availability information.
#[derive(Debug, Clone)]
pub struct BackendAvailability {
    /// Whether the backend is currently accepting jobs.
    pub is_available: bool,
    /// Number of jobs currently in queue (if known).
    pub queue_depth: Option<u32>,
    /// Estimated wait time for a new job (if known).
    pub estimated_wait: Option<Duration>,
    /// Human-readable status message.
    pub status_message: Option<String>,
}

impl BackendAvailability {
    /// Create availability for a backend that is always available.
    ///
    /// Typical for simulators: empty queue and no wait.
    pub fn always_available() -> Self {
        Self {
            is_available: true,
            queue_depth: Some(0),
            estimated_wait: Some(Duration::ZERO),
            status_message: None,
        }
    }

    /// Create availability for an offline backend.
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self {
            is_available: false,
            queue_depth: None,
            estimated_wait: None,
            status_message: Some(reason.into()),
        }
    }
}

/// Result of batch validation against backend constraints.
#[derive(Debug, Clone)]
pub enum ValidationResult {
    /// The batch can be submitted as-is.
    Valid,
    /// The batch cannot run on this backend.
    Invalid {
        /// Reasons the batch is invalid.
        reasons: Vec<String>,
    },
}

impl ValidationResult {
    /// Check if the batch is valid.
    pub fn is_valid(&self) -> bool {
        matches!(self, ValidationResult::Valid)
    }
}

/// Trait for creating backends from configuration.
pub trait BackendFactory: Backend + Sized {
    /// Create a backend from configuration.
    fn from_config(config: BackendConfig) -> HalResult<Self>;
}
