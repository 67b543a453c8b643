//! Protocol errors and session failures.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

use qkd_hal::HalError;

use crate::stage::Stage;

/// Errors that abort a BB84 session.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ProtocolError {
    /// The random bit collaborator could not serve a draw.
    #[error("Random bit source unavailable: {0}")]
    SourceUnavailable(String),

    /// No backend can accept the transmission.
    #[error("Backend not available: {0}")]
    BackendUnavailable(String),

    /// The transmission job failed or was cancelled.
    #[error("Job failed: {0}")]
    JobFailed(String),

    /// A caller-supplied deadline or a backend wait expired.
    #[error("Timeout: {0}")]
    Timeout(String),

    /// Two streams that must be index-aligned have different lengths.
    #[error("Misaligned keys: {left} vs {right} bits")]
    MisalignedKeys {
        /// Length of the first stream.
        left: usize,
        /// Length of the second stream.
        right: usize,
    },

    /// The session request itself is unusable.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl ProtocolError {
    /// The failure category, for programmatic branching.
    pub fn kind(&self) -> FailureKind {
        match self {
            ProtocolError::SourceUnavailable(_) => FailureKind::SourceUnavailable,
            ProtocolError::BackendUnavailable(_) => FailureKind::BackendUnavailable,
            ProtocolError::JobFailed(_) => FailureKind::JobFailed,
            ProtocolError::Timeout(_) => FailureKind::Timeout,
            ProtocolError::MisalignedKeys { .. } => FailureKind::MisalignedKeys,
            ProtocolError::InvalidRequest(_) => FailureKind::InvalidRequest,
        }
    }

    /// Convert a failed random draw.
    ///
    /// Whatever went wrong behind a bit source is `SourceUnavailable`,
    /// except a deadline overrun, which stays a `Timeout`.
    pub fn from_source(err: HalError) -> Self {
        match err {
            HalError::Timeout(job) => ProtocolError::Timeout(format!("random bit draw (job {job})")),
            HalError::SourceUnavailable(msg) => ProtocolError::SourceUnavailable(msg),
            other => ProtocolError::SourceUnavailable(other.to_string()),
        }
    }
}

impl From<HalError> for ProtocolError {
    fn from(err: HalError) -> Self {
        match err {
            HalError::SourceUnavailable(msg) => ProtocolError::SourceUnavailable(msg),
            HalError::BackendUnavailable(msg) | HalError::Configuration(msg) => {
                ProtocolError::BackendUnavailable(msg)
            }
            HalError::Timeout(job) => ProtocolError::Timeout(format!("job {job}")),
            HalError::InvalidProgram(msg) | HalError::BatchTooLarge(msg) => {
                ProtocolError::InvalidRequest(msg)
            }
            HalError::JobCancelled => ProtocolError::JobFailed("job cancelled".into()),
            HalError::JobFailed(msg) => ProtocolError::JobFailed(msg),
            other => ProtocolError::JobFailed(other.to_string()),
        }
    }
}

/// Result type for protocol operations.
pub type ProtocolResult<T> = Result<T, ProtocolError>;

/// Category of a session failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    SourceUnavailable,
    BackendUnavailable,
    JobFailed,
    Timeout,
    MisalignedKeys,
    InvalidRequest,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FailureKind::SourceUnavailable => "SourceUnavailable",
            FailureKind::BackendUnavailable => "BackendUnavailable",
            FailureKind::JobFailed => "JobFailed",
            FailureKind::Timeout => "Timeout",
            FailureKind::MisalignedKeys => "MisalignedKeys",
            FailureKind::InvalidRequest => "InvalidRequest",
        };
        f.write_str(name)
    }
}

/// A session that ended in `FAILED`.
///
/// Carries no key material: partial streams are dropped with the session.
#[derive(Debug, Error)]
#[error("session {session_id} failed during {stage}: {error}")]
pub struct SessionFailure {
    /// Identifier of the failed session.
    pub session_id: Uuid,
    /// The stage the session was in when it failed.
    pub stage: Stage,
    /// The originating error.
    #[source]
    pub error: ProtocolError,
}

impl SessionFailure {
    /// The failure category.
    pub fn kind(&self) -> FailureKind {
        self.error.kind()
    }
}
