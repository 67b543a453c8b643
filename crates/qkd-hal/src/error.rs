//! Error types for the HAL crate.

use thiserror::Error;

/// Errors that can occur in HAL operations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum HalError {
    /// No backend can accept work.
    #[error("Backend not available: {0}")]
    BackendUnavailable(String),

    /// The random-bit collaborator could not serve a request.
    #[error("Random bit source unavailable: {0}")]
    SourceUnavailable(String),

    /// Job execution failed.
    #[error("Job failed: {0}")]
    JobFailed(String),

    /// Job was cancelled.
    #[error("Job cancelled")]
    JobCancelled,

    /// Job not found.
    #[error("Job not found: {0}")]
    JobNotFound(String),

    /// Invalid program.
    #[error("Invalid program: {0}")]
    InvalidProgram(String),

    /// Batch exceeds backend capabilities.
    #[error("Batch exceeds backend capabilities: {0}")]
    BatchTooLarge(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Timeout waiting for job.
    #[error("Timeout waiting for job {0}")]
    Timeout(String),

    /// Generic backend error.
    #[error("Backend error: {0}")]
    Backend(String),
}

impl HalError {
    /// Whether this error is a deadline overrun.
    pub fn is_timeout(&self) -> bool {
        matches!(self, HalError::Timeout(_))
    }
}

impl From<qkd_ir::IrError> for HalError {
    fn from(e: qkd_ir::IrError) -> Self {
        HalError::InvalidProgram(e.to_string())
    }
}

/// Result type for HAL operations.
pub type HalResult<T> = Result<T, HalError>;
