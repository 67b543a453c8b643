//! Execution results.

use qkd_ir::Bit;
use serde::{Deserialize, Serialize};

/// Result of a completed job: one collapsed bit per submitted program.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionResult {
    /// Measured bits, in submission order.
    pub outcomes: Vec<Bit>,
    /// Wall-clock execution time reported by the backend.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub execution_time_ms: Option<u64>,
}

impl ExecutionResult {
    /// Create a new result.
    pub fn new(outcomes: Vec<Bit>) -> Self {
        Self {
            outcomes,
            execution_time_ms: None,
        }
    }

    /// Set the execution time.
    pub fn with_execution_time(mut self, ms: u64) -> Self {
        self.execution_time_ms = Some(ms);
        self
    }

    /// Number of outcomes.
    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    /// Whether the result holds no outcomes.
    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }
}
