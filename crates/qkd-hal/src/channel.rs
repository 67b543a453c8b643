//! Quantum channels.
//!
//! A [`QuantumChannel`] takes an ordered batch of [`MeasurementRequest`]s
//! and returns one collapsed bit per request, in the same order. It is the
//! single batching point between a session and whatever performs the
//! measurement.
//!
//! [`BackendChannel`] lowers every request to a [`QubitProgram`] and runs
//! the whole batch as one backend job. Failures surface as
//! `BackendUnavailable`, `JobFailed` or `Timeout`; nothing is retried here.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use qkd_ir::{Bit, MeasurementRequest, QubitProgram};

use crate::backend::{Backend, WaitPolicy};
use crate::error::{HalError, HalResult};
use crate::job::JobId;

/// Outcomes of one transmitted batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transmission {
    /// One outcome per request, in request order.
    pub outcomes: Vec<Bit>,
    /// Identifier assigned by whatever executed the batch.
    pub job_id: JobId,
}

/// Transmit-and-measure service.
#[async_trait]
pub trait QuantumChannel: Send + Sync {
    /// Short name used in logs and reports.
    fn name(&self) -> &str;

    /// Prepare, send and measure every request.
    async fn transmit(&self, requests: &[MeasurementRequest]) -> HalResult<Transmission>;
}

/// Channel delegating preparation and measurement to an execution backend.
pub struct BackendChannel {
    backend: Arc<dyn Backend>,
    wait_policy: WaitPolicy,
}

impl BackendChannel {
    /// Create a channel over `backend`.
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self {
            backend,
            wait_policy: WaitPolicy::default(),
        }
    }

    /// Set how long to wait for each batch.
    pub fn with_wait_policy(mut self, policy: WaitPolicy) -> Self {
        self.wait_policy = policy;
        self
    }

    /// The backend this channel delegates to.
    pub fn backend(&self) -> &Arc<dyn Backend> {
        &self.backend
    }
}

#[async_trait]
impl QuantumChannel for BackendChannel {
    fn name(&self) -> &str {
        self.backend.name()
    }

    #[instrument(skip(self, requests), fields(backend = %self.backend.name(), n = requests.len()))]
    async fn transmit(&self, requests: &[MeasurementRequest]) -> HalResult<Transmission> {
        let avail = self.backend.availability().await?;
        if !avail.is_available {
            return Err(HalError::BackendUnavailable(
                avail
                    .status_message
                    .unwrap_or_else(|| self.backend.name().to_string()),
            ));
        }

        let programs: Vec<QubitProgram> = requests.iter().map(QubitProgram::from_request).collect();

        let validation = self.backend.validate(&programs).await?;
        if let crate::backend::ValidationResult::Invalid { reasons } = validation {
            return Err(HalError::InvalidProgram(reasons.join("; ")));
        }

        let job_id = self.backend.submit(&programs).await?;
        debug!("Channel job {} submitted", job_id);

        let result = self.backend.wait(&job_id, self.wait_policy).await?;
        if result.outcomes.len() != requests.len() {
            return Err(HalError::JobFailed(format!(
                "backend returned {} outcomes for {} requests",
                result.outcomes.len(),
                requests.len()
            )));
        }

        Ok(Transmission {
            outcomes: result.outcomes,
            job_id,
        })
    }
}
