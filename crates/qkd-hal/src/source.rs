//! Random bit sources.
//!
//! A [`RandomBitSource`] hands out uniformly random, mutually independent
//! bits. The reference implementation, [`BackendBitSource`], prepares each
//! bit as a qubit in equal superposition and measures it on a backend.
//!
//! A source that cannot reach its collaborator MUST fail with
//! [`HalError::SourceUnavailable`] (or [`HalError::Timeout`]); it never
//! falls back to pseudo-randomness on its own. Seeded generators exist only
//! as explicitly constructed test doubles.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, instrument};

use qkd_ir::{Bit, QubitProgram};

use crate::backend::{Backend, WaitPolicy};
use crate::error::{HalError, HalResult};

/// A provider of uniformly random bits.
#[async_trait]
pub trait RandomBitSource: Send + Sync {
    /// Short name used in logs and reports.
    fn name(&self) -> &str;

    /// Draw `n` random bits.
    async fn next_bits(&self, n: usize) -> HalResult<Vec<Bit>>;
}

/// Quantum random bit generator backed by an execution backend.
///
/// Each bit is one `h; measure` program; a draw of `n` bits is one job.
pub struct BackendBitSource {
    backend: Arc<dyn Backend>,
    wait_policy: WaitPolicy,
}

impl BackendBitSource {
    /// Create a source drawing from `backend`.
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self {
            backend,
            wait_policy: WaitPolicy::default(),
        }
    }

    /// Set how long to wait for each draw.
    pub fn with_wait_policy(mut self, policy: WaitPolicy) -> Self {
        self.wait_policy = policy;
        self
    }

    async fn draw(&self, n: usize) -> HalResult<Vec<Bit>> {
        let avail = self.backend.availability().await?;
        if !avail.is_available {
            return Err(HalError::BackendUnavailable(
                avail
                    .status_message
                    .unwrap_or_else(|| self.backend.name().to_string()),
            ));
        }

        let programs = vec![QubitProgram::random_bit(); n];
        let job_id = self.backend.submit(&programs).await?;
        debug!("QRNG job {} submitted for {} bits", job_id, n);

        let result = self.backend.wait(&job_id, self.wait_policy).await?;
        if result.outcomes.len() != n {
            return Err(HalError::JobFailed(format!(
                "backend returned {} bits for a draw of {}",
                result.outcomes.len(),
                n
            )));
        }
        Ok(result.outcomes)
    }
}

#[async_trait]
impl RandomBitSource for BackendBitSource {
    fn name(&self) -> &str {
        self.backend.name()
    }

    #[instrument(skip(self), fields(backend = %self.backend.name()))]
    async fn next_bits(&self, n: usize) -> HalResult<Vec<Bit>> {
        if n == 0 {
            return Ok(Vec::new());
        }
        self.draw(n).await.map_err(|e| match e {
            HalError::Timeout(job) => HalError::Timeout(job),
            other => HalError::SourceUnavailable(other.to_string()),
        })
    }
}
