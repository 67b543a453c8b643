//! Direct-sampling quantum channel.

use async_trait::async_trait;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::sync::{Mutex, PoisonError};
use tracing::debug;
use uuid::Uuid;

use qkd_hal::{HalResult, JobId, QuantumChannel, Transmission};
use qkd_ir::{MeasurementRequest, codec};

/// Channel that samples the codec's outcome distribution directly.
///
/// No programs and no jobs: each request is resolved with
/// [`codec::measure`] and a seeded generator. Interchangeable with a
/// [`BackendChannel`](qkd_hal::BackendChannel) over a noiseless simulator.
pub struct SampledChannel {
    rng: Mutex<StdRng>,
}

impl SampledChannel {
    /// Create a channel seeded from system entropy.
    pub fn new() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    /// Create a channel with a reproducible collapse stream.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl Default for SampledChannel {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl QuantumChannel for SampledChannel {
    fn name(&self) -> &str {
        "sampled"
    }

    async fn transmit(&self, requests: &[MeasurementRequest]) -> HalResult<Transmission> {
        let outcomes = {
            let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
            requests
                .iter()
                .map(|r| codec::measure(r.state, r.basis).sample(&mut *rng))
                .collect()
        };

        let job_id = JobId::new(format!("sampled-{}", Uuid::new_v4()));
        debug!("Sampled {} requests as {}", requests.len(), job_id);
        Ok(Transmission { outcomes, job_id })
    }
}
