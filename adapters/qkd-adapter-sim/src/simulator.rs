//! Simulator backend implementation.

use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rustc_hash::FxHashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, instrument};
use uuid::Uuid;

use qkd_hal::{
    Backend, BackendAvailability, BackendConfig, BackendFactory, Capabilities, ExecutionResult,
    HalError, HalResult, Job, JobId, JobStatus,
};
use qkd_ir::{Basis, Bit, InstructionKind, QubitProgram};

use crate::noise::NoiseModel;
use crate::statevector::Statevector;

/// Default maximum number of programs per job.
pub const DEFAULT_MAX_BATCH: usize = 100_000;

/// Job data for the simulator.
struct SimJob {
    job: Job,
    result: ExecutionResult,
    ready_at: Instant,
}

impl SimJob {
    /// Advance a pending job once its latency has elapsed.
    fn refresh(&mut self) {
        if self.job.status.is_pending() {
            let next = if Instant::now() >= self.ready_at {
                JobStatus::Completed
            } else {
                JobStatus::Running
            };
            self.job = self.job.clone().advance(next);
        }
    }
}

/// Local simulator backend.
///
/// Runs every program on its own single-qubit statevector, one shot each.
/// Results are computed at submission; an optional latency keeps the job
/// `Running` until it elapses so callers exercise their polling path.
pub struct SimulatorBackend {
    /// Backend configuration.
    config: BackendConfig,
    /// Advertised capabilities.
    capabilities: Capabilities,
    /// Jobs whose result has not been collected yet.
    jobs: Arc<Mutex<FxHashMap<String, SimJob>>>,
    /// Measurement randomness.
    rng: Mutex<StdRng>,
    noise: NoiseModel,
    latency: Duration,
    /// Reason reported by `availability()` when the backend is offline.
    offline: Option<String>,
}

impl SimulatorBackend {
    /// Create a noiseless simulator seeded from system entropy.
    pub fn new() -> Self {
        Self::build(
            BackendConfig::new("simulator"),
            StdRng::from_entropy(),
            NoiseModel::noiseless(),
            DEFAULT_MAX_BATCH,
        )
    }

    /// Create a noiseless simulator with a reproducible measurement stream.
    pub fn with_seed(seed: u64) -> Self {
        Self::build(
            BackendConfig::new("simulator"),
            StdRng::seed_from_u64(seed),
            NoiseModel::noiseless(),
            DEFAULT_MAX_BATCH,
        )
    }

    fn build(config: BackendConfig, rng: StdRng, noise: NoiseModel, max_batch: usize) -> Self {
        let mut capabilities = Capabilities::simulator(max_batch);
        capabilities.name = config.name.clone();
        if !noise.is_noiseless() {
            capabilities = capabilities.with_noise_profile(noise.profile());
        }
        Self {
            config,
            capabilities,
            jobs: Arc::new(Mutex::new(FxHashMap::default())),
            rng: Mutex::new(rng),
            noise,
            latency: Duration::ZERO,
            offline: None,
        }
    }

    /// Apply readout and channel noise.
    pub fn with_noise(mut self, noise: NoiseModel) -> Self {
        self.capabilities.noise_profile = (!noise.is_noiseless()).then(|| noise.profile());
        self.noise = noise;
        self
    }

    /// Limit the number of programs per job.
    pub fn with_max_batch(mut self, max_batch: usize) -> Self {
        self.capabilities.max_batch = max_batch;
        self
    }

    /// Keep each job `Running` for `latency` after submission.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Report the backend as offline and refuse submissions.
    pub fn offline(mut self, reason: impl Into<String>) -> Self {
        self.offline = Some(reason.into());
        self
    }

    /// The noise model in effect.
    pub fn noise(&self) -> NoiseModel {
        self.noise
    }

    /// Run one program as a single shot.
    fn run_program<R: Rng + ?Sized>(&self, program: &QubitProgram, rng: &mut R) -> Bit {
        let mut sv = Statevector::new();
        let mut outcome = Bit::Zero;

        for inst in program.instructions() {
            match inst.kind {
                InstructionKind::Gate(_) => sv.apply(inst),
                InstructionKind::Barrier => {
                    if self.noise.intercept_rate() > 0.0 && rng.gen_bool(self.noise.intercept_rate()) {
                        let basis = Basis::from_bit(Bit::from(rng.gen_bool(0.5)));
                        sv.measure_in(basis, rng);
                    }
                }
                InstructionKind::Measure => {
                    outcome = sv.measure(rng);
                    if self.noise.readout_error() > 0.0 && rng.gen_bool(self.noise.readout_error()) {
                        outcome = outcome.flip();
                    }
                }
            }
        }

        outcome
    }

    /// Run a batch synchronously.
    #[instrument(skip(self, programs), fields(n = programs.len()))]
    fn run_batch(&self, programs: &[QubitProgram]) -> ExecutionResult {
        let start = std::time::Instant::now();

        let outcomes = {
            let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
            programs
                .iter()
                .map(|p| self.run_program(p, &mut *rng))
                .collect::<Vec<_>>()
        };

        let elapsed = start.elapsed();
        debug!("Simulated {} programs in {:?}", programs.len(), elapsed);

        ExecutionResult::new(outcomes)
            .with_execution_time(u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX))
    }

    fn lock_jobs(&self) -> std::sync::MutexGuard<'_, FxHashMap<String, SimJob>> {
        self.jobs.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for SimulatorBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Backend for SimulatorBackend {
    fn name(&self) -> &str {
        &self.config.name
    }

    fn capabilities(&self) -> &Capabilities {
        &self.capabilities
    }

    async fn availability(&self) -> HalResult<BackendAvailability> {
        match &self.offline {
            Some(reason) => Ok(BackendAvailability::unavailable(reason.clone())),
            None => {
                let pending = self
                    .lock_jobs()
                    .values()
                    .filter(|j| j.job.status.is_pending() && Instant::now() < j.ready_at)
                    .count();
                let mut avail = BackendAvailability::always_available();
                avail.queue_depth = Some(u32::try_from(pending).unwrap_or(u32::MAX));
                Ok(avail)
            }
        }
    }

    #[instrument(skip(self, programs), fields(backend = %self.config.name, n = programs.len()))]
    async fn submit(&self, programs: &[QubitProgram]) -> HalResult<JobId> {
        if let Some(reason) = &self.offline {
            return Err(HalError::BackendUnavailable(reason.clone()));
        }

        if programs.len() > self.capabilities.max_batch {
            return Err(HalError::BatchTooLarge(format!(
                "Batch has {} programs but simulator only accepts {}",
                programs.len(),
                self.capabilities.max_batch
            )));
        }
        for program in programs {
            program.validate()?;
        }

        let job_id = JobId::new(Uuid::new_v4().to_string());
        let job = Job::new(job_id.clone(), programs.len()).with_backend(self.config.name.clone());

        let result = self.run_batch(programs);
        let ready_at = Instant::now() + self.latency;

        self.lock_jobs().insert(
            job_id.0.clone(),
            SimJob {
                job,
                result,
                ready_at,
            },
        );

        debug!("Submitted job: {}", job_id);
        Ok(job_id)
    }

    async fn status(&self, job_id: &JobId) -> HalResult<JobStatus> {
        let mut jobs = self.lock_jobs();
        let sim_job = jobs
            .get_mut(&job_id.0)
            .ok_or_else(|| HalError::JobNotFound(job_id.0.clone()))?;

        sim_job.refresh();
        Ok(sim_job.job.status.clone())
    }

    async fn result(&self, job_id: &JobId) -> HalResult<ExecutionResult> {
        let mut jobs = self.lock_jobs();
        let sim_job = jobs
            .get_mut(&job_id.0)
            .ok_or_else(|| HalError::JobNotFound(job_id.0.clone()))?;

        sim_job.refresh();
        if sim_job.job.status.is_pending() {
            return Err(HalError::Backend(format!(
                "job {job_id} has no result yet ({})",
                sim_job.job.status
            )));
        }

        // Terminal jobs are handed over once and leave the table.
        let sim_job = jobs
            .remove(&job_id.0)
            .ok_or_else(|| HalError::JobNotFound(job_id.0.clone()))?;
        debug!("Released job: {}", job_id);

        match sim_job.job.status {
            JobStatus::Completed => Ok(sim_job.result),
            JobStatus::Cancelled => Err(HalError::JobCancelled),
            JobStatus::Failed(msg) => Err(HalError::JobFailed(msg)),
            pending => Err(HalError::Backend(format!(
                "job {job_id} has no result yet ({pending})"
            ))),
        }
    }

    async fn cancel(&self, job_id: &JobId) -> HalResult<()> {
        let mut jobs = self.lock_jobs();
        if let Some(sim_job) = jobs.get_mut(&job_id.0) {
            sim_job.job = sim_job.job.clone().advance(JobStatus::Cancelled);
            Ok(())
        } else {
            Err(HalError::JobNotFound(job_id.0.clone()))
        }
    }
}

impl BackendFactory for SimulatorBackend {
    /// Recognised `extra` keys: `seed`, `readout_error`, `intercept_rate`,
    /// `max_batch`, `latency_ms` and `offline` (a reason string).
    fn from_config(config: BackendConfig) -> HalResult<Self> {
        let rng = config
            .extra_u64("seed")
            .map_or_else(StdRng::from_entropy, StdRng::seed_from_u64);
        let noise = NoiseModel::new(
            config.extra_f64("readout_error").unwrap_or(0.0),
            config.extra_f64("intercept_rate").unwrap_or(0.0),
        )?;
        let max_batch = config
            .extra_u64("max_batch")
            .map_or(DEFAULT_MAX_BATCH, |v| usize::try_from(v).unwrap_or(usize::MAX));
        let latency = Duration::from_millis(config.extra_u64("latency_ms").unwrap_or(0));
        let offline = config
            .extra
            .get("offline")
            .and_then(serde_json::Value::as_str)
            .map(str::to_string);

        let mut backend = Self::build(config, rng, noise, max_batch).with_latency(latency);
        backend.offline = offline;
        Ok(backend)
    }
}
