//! BB84 Hardware Abstraction Layer
//!
//! This crate separates a BB84 session from whatever actually produces
//! randomness and performs measurements.
//!
//! # Overview
//!
//! - A common [`Backend`] trait for batch submission and job management
//! - [`Capabilities`] to describe batch limits, native gates and noise
//! - [`RandomBitSource`], the "give me N random bits" collaborator, with a
//!   backend-backed quantum implementation in [`BackendBitSource`]
//! - [`QuantumChannel`], the "prepare, send and measure these N states"
//!   collaborator, with a backend-backed implementation in [`BackendChannel`]
//! - [`BackendRegistry`] for constructing backends by name, and
//!   [`registry::least_busy`] for picking among several
//!
//! # Example: Running a Batch
//!
//! ```ignore
//! use std::sync::Arc;
//! use qkd_hal::{Backend, BackendChannel, QuantumChannel, WaitPolicy};
//! use qkd_adapter_sim::SimulatorBackend;
//! use qkd_ir::{Basis, Bit, MeasurementRequest, codec};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let backend: Arc<dyn Backend> = Arc::new(SimulatorBackend::new());
//!     let channel = BackendChannel::new(backend);
//!
//!     let request = MeasurementRequest::new(
//!         codec::encode(Bit::One, Basis::Diagonal),
//!         Basis::Diagonal,
//!     );
//!     let transmission = channel.transmit(&[request]).await?;
//!     assert_eq!(transmission.outcomes, vec![Bit::One]);
//!     println!("job {}", transmission.job_id);
//!     Ok(())
//! }
//! ```
//!
//! # Implementing a Custom Backend
//!
//! ```ignore
//! use qkd_hal::{
//!     Backend, BackendAvailability, Capabilities, ExecutionResult, HalResult, JobId, JobStatus,
//! };
//! use qkd_ir::QubitProgram;
//! use async_trait::async_trait;
//!
//! struct MyBackend {
//!     capabilities: Capabilities,
//! }
//!
//! #[async_trait]
//! impl Backend for MyBackend {
//!     fn name(&self) -> &str { "my_backend" }
//!
//!     fn capabilities(&self) -> &Capabilities {
//!         &self.capabilities
//!     }
//!
//!     async fn availability(&self) -> HalResult<BackendAvailability> {
//!         Ok(BackendAvailability::always_available())
//!     }
//!
//!     async fn submit(&self, programs: &[QubitProgram]) -> HalResult<JobId> {
//!         # todo!()
//!     }
//!
//!     async fn status(&self, job_id: &JobId) -> HalResult<JobStatus> {
//!         # todo!()
//!     }
//!
//!     async fn result(&self, job_id: &JobId) -> HalResult<ExecutionResult> {
//!         # todo!()
//!     }
//!
//!     async fn cancel(&self, job_id: &JobId) -> HalResult<()> {
//!         # todo!()
//!     }
//! }
//! ```

pub mod backend;
pub mod capability;
pub mod channel;
pub mod error;
pub mod job;
pub mod registry;
pub mod result;
pub mod source;

pub use backend::{
    Backend, BackendAvailability, BackendConfig, BackendFactory, ValidationResult, WaitPolicy,
};
pub use capability::{Capabilities, NoiseProfile};
pub use channel::{BackendChannel, QuantumChannel, Transmission};
pub use error::{HalError, HalResult};
pub use job::{Job, JobId, JobStatus};
pub use registry::BackendRegistry;
pub use result::ExecutionResult;
pub use source::{BackendBitSource, RandomBitSource};
