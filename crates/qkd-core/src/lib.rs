//! BB84 Protocol Core
//!
//! Sifting, error estimation and session orchestration for the BB84 quantum
//! key distribution protocol. The core never talks to hardware: it consumes
//! a [`RandomBitSource`](qkd_hal::RandomBitSource) per stream and a
//! [`QuantumChannel`](qkd_hal::QuantumChannel), both injected by the caller.
//!
//! # Overview
//!
//! - [`SiftMask`] / [`sift`]: keep positions where both parties' bases agree
//! - [`analyze`]: mismatches, QBER and key rate of two sifted keys
//! - [`ProtocolOrchestrator`]: one session, `INIT` to `DONE` or `FAILED`
//! - [`SessionResult`] / [`SessionReport`]: the immutable outcome and its
//!   serializable form
//! - [`Config`]: YAML file plus `QKD_*` environment overrides
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use qkd_adapter_sim::SimulatorBackend;
//! use qkd_core::{ProtocolOrchestrator, SessionConfig, SessionSources};
//! use qkd_hal::{Backend, BackendBitSource, BackendChannel};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let backend: Arc<dyn Backend> = Arc::new(SimulatorBackend::new());
//!     let sources = SessionSources::shared(Arc::new(BackendBitSource::new(backend.clone())));
//!     let channel = Arc::new(BackendChannel::new(backend));
//!
//!     let orchestrator = ProtocolOrchestrator::new(sources, channel, SessionConfig::new(16));
//!     let result = orchestrator.run().await?;
//!
//!     println!("key: {:?}, QBER {}", result.sender_key(), result.qber());
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod orchestrator;
pub mod qber;
pub mod session;
pub mod sift;
pub mod stage;

pub use config::{Config, ConfigError};
pub use error::{FailureKind, ProtocolError, ProtocolResult, SessionFailure};
pub use orchestrator::{ProtocolOrchestrator, SessionConfig, SessionSources};
pub use qber::{DEFAULT_QBER_THRESHOLD, Qber, QberReport, analyze};
pub use session::{SessionReport, SessionResult};
pub use sift::{SiftMask, sift};
pub use stage::Stage;
