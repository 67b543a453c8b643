//! Local BB84 Simulator
//!
//! This crate provides a local backend and collaborator test doubles for
//! running BB84 sessions without quantum hardware.
//!
//! # Features
//!
//! - **[`SimulatorBackend`]**: single-qubit statevector simulation of every
//!   program in a batch, one shot each, with optional readout error and an
//!   intercept-resend eavesdropper acting at the channel boundary
//! - **[`SampledChannel`]**: a [`QuantumChannel`](qkd_hal::QuantumChannel)
//!   that samples the codec distribution directly, no jobs involved
//! - **[`SeededBitSource`]**, **[`FixedBitSource`]**,
//!   **[`UnavailableBitSource`]**: explicit pseudo-random and scripted
//!   stand-ins for a quantum random bit source
//!
//! # Noise
//!
//! | Setting | Effect on a sifted bit | Expected QBER |
//! |---------|------------------------|---------------|
//! | none | recovered exactly | 0 |
//! | `readout_error = p` | flipped with probability `p` | `p` |
//! | `intercept_rate = 1` | wrong with probability 1/4 | 0.25 |
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use qkd_adapter_sim::{NoiseModel, SimulatorBackend};
//! use qkd_hal::{Backend, BackendChannel};
//!
//! let backend: Arc<dyn Backend> = Arc::new(
//!     SimulatorBackend::with_seed(7).with_noise(NoiseModel::new(0.0, 1.0)?),
//! );
//! let channel = BackendChannel::new(backend);
//! ```

mod channel;
mod noise;
mod simulator;
mod source;
mod statevector;

pub use channel::SampledChannel;
pub use noise::NoiseModel;
pub use simulator::{DEFAULT_MAX_BATCH, SimulatorBackend};
pub use source::{FixedBitSource, SeededBitSource, UnavailableBitSource};
