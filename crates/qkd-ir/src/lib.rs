//! BB84 Intermediate Representation
//!
//! This crate holds the data model shared by every other crate in the
//! workspace: classical bits, the two BB84 bases, the states a sender
//! prepares, the requests a receiver issues, and the single-qubit programs a
//! backend executes to serve those requests.
//!
//! # Core Components
//!
//! - **Bits and Bases**: [`Bit`] and [`Basis`] (rectilinear `Z`, diagonal `X`)
//! - **States**: [`EncodedState`] and [`MeasurementRequest`]
//! - **Gates**: [`StandardGate`], the four-state BB84 alphabet needs only `X` and `H`
//! - **Programs**: [`QubitProgram`], the lowered form of a request
//! - **Codec**: [`codec::encode`] and [`codec::measure`], the noiseless
//!   single-qubit model as an [`OutcomeDistribution`]
//!
//! # Example: Encoding and Measuring
//!
//! ```rust
//! use qkd_ir::{Basis, Bit, codec};
//!
//! let state = codec::encode(Bit::One, Basis::Diagonal);
//!
//! // Same basis: deterministic recovery.
//! let same = codec::measure(state, Basis::Diagonal);
//! assert_eq!(same.certain(), Some(Bit::One));
//!
//! // Other basis: a fair coin.
//! let other = codec::measure(state, Basis::Rectilinear);
//! assert_eq!(other.probability_of(Bit::One), 0.5);
//! ```
//!
//! # State Alphabet
//!
//! | Bit | Basis | Preparation | State |
//! |-----|-------|-------------|-------|
//! | 0 | `Z` | (none) | \|0⟩ |
//! | 1 | `Z` | `x` | \|1⟩ |
//! | 0 | `X` | `h` | \|+⟩ |
//! | 1 | `X` | `x`, `h` | \|−⟩ |

pub mod bit;
pub mod codec;
pub mod error;
pub mod gate;
pub mod instruction;
pub mod program;
pub mod state;

pub use bit::{Basis, Bit};
pub use codec::OutcomeDistribution;
pub use error::{IrError, IrResult};
pub use gate::StandardGate;
pub use instruction::{Instruction, InstructionKind};
pub use program::QubitProgram;
pub use state::{EncodedState, MeasurementRequest};
