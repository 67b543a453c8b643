//! BB84 state codec under the noiseless single-qubit model.
//!
//! [`encode`] maps a (bit, basis) pair onto one of the four BB84 states.
//! [`measure`] gives the outcome distribution of measuring such a state in a
//! given basis. No depolarizing or readout error is modelled here; noisy
//! behaviour belongs to the backend that samples the distribution.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::bit::{Basis, Bit};
use crate::state::EncodedState;

/// Prepare the state encoding `bit` in `basis`.
#[inline]
pub fn encode(bit: Bit, basis: Basis) -> EncodedState {
    EncodedState::new(bit, basis)
}

/// Outcome distribution of measuring `state` in `measurement_basis`.
///
/// Matching bases recover the encoded bit with certainty. Mismatched bases
/// are mutually unbiased: each outcome has probability 1/2 whatever bit was
/// encoded.
#[inline]
pub fn measure(state: EncodedState, measurement_basis: Basis) -> OutcomeDistribution {
    if state.basis() == measurement_basis {
        OutcomeDistribution::Certain(state.bit())
    } else {
        OutcomeDistribution::Uniform
    }
}

/// Distribution over the single measured bit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutcomeDistribution {
    /// The outcome is always this bit.
    Certain(Bit),
    /// Both outcomes with probability 1/2.
    Uniform,
}

impl OutcomeDistribution {
    /// Probability of observing `bit`.
    pub fn probability_of(&self, bit: Bit) -> f64 {
        match self {
            OutcomeDistribution::Certain(b) if *b == bit => 1.0,
            OutcomeDistribution::Certain(_) => 0.0,
            OutcomeDistribution::Uniform => 0.5,
        }
    }

    /// The outcome, if it is deterministic.
    pub fn certain(&self) -> Option<Bit> {
        match self {
            OutcomeDistribution::Certain(b) => Some(*b),
            OutcomeDistribution::Uniform => None,
        }
    }

    /// Draw one outcome.
    ///
    /// Deterministic outcomes do not consume randomness.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Bit {
        match self {
            OutcomeDistribution::Certain(b) => *b,
            OutcomeDistribution::Uniform => Bit::from(rng.gen_bool(0.5)),
        }
    }
}
