//! Single-qubit gate alphabet.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Gates used to prepare and rotate BB84 states.
///
/// Everything a BB84 session needs is reachable from |0⟩ with a bit flip and
/// a Hadamard, so that is the whole alphabet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StandardGate {
    /// Identity gate.
    I,
    /// Pauli-X gate (bit flip).
    X,
    /// Hadamard gate.
    H,
}

impl StandardGate {
    /// Get the name of this gate.
    #[inline]
    pub fn name(&self) -> &'static str {
        match self {
            StandardGate::I => "id",
            StandardGate::X => "x",
            StandardGate::H => "h",
        }
    }

    /// Every gate in the alphabet is its own inverse.
    #[inline]
    pub fn is_self_inverse(&self) -> bool {
        true
    }
}

impl fmt::Display for StandardGate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}
