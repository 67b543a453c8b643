//! Prepared states and measurement requests.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::bit::{Basis, Bit};
use crate::gate::StandardGate;

/// A BB84 state as prepared by the sender.
///
/// Constructed by [`crate::codec::encode`]; immutable afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EncodedState {
    bit: Bit,
    basis: Basis,
}

impl EncodedState {
    pub(crate) fn new(bit: Bit, basis: Basis) -> Self {
        Self { bit, basis }
    }

    /// The encoded bit.
    #[inline]
    pub fn bit(&self) -> Bit {
        self.bit
    }

    /// The encoding basis.
    #[inline]
    pub fn basis(&self) -> Basis {
        self.basis
    }

    /// Gates that take |0⟩ to this state, in application order.
    pub fn preparation(&self) -> &'static [StandardGate] {
        match (self.basis, self.bit) {
            (Basis::Rectilinear, Bit::Zero) => &[],
            (Basis::Rectilinear, Bit::One) => &[StandardGate::X],
            (Basis::Diagonal, Bit::Zero) => &[StandardGate::H],
            (Basis::Diagonal, Bit::One) => &[StandardGate::X, StandardGate::H],
        }
    }

    /// Dirac label of this state.
    pub fn ket(&self) -> &'static str {
        match (self.basis, self.bit) {
            (Basis::Rectilinear, Bit::Zero) => "|0⟩",
            (Basis::Rectilinear, Bit::One) => "|1⟩",
            (Basis::Diagonal, Bit::Zero) => "|+⟩",
            (Basis::Diagonal, Bit::One) => "|−⟩",
        }
    }
}

impl fmt::Display for EncodedState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.ket())
    }
}

/// A prepared state together with the basis the receiver measures it in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MeasurementRequest {
    /// The state in flight.
    pub state: EncodedState,
    /// The receiver's measurement basis.
    pub basis: Basis,
}

impl MeasurementRequest {
    /// Create a new request.
    pub fn new(state: EncodedState, basis: Basis) -> Self {
        Self { state, basis }
    }

    /// Whether preparation and measurement bases agree.
    #[inline]
    pub fn bases_agree(&self) -> bool {
        self.state.basis() == self.basis
    }

    /// Gates rotating the measurement basis onto the computational basis.
    pub fn basis_change(&self) -> &'static [StandardGate] {
        match self.basis {
            Basis::Rectilinear => &[],
            Basis::Diagonal => &[StandardGate::H],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preparation_alphabet() {
        let gates = |bit, basis| EncodedState::new(bit, basis).preparation().to_vec();
        assert!(gates(Bit::Zero, Basis::Rectilinear).is_empty());
        assert_eq!(gates(Bit::One, Basis::Rectilinear), vec![StandardGate::X]);
        assert_eq!(gates(Bit::Zero, Basis::Diagonal), vec![StandardGate::H]);
        assert_eq!(
            gates(Bit::One, Basis::Diagonal),
            vec![StandardGate::X, StandardGate::H]
        );
    }

    #[test]
    fn test_request_agreement() {
        let state = EncodedState::new(Bit::One, Basis::Diagonal);
        assert!(MeasurementRequest::new(state, Basis::Diagonal).bases_agree());
        assert!(!MeasurementRequest::new(state, Basis::Rectilinear).bases_agree());
    }

    #[test]
    fn test_ket_labels() {
        assert_eq!(EncodedState::new(Bit::One, Basis::Diagonal).to_string(), "|−⟩");
        assert_eq!(EncodedState::new(Bit::Zero, Basis::Rectilinear).ket(), "|0⟩");
    }
}
