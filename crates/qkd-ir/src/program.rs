//! Single-qubit programs executed by backends.
//!
//! Every request a BB84 session sends to a backend lowers to one
//! [`QubitProgram`]: start in |0⟩, apply the sender's preparation gates,
//! cross a barrier (the channel), rotate into the receiver's basis, measure.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{IrError, IrResult};
use crate::gate::StandardGate;
use crate::instruction::{Instruction, InstructionKind};
use crate::state::MeasurementRequest;

/// A program acting on a single qubit initialised to |0⟩.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QubitProgram {
    instructions: Vec<Instruction>,
}

impl QubitProgram {
    /// Create an empty program.
    pub fn new() -> Self {
        Self {
            instructions: Vec::new(),
        }
    }

    /// Lower a measurement request.
    pub fn from_request(request: &MeasurementRequest) -> Self {
        let mut program = Self::new();
        for gate in request.state.preparation() {
            program.push(Instruction::gate(*gate));
        }
        program.push(Instruction::barrier());
        for gate in request.basis_change() {
            program.push(Instruction::gate(*gate));
        }
        program.push(Instruction::measure());
        program
    }

    /// A program whose outcome is a uniformly random bit: `h`, then measure.
    pub fn random_bit() -> Self {
        let mut program = Self::new();
        program.push(Instruction::gate(StandardGate::H));
        program.push(Instruction::measure());
        program
    }

    /// Append an instruction.
    pub fn push(&mut self, instruction: Instruction) -> &mut Self {
        self.instructions.push(instruction);
        self
    }

    /// The instructions in application order.
    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    /// Number of gate instructions.
    pub fn gate_count(&self) -> usize {
        self.instructions.iter().filter(|i| i.is_gate()).count()
    }

    /// Check the program can be executed as one shot with one readout.
    ///
    /// A valid program has exactly one measurement, as its last
    /// instruction, and at most one barrier.
    pub fn validate(&self) -> IrResult<()> {
        let measures = self.instructions.iter().filter(|i| i.is_measure()).count();
        if measures != 1 {
            return Err(IrError::InvalidProgram(format!(
                "expected exactly one measurement, found {measures}"
            )));
        }
        if !self.instructions.last().is_some_and(Instruction::is_measure) {
            return Err(IrError::InvalidProgram(
                "measurement must be the final instruction".into(),
            ));
        }
        let barriers = self
            .instructions
            .iter()
            .filter(|i| matches!(i.kind, InstructionKind::Barrier))
            .count();
        if barriers > 1 {
            return Err(IrError::InvalidProgram(format!(
                "at most one barrier allowed, found {barriers}"
            )));
        }
        Ok(())
    }
}

impl Default for QubitProgram {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for QubitProgram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for inst in &self.instructions {
            if !first {
                write!(f, " ")?;
            }
            first = false;
            match inst.kind {
                InstructionKind::Barrier => write!(f, "|")?,
                _ => write!(f, "{inst}")?,
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bit::{Basis, Bit};
    use crate::codec::encode;

    #[test]
    fn test_lowering_matches_alphabet() {
        let request = MeasurementRequest::new(encode(Bit::One, Basis::Diagonal), Basis::Diagonal);
        let program = QubitProgram::from_request(&request);
        assert_eq!(program.to_string(), "x h | h measure");
        assert_eq!(program.gate_count(), 3);
        assert!(program.validate().is_ok());
    }

    #[test]
    fn test_lowering_rectilinear_zero() {
        let request =
            MeasurementRequest::new(encode(Bit::Zero, Basis::Rectilinear), Basis::Rectilinear);
        let program = QubitProgram::from_request(&request);
        assert_eq!(program.to_string(), "| measure");
        assert_eq!(program.gate_count(), 0);
    }

    #[test]
    fn test_random_bit_program() {
        let program = QubitProgram::random_bit();
        assert_eq!(program.to_string(), "h measure");
        assert!(program.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_missing_measure() {
        let mut program = QubitProgram::new();
        program.push(Instruction::gate(StandardGate::H));
        assert!(matches!(program.validate(), Err(IrError::InvalidProgram(_))));
    }

    #[test]
    fn test_validate_rejects_gate_after_measure() {
        let mut program = QubitProgram::new();
        program
            .push(Instruction::measure())
            .push(Instruction::gate(StandardGate::X));
        assert!(program.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_two_barriers() {
        let mut program = QubitProgram::new();
        program
            .push(Instruction::barrier())
            .push(Instruction::barrier())
            .push(Instruction::measure());
        assert!(program.validate().is_err());
    }
}
