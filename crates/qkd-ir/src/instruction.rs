//! Program instructions.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::gate::StandardGate;

/// The kind of instruction in a single-qubit program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InstructionKind {
    /// A quantum gate operation.
    Gate(StandardGate),
    /// Barrier separating sender preparation from receiver measurement.
    ///
    /// Has no effect on the state; simulators treat it as the point where
    /// the qubit is in flight on the quantum channel.
    Barrier,
    /// Measurement in the computational basis.
    Measure,
}

/// A single instruction acting on the program's only qubit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instruction {
    /// The kind of instruction.
    pub kind: InstructionKind,
}

impl Instruction {
    /// Create a gate instruction.
    pub fn gate(gate: StandardGate) -> Self {
        Self {
            kind: InstructionKind::Gate(gate),
        }
    }

    /// Create a barrier instruction.
    pub fn barrier() -> Self {
        Self {
            kind: InstructionKind::Barrier,
        }
    }

    /// Create a measurement instruction.
    pub fn measure() -> Self {
        Self {
            kind: InstructionKind::Measure,
        }
    }

    /// Check if this is a gate instruction.
    pub fn is_gate(&self) -> bool {
        matches!(self.kind, InstructionKind::Gate(_))
    }

    /// Check if this is a measurement.
    pub fn is_measure(&self) -> bool {
        matches!(self.kind, InstructionKind::Measure)
    }

    /// Name used when rendering the instruction.
    pub fn name(&self) -> &'static str {
        match &self.kind {
            InstructionKind::Gate(g) => g.name(),
            InstructionKind::Barrier => "barrier",
            InstructionKind::Measure => "measure",
        }
    }
}

impl From<StandardGate> for Instruction {
    fn from(gate: StandardGate) -> Self {
        Instruction::gate(gate)
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}
