//! Single-qubit statevector engine.

use num_complex::Complex64;
use rand::Rng;

use qkd_ir::{Basis, Bit, Instruction, InstructionKind, StandardGate};

/// Amplitudes of one qubit, `[⟨0|ψ⟩, ⟨1|ψ⟩]`.
#[derive(Debug, Clone, Copy)]
pub struct Statevector {
    amplitudes: [Complex64; 2],
}

impl Statevector {
    /// Create a qubit in |0⟩.
    pub fn new() -> Self {
        Self {
            amplitudes: [Complex64::new(1.0, 0.0), Complex64::new(0.0, 0.0)],
        }
    }

    /// Apply a gate or no-op instruction.
    ///
    /// `Barrier` and `Measure` leave the state untouched; the simulator
    /// handles both itself.
    pub fn apply(&mut self, instruction: &Instruction) {
        match instruction.kind {
            InstructionKind::Gate(gate) => self.apply_gate(gate),
            InstructionKind::Barrier | InstructionKind::Measure => {}
        }
    }

    /// Apply a standard gate.
    pub fn apply_gate(&mut self, gate: StandardGate) {
        match gate {
            StandardGate::I => {}
            StandardGate::X => self.apply_x(),
            StandardGate::H => self.apply_h(),
        }
    }

    fn apply_x(&mut self) {
        self.amplitudes.swap(0, 1);
    }

    fn apply_h(&mut self) {
        let sqrt2_inv = 1.0 / 2.0_f64.sqrt();
        let [a, b] = self.amplitudes;
        self.amplitudes = [sqrt2_inv * (a + b), sqrt2_inv * (a - b)];
    }

    /// Probability of reading 1 in the computational basis.
    pub fn probability_one(&self) -> f64 {
        self.amplitudes[1].norm_sqr()
    }

    /// Measure in the computational basis and collapse.
    pub fn measure<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Bit {
        let p1 = self.probability_one().clamp(0.0, 1.0);
        let outcome = Bit::from(rng.gen_bool(p1));
        self.amplitudes = match outcome {
            Bit::Zero => [Complex64::new(1.0, 0.0), Complex64::new(0.0, 0.0)],
            Bit::One => [Complex64::new(0.0, 0.0), Complex64::new(1.0, 0.0)],
        };
        outcome
    }

    /// Measure in `basis` and re-prepare the observed state.
    ///
    /// This is what an intercept-resend eavesdropper does to a qubit in
    /// flight: the state afterwards is an eigenstate of `basis`.
    pub fn measure_in<R: Rng + ?Sized>(&mut self, basis: Basis, rng: &mut R) -> Bit {
        match basis {
            Basis::Rectilinear => self.measure(rng),
            Basis::Diagonal => {
                self.apply_h();
                let outcome = self.measure(rng);
                self.apply_h();
                outcome
            }
        }
    }
}

impl Default for Statevector {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn approx_eq(a: Complex64, b: Complex64) -> bool {
        (a - b).norm() < 1e-10
    }

    #[test]
    fn test_initial_state() {
        let sv = Statevector::new();
        assert!(approx_eq(sv.amplitudes[0], Complex64::new(1.0, 0.0)));
        assert!(approx_eq(sv.amplitudes[1], Complex64::new(0.0, 0.0)));
    }

    #[test]
    fn test_hadamard() {
        let mut sv = Statevector::new();
        sv.apply_gate(StandardGate::H);

        let sqrt2_inv = 1.0 / 2.0_f64.sqrt();
        assert!(approx_eq(sv.amplitudes[0], Complex64::new(sqrt2_inv, 0.0)));
        assert!(approx_eq(sv.amplitudes[1], Complex64::new(sqrt2_inv, 0.0)));
    }

    #[test]
    fn test_minus_state() {
        let mut sv = Statevector::new();
        sv.apply_gate(StandardGate::X);
        sv.apply_gate(StandardGate::H);

        let sqrt2_inv = 1.0 / 2.0_f64.sqrt();
        assert!(approx_eq(sv.amplitudes[0], Complex64::new(sqrt2_inv, 0.0)));
        assert!(approx_eq(sv.amplitudes[1], Complex64::new(-sqrt2_inv, 0.0)));

        // H|−⟩ = |1⟩
        sv.apply_gate(StandardGate::H);
        assert!((sv.probability_one() - 1.0).abs() < 1e-10);
    }

    #[test]
    fn test_sample_deterministic() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut sv = Statevector::new();
        sv.apply_gate(StandardGate::X);

        for _ in 0..100 {
            assert_eq!(sv.measure(&mut rng), Bit::One);
        }
    }

    #[test]
    fn test_measure_collapses() {
        let mut rng = StdRng::seed_from_u64(11);
        let mut sv = Statevector::new();
        sv.apply_gate(StandardGate::H);

        let first = sv.measure(&mut rng);
        for _ in 0..20 {
            assert_eq!(sv.measure(&mut rng), first);
        }
    }

    #[test]
    fn test_measure_in_matching_basis_is_harmless() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut sv = Statevector::new();
        sv.apply_gate(StandardGate::X);
        sv.apply_gate(StandardGate::H);

        assert_eq!(sv.measure_in(Basis::Diagonal, &mut rng), Bit::One);

        sv.apply_gate(StandardGate::H);
        assert_eq!(sv.measure(&mut rng), Bit::One);
    }
}
