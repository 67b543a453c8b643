//! Property-based tests for the BB84 codec.
//!
//! Covers the round-trip law for matching bases, the mutually-unbiased
//! behaviour of mismatched bases, and the program lowering of requests.

use proptest::prelude::*;
use qkd_ir::{Basis, Bit, MeasurementRequest, QubitProgram, StandardGate, codec};
use rand::SeedableRng;
use rand::rngs::StdRng;

fn arb_bit() -> impl Strategy<Value = Bit> {
    any::<bool>().prop_map(Bit::from)
}

fn arb_basis() -> impl Strategy<Value = Basis> {
    any::<bool>().prop_map(|b| Basis::from_bit(Bit::from(b)))
}

proptest! {
    /// measure(encode(b, basis), basis) == b, whatever the sampler does.
    #[test]
    fn prop_round_trip(bit in arb_bit(), basis in arb_basis(), seed in any::<u64>()) {
        let mut rng = StdRng::seed_from_u64(seed);
        let outcome = codec::measure(codec::encode(bit, basis), basis).sample(&mut rng);
        prop_assert_eq!(outcome, bit);
    }

    /// The outcome distribution depends on the encoded bit only when bases agree.
    #[test]
    fn prop_distribution_shape(bit in arb_bit(), prep in arb_basis(), meas in arb_basis()) {
        let dist = codec::measure(codec::encode(bit, prep), meas);
        if prep == meas {
            prop_assert_eq!(dist.certain(), Some(bit));
        } else {
            prop_assert_eq!(dist.certain(), None);
            prop_assert_eq!(dist.probability_of(bit), 0.5);
        }
    }

    /// Lowered programs always validate and prepare with at most two gates.
    #[test]
    fn prop_lowered_program_is_valid(bit in arb_bit(), prep in arb_basis(), meas in arb_basis()) {
        let request = MeasurementRequest::new(codec::encode(bit, prep), meas);
        let program = QubitProgram::from_request(&request);
        prop_assert!(program.validate().is_ok());
        prop_assert!(program.gate_count() <= 3);
    }
}

#[test]
fn test_mismatched_bases_agreement_rate() {
    let mut rng = StdRng::seed_from_u64(0x00bb_8400);
    let trials = 10_000;
    let mut agreements = 0;

    for i in 0..trials {
        let bit = Bit::from(i % 3 == 0);
        let (prep, meas) = if i % 2 == 0 {
            (Basis::Rectilinear, Basis::Diagonal)
        } else {
            (Basis::Diagonal, Basis::Rectilinear)
        };
        let outcome = codec::measure(codec::encode(bit, prep), meas).sample(&mut rng);
        if outcome == bit {
            agreements += 1;
        }
    }

    let rate = agreements as f64 / trials as f64;
    assert!((rate - 0.5).abs() <= 0.02, "agreement rate {rate}");
}

#[test]
fn test_diagonal_one_prepares_flip_then_hadamard() {
    let state = codec::encode(Bit::One, Basis::Diagonal);
    assert_eq!(state.preparation(), &[StandardGate::X, StandardGate::H]);
}
