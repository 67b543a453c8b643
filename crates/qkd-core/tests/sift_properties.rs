//! Property tests for sifting, analysis and stream alignment.

use std::sync::Arc;
use std::time::Duration;

use proptest::prelude::*;
use qkd_adapter_sim::{FixedBitSource, SampledChannel};
use qkd_core::{ProtocolOrchestrator, Qber, SessionConfig, SessionSources, SiftMask, analyze, sift};
use qkd_hal::RandomBitSource;
use qkd_ir::{Basis, Bit};

fn bit() -> impl Strategy<Value = Bit> {
    any::<bool>().prop_map(Bit::from)
}

fn basis() -> impl Strategy<Value = Basis> {
    prop_oneof![Just(Basis::Rectilinear), Just(Basis::Diagonal)]
}

/// Three aligned streams of one common length.
fn aligned(max: usize) -> impl Strategy<Value = (Vec<Bit>, Vec<Basis>, Vec<Basis>)> {
    (0..=max).prop_flat_map(|n| {
        (
            prop::collection::vec(bit(), n),
            prop::collection::vec(basis(), n),
            prop::collection::vec(basis(), n),
        )
    })
}

proptest! {
    #[test]
    fn sifted_keys_never_grow((bits, a_bases, b_bases) in aligned(256)) {
        let key = sift(&a_bases, &b_bases, &bits).unwrap();
        prop_assert!(key.len() <= bits.len());
    }

    #[test]
    fn one_mask_gives_equal_lengths(
        (bits, a_bases, b_bases) in aligned(256),
        seed in any::<u64>(),
    ) {
        let outcomes: Vec<Bit> = bits
            .iter()
            .enumerate()
            .map(|(i, b)| if (seed >> (i % 64)) & 1 == 1 { b.flip() } else { *b })
            .collect();

        let mask = SiftMask::new(&a_bases, &b_bases).unwrap();
        let key_a = mask.apply(&bits).unwrap();
        let key_b = mask.apply(&outcomes).unwrap();

        prop_assert_eq!(key_a.len(), key_b.len());
        prop_assert_eq!(key_a.len(), mask.retained());
        prop_assert!(analyze(&key_a, &key_b, bits.len()).is_ok());
    }

    #[test]
    fn sift_keeps_exactly_agreeing_positions((bits, a_bases, b_bases) in aligned(128)) {
        let expected: Vec<Bit> = (0..bits.len())
            .filter(|&i| a_bases[i] == b_bases[i])
            .map(|i| bits[i])
            .collect();
        prop_assert_eq!(sift(&a_bases, &b_bases, &bits).unwrap(), expected);
    }

    #[test]
    fn identical_keys_have_zero_qber(key in prop::collection::vec(bit(), 1..256)) {
        let report = analyze(&key, &key, key.len()).unwrap();
        prop_assert_eq!(report.mismatches, 0);
        prop_assert_eq!(report.qber, Qber::Rate(0.0));
        prop_assert_eq!(report.key_rate, 1.0);
    }

    #[test]
    fn qber_stays_in_unit_interval(
        pair in (1usize..128).prop_flat_map(|n| {
            (prop::collection::vec(bit(), n), prop::collection::vec(bit(), n))
        })
    ) {
        let (a, b) = pair;
        let report = analyze(&a, &b, a.len()).unwrap();
        let q = report.qber.value().unwrap();
        prop_assert!((0.0..=1.0).contains(&q));
        prop_assert_eq!(report.mismatch_positions.len(), report.mismatches);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn draw_order_never_changes_the_key(
        (bits, a_bases, b_bases) in aligned(32).prop_filter("non-empty", |(b, _, _)| !b.is_empty()),
        delays in prop::array::uniform3(0u64..50),
    ) {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_time()
            .start_paused(true)
            .build()
            .unwrap();

        let as_bits = |bases: &[Basis]| bases.iter().map(|b| b.as_bit()).collect::<Vec<_>>();
        let source = |stream: Vec<Bit>, ms: u64| -> Arc<dyn RandomBitSource> {
            Arc::new(FixedBitSource::new(stream).with_delay(Duration::from_millis(ms)))
        };

        let sources = SessionSources::per_role(
            source(bits.clone(), delays[0]),
            source(as_bits(&a_bases), delays[1]),
            source(as_bits(&b_bases), delays[2]),
        );
        let orchestrator = ProtocolOrchestrator::new(
            sources,
            Arc::new(SampledChannel::with_seed(0)),
            SessionConfig::new(bits.len()),
        );

        let expected = sift(&a_bases, &b_bases, &bits).unwrap();
        let result = runtime.block_on(orchestrator.run()).unwrap();
        prop_assert_eq!(result.sender_key(), expected.as_slice());
        prop_assert_eq!(result.sender_key(), result.receiver_key());
    }
}
