//! Statistical behaviour of the simulator behind a `BackendChannel`.

use std::sync::Arc;

use qkd_adapter_sim::{NoiseModel, SampledChannel, SimulatorBackend};
use qkd_hal::{Backend, BackendBitSource, BackendChannel, QuantumChannel, RandomBitSource};
use qkd_ir::{Basis, Bit, MeasurementRequest, codec};

const TRIALS: usize = 10_000;

/// Requests alternating through all four states, measured in `basis_of(i)`.
fn requests(basis_of: impl Fn(Basis) -> Basis) -> (Vec<Bit>, Vec<MeasurementRequest>) {
    let mut bits = Vec::with_capacity(TRIALS);
    let mut requests = Vec::with_capacity(TRIALS);
    for i in 0..TRIALS {
        let bit = Bit::from(i % 2 == 1);
        let basis = if i % 4 < 2 {
            Basis::Rectilinear
        } else {
            Basis::Diagonal
        };
        bits.push(bit);
        requests.push(MeasurementRequest::new(codec::encode(bit, basis), basis_of(basis)));
    }
    (bits, requests)
}

fn flip(basis: Basis) -> Basis {
    match basis {
        Basis::Rectilinear => Basis::Diagonal,
        Basis::Diagonal => Basis::Rectilinear,
    }
}

fn agreement(a: &[Bit], b: &[Bit]) -> f64 {
    let same = a.iter().zip(b).filter(|(x, y)| x == y).count();
    same as f64 / a.len() as f64
}

fn channel(backend: SimulatorBackend) -> BackendChannel {
    let backend: Arc<dyn Backend> = Arc::new(backend);
    BackendChannel::new(backend)
}

#[tokio::test]
async fn test_noiseless_matching_bases_are_exact() {
    let (bits, requests) = requests(|b| b);
    let transmission = channel(SimulatorBackend::with_seed(1))
        .transmit(&requests)
        .await
        .unwrap();

    assert_eq!(transmission.outcomes, bits);
}

#[tokio::test]
async fn test_mismatched_bases_agree_half_the_time() {
    let (bits, requests) = requests(flip);
    let transmission = channel(SimulatorBackend::with_seed(2))
        .transmit(&requests)
        .await
        .unwrap();

    let rate = agreement(&bits, &transmission.outcomes);
    assert!((rate - 0.5).abs() < 0.02, "agreement = {rate}");
}

#[tokio::test]
async fn test_sampled_channel_matches_simulator_statistics() {
    let (bits, requests) = requests(flip);
    let transmission = SampledChannel::with_seed(2)
        .transmit(&requests)
        .await
        .unwrap();

    let rate = agreement(&bits, &transmission.outcomes);
    assert!((rate - 0.5).abs() < 0.02, "agreement = {rate}");
}

#[tokio::test]
async fn test_full_interception_yields_quarter_error() {
    let (bits, requests) = requests(|b| b);
    let noise = NoiseModel::new(0.0, 1.0).unwrap();
    let transmission = channel(SimulatorBackend::with_seed(3).with_noise(noise))
        .transmit(&requests)
        .await
        .unwrap();

    let error = 1.0 - agreement(&bits, &transmission.outcomes);
    assert!((error - 0.25).abs() < 0.02, "error = {error}");
}

#[tokio::test]
async fn test_readout_error_rate() {
    let (bits, requests) = requests(|b| b);
    let noise = NoiseModel::new(0.1, 0.0).unwrap();
    let transmission = channel(SimulatorBackend::with_seed(4).with_noise(noise))
        .transmit(&requests)
        .await
        .unwrap();

    let error = 1.0 - agreement(&bits, &transmission.outcomes);
    assert!((error - 0.1).abs() < 0.02, "error = {error}");
}

#[tokio::test]
async fn test_backend_bit_source_is_balanced() {
    let backend: Arc<dyn Backend> = Arc::new(SimulatorBackend::with_seed(5));
    let source = BackendBitSource::new(backend);

    let bits = source.next_bits(TRIALS).await.unwrap();
    let ones = bits.iter().filter(|b| b.is_one()).count() as f64 / TRIALS as f64;
    assert!((ones - 0.5).abs() < 0.02, "ones = {ones}");
}

#[tokio::test]
async fn test_offline_backend_is_unavailable_source() {
    let backend: Arc<dyn Backend> = Arc::new(SimulatorBackend::new().offline("maintenance"));
    let source = BackendBitSource::new(backend);

    let err = source.next_bits(8).await.unwrap_err();
    assert!(matches!(err, qkd_hal::HalError::SourceUnavailable(_)));
}
