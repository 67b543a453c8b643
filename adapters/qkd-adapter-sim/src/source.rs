//! Pseudo-random and scripted bit sources.
//!
//! These stand in for a quantum random bit source in tests and offline
//! runs. They are only ever used when constructed explicitly.

use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use qkd_hal::{HalError, HalResult, RandomBitSource};
use qkd_ir::Bit;

/// Seeded pseudo-random bit source.
pub struct SeededBitSource {
    rng: Mutex<StdRng>,
}

impl SeededBitSource {
    /// Create a source with a reproducible stream.
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

#[async_trait]
impl RandomBitSource for SeededBitSource {
    fn name(&self) -> &str {
        "seeded"
    }

    async fn next_bits(&self, n: usize) -> HalResult<Vec<Bit>> {
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        Ok((0..n).map(|_| Bit::from(rng.gen_bool(0.5))).collect())
    }
}

/// Source replaying a fixed bit sequence.
///
/// Every call returns the first `n` scripted bits; asking for more than
/// were scripted is `SourceUnavailable`. An optional delay holds each call
/// back, which lets tests reorder when concurrent draws complete.
pub struct FixedBitSource {
    bits: Vec<Bit>,
    delay: Duration,
}

impl FixedBitSource {
    /// Create a source replaying `bits`.
    pub fn new(bits: Vec<Bit>) -> Self {
        Self {
            bits,
            delay: Duration::ZERO,
        }
    }

    /// Parse bits from a '0'/'1' string.
    pub fn parse(bits: &str) -> HalResult<Self> {
        let bits = Bit::parse_string(bits).map_err(|e| HalError::Configuration(e.to_string()))?;
        Ok(Self::new(bits))
    }

    /// Delay every draw by `delay`.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

#[async_trait]
impl RandomBitSource for FixedBitSource {
    fn name(&self) -> &str {
        "fixed"
    }

    async fn next_bits(&self, n: usize) -> HalResult<Vec<Bit>> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        if n > self.bits.len() {
            return Err(HalError::SourceUnavailable(format!(
                "fixed source holds {} bits, {} requested",
                self.bits.len(),
                n
            )));
        }
        Ok(self.bits[..n].to_vec())
    }
}

/// Source that always fails with `SourceUnavailable`.
pub struct UnavailableBitSource {
    reason: String,
}

impl UnavailableBitSource {
    /// Create a source failing with `reason`.
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

#[async_trait]
impl RandomBitSource for UnavailableBitSource {
    fn name(&self) -> &str {
        "unavailable"
    }

    async fn next_bits(&self, _n: usize) -> HalResult<Vec<Bit>> {
        Err(HalError::SourceUnavailable(self.reason.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_seeded_source_reproduces() {
        let a = SeededBitSource::new(17);
        let b = SeededBitSource::new(17);
        assert_eq!(a.next_bits(32).await.unwrap(), b.next_bits(32).await.unwrap());
    }

    #[tokio::test]
    async fn test_seeded_source_is_balanced() {
        let source = SeededBitSource::new(0x00bb_8400);
        let bits = source.next_bits(10_000).await.unwrap();
        let ones = bits.iter().filter(|b| b.is_one()).count();
        assert!((4_800..=5_200).contains(&ones), "ones = {ones}");
    }

    #[tokio::test]
    async fn test_fixed_source() {
        let source = FixedBitSource::parse("0110").unwrap();
        assert_eq!(
            source.next_bits(3).await.unwrap(),
            vec![Bit::Zero, Bit::One, Bit::One]
        );
        assert!(matches!(
            source.next_bits(5).await,
            Err(HalError::SourceUnavailable(_))
        ));
    }

    #[test]
    fn test_fixed_source_rejects_garbage() {
        assert!(FixedBitSource::parse("01x").is_err());
    }

    #[tokio::test]
    async fn test_unavailable_source() {
        let source = UnavailableBitSource::new("no operational backend");
        assert!(matches!(
            source.next_bits(1).await,
            Err(HalError::SourceUnavailable(_))
        ));
    }
}
