//! Backend capability introspection.
//!
//! Describes what a backend can run: how many single-qubit programs fit in
//! one job, which gates it executes natively, and its noise characteristics.
//! Channels use the batch limit to reject oversized sessions up front.

use serde::{Deserialize, Serialize};

/// Capabilities of an execution backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Capabilities {
    /// Name of the backend.
    pub name: String,
    /// Maximum number of programs per job.
    pub max_batch: usize,
    /// Native gates (OpenQASM 3 naming).
    pub native_gates: Vec<String>,
    /// Whether this is a simulator (`true`) or real hardware (`false`).
    pub is_simulator: bool,
    /// Device-wide noise averages.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub noise_profile: Option<NoiseProfile>,
}

impl Capabilities {
    /// Create capabilities for a local simulator.
    pub fn simulator(max_batch: usize) -> Self {
        Self {
            name: "simulator".into(),
            max_batch,
            native_gates: vec!["id".into(), "x".into(), "h".into()],
            is_simulator: true,
            noise_profile: None,
        }
    }

    /// Attach a noise profile.
    pub fn with_noise_profile(mut self, noise: NoiseProfile) -> Self {
        self.noise_profile = Some(noise);
        self
    }

    /// Check if a gate is executed natively.
    pub fn supports_gate(&self, name: &str) -> bool {
        self.native_gates.iter().any(|g| g == name)
    }
}

/// Device-wide noise averages relevant to BB84.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NoiseProfile {
    /// Probability that a readout reports the flipped bit.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub readout_error: Option<f64>,
    /// Fraction of qubits intercepted and resent on the channel.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intercept_rate: Option<f64>,
}

impl NoiseProfile {
    /// Expected QBER contributed by this profile.
    ///
    /// Intercept-resend in a random basis corrupts a sifted bit with
    /// probability 1/4; readout error flips it independently.
    pub fn expected_qber(&self) -> f64 {
        let intercept = self.intercept_rate.unwrap_or(0.0) * 0.25;
        let readout = self.readout_error.unwrap_or(0.0);
        intercept + readout - 2.0 * intercept * readout
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simulator_capabilities() {
        let caps = Capabilities::simulator(4096);
        assert!(caps.is_simulator);
        assert_eq!(caps.max_batch, 4096);
        assert!(caps.supports_gate("h"));
        assert!(caps.supports_gate("x"));
        assert!(!caps.supports_gate("cx"));
        assert!(caps.noise_profile.is_none());
    }

    #[test]
    fn test_expected_qber() {
        let noiseless = NoiseProfile::default();
        assert_eq!(noiseless.expected_qber(), 0.0);

        let eve = NoiseProfile {
            intercept_rate: Some(1.0),
            readout_error: None,
        };
        assert!((eve.expected_qber() - 0.25).abs() < 1e-12);

        let readout = NoiseProfile {
            intercept_rate: None,
            readout_error: Some(0.05),
        };
        assert!((readout.expected_qber() - 0.05).abs() < 1e-12);
    }
}
