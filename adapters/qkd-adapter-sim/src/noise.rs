//! Channel and readout noise for the simulator.

use qkd_hal::{HalError, HalResult, NoiseProfile};

/// Noise applied by [`SimulatorBackend`](crate::SimulatorBackend).
///
/// Both rates are probabilities in `[0, 1]`. The intercept rate is the
/// fraction of qubits an intercept-resend eavesdropper measures at the
/// channel boundary (the program's barrier) in a uniformly random basis.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct NoiseModel {
    readout_error: f64,
    intercept_rate: f64,
}

impl NoiseModel {
    /// Create a noise model, rejecting rates outside `[0, 1]`.
    pub fn new(readout_error: f64, intercept_rate: f64) -> HalResult<Self> {
        check_probability("readout_error", readout_error)?;
        check_probability("intercept_rate", intercept_rate)?;
        Ok(Self {
            readout_error,
            intercept_rate,
        })
    }

    /// No noise at all.
    pub fn noiseless() -> Self {
        Self::default()
    }

    /// Probability that a readout is flipped.
    pub fn readout_error(&self) -> f64 {
        self.readout_error
    }

    /// Fraction of qubits intercepted in flight.
    pub fn intercept_rate(&self) -> f64 {
        self.intercept_rate
    }

    /// Whether the model changes nothing.
    pub fn is_noiseless(&self) -> bool {
        self.readout_error == 0.0 && self.intercept_rate == 0.0
    }

    /// The model as advertised in backend capabilities.
    pub fn profile(&self) -> NoiseProfile {
        NoiseProfile {
            readout_error: (self.readout_error > 0.0).then_some(self.readout_error),
            intercept_rate: (self.intercept_rate > 0.0).then_some(self.intercept_rate),
        }
    }
}

fn check_probability(name: &str, value: f64) -> HalResult<()> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(HalError::Configuration(format!(
            "{name} must be within [0, 1], got {value}"
        )))
    }
}
