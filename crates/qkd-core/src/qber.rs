//! Quantum bit error rate analysis.
//!
//! [`analyze`] compares two sifted keys position by position. An empty key
//! has an undefined QBER, which is reported as such and never as zero.

use serde::{Deserialize, Serialize};
use std::fmt;

use qkd_ir::Bit;

use crate::error::{ProtocolError, ProtocolResult};

/// Default QBER above which a session is treated as compromised.
///
/// Intercept-resend on every qubit produces 25%; BB84 security proofs
/// tolerate roughly 11%.
pub const DEFAULT_QBER_THRESHOLD: f64 = 0.11;

/// Observed error rate of a sifted key.
///
/// Serializes as a number, or `null` when undefined.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "Option<f64>", into = "Option<f64>")]
pub enum Qber {
    /// `mismatches / len`, in `[0, 1]`.
    Rate(f64),
    /// The key was empty; no error could be observed.
    Undefined,
}

impl Qber {
    /// The rate, if defined.
    pub fn value(&self) -> Option<f64> {
        match self {
            Qber::Rate(r) => Some(*r),
            Qber::Undefined => None,
        }
    }

    /// Whether the key was empty.
    pub fn is_undefined(&self) -> bool {
        matches!(self, Qber::Undefined)
    }
}

impl From<Option<f64>> for Qber {
    fn from(value: Option<f64>) -> Self {
        value.map_or(Qber::Undefined, Qber::Rate)
    }
}

impl From<Qber> for Option<f64> {
    fn from(qber: Qber) -> Self {
        qber.value()
    }
}

impl fmt::Display for Qber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Qber::Rate(r) => write!(f, "{:.2}%", r * 100.0),
            Qber::Undefined => f.write_str("undefined"),
        }
    }
}

/// Outcome of comparing two sifted keys.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QberReport {
    /// Number of positions where the keys differ.
    pub mismatches: usize,
    /// Length of each sifted key.
    pub sifted_len: usize,
    /// `mismatches / sifted_len`.
    pub qber: Qber,
    /// `sifted_len / n_generated`.
    pub key_rate: f64,
    /// Sifted-key positions where the keys differ, ascending.
    pub mismatch_positions: Vec<usize>,
}

impl QberReport {
    /// Whether the two keys are identical.
    pub fn keys_match(&self) -> bool {
        self.mismatches == 0
    }

    /// Whether the observed QBER is above `threshold`.
    ///
    /// An undefined QBER never exceeds anything.
    pub fn exceeds(&self, threshold: f64) -> bool {
        self.qber.value().is_some_and(|q| q > threshold)
    }
}

/// Compare two sifted keys drawn from `n_generated` raw bits.
///
/// Fails with [`ProtocolError::MisalignedKeys`] when the keys differ in
/// length; correct sifting never produces that.
pub fn analyze(key_a: &[Bit], key_b: &[Bit], n_generated: usize) -> ProtocolResult<QberReport> {
    if key_a.len() != key_b.len() {
        return Err(ProtocolError::MisalignedKeys {
            left: key_a.len(),
            right: key_b.len(),
        });
    }
    if key_a.len() > n_generated {
        return Err(ProtocolError::InvalidRequest(format!(
            "sifted key of {} bits cannot come from {} generated bits",
            key_a.len(),
            n_generated
        )));
    }

    let mismatch_positions: Vec<usize> = key_a
        .iter()
        .zip(key_b)
        .enumerate()
        .filter_map(|(i, (a, b))| (a != b).then_some(i))
        .collect();
    let mismatches = mismatch_positions.len();
    let sifted_len = key_a.len();

    let qber = if sifted_len == 0 {
        Qber::Undefined
    } else {
        Qber::Rate(mismatches as f64 / sifted_len as f64)
    };
    let key_rate = if n_generated == 0 {
        0.0
    } else {
        sifted_len as f64 / n_generated as f64
    };

    Ok(QberReport {
        mismatches,
        sifted_len,
        qber,
        key_rate,
        mismatch_positions,
    })
}
