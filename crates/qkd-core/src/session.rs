//! Session records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use qkd_hal::JobId;
use qkd_ir::{Basis, Bit};

use crate::qber::{Qber, QberReport};
use crate::sift::SiftMask;

/// Everything one successful BB84 session produced.
///
/// Built once by the orchestrator and immutable afterwards. All raw
/// streams share one index space: position `i` of every stream refers to
/// the same qubit.
#[derive(Debug, Clone, Serialize)]
pub struct SessionResult {
    pub(crate) session_id: Uuid,
    pub(crate) started_at: DateTime<Utc>,
    pub(crate) finished_at: DateTime<Utc>,
    pub(crate) channel: String,
    pub(crate) job_id: JobId,
    pub(crate) sender_bits: Vec<Bit>,
    pub(crate) sender_bases: Vec<Basis>,
    pub(crate) receiver_bases: Vec<Basis>,
    pub(crate) receiver_outcomes: Vec<Bit>,
    pub(crate) mask: SiftMask,
    pub(crate) sender_key: Vec<Bit>,
    pub(crate) receiver_key: Vec<Bit>,
    pub(crate) analysis: QberReport,
}

impl SessionResult {
    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn finished_at(&self) -> DateTime<Utc> {
        self.finished_at
    }

    /// Name of the channel that carried the qubits.
    pub fn channel(&self) -> &str {
        &self.channel
    }

    /// Identifier the backend assigned to the transmission.
    pub fn job_id(&self) -> &JobId {
        &self.job_id
    }

    /// Number of qubits generated.
    pub fn n_bits(&self) -> usize {
        self.sender_bits.len()
    }

    pub fn sender_bits(&self) -> &[Bit] {
        &self.sender_bits
    }

    pub fn sender_bases(&self) -> &[Basis] {
        &self.sender_bases
    }

    pub fn receiver_bases(&self) -> &[Basis] {
        &self.receiver_bases
    }

    /// Raw receiver measurement outcomes, before sifting.
    pub fn receiver_outcomes(&self) -> &[Bit] {
        &self.receiver_outcomes
    }

    /// The mask both keys were sifted with.
    pub fn mask(&self) -> &SiftMask {
        &self.mask
    }

    pub fn sender_key(&self) -> &[Bit] {
        &self.sender_key
    }

    pub fn receiver_key(&self) -> &[Bit] {
        &self.receiver_key
    }

    /// Comparison of the two sifted keys.
    pub fn analysis(&self) -> &QberReport {
        &self.analysis
    }

    pub fn mismatches(&self) -> usize {
        self.analysis.mismatches
    }

    pub fn qber(&self) -> Qber {
        self.analysis.qber
    }

    pub fn key_rate(&self) -> f64 {
        self.analysis.key_rate
    }

    /// Build the serializable report, flagging QBER above `threshold`.
    pub fn report(&self, threshold: f64) -> SessionReport {
        SessionReport {
            session_id: self.session_id,
            started_at: self.started_at,
            finished_at: self.finished_at,
            channel: self.channel.clone(),
            job_id: self.job_id.clone(),
            n_bits: self.n_bits(),
            sender_bits: Bit::to_string_compact(&self.sender_bits),
            sender_bases: Basis::to_string_compact(&self.sender_bases),
            receiver_bases: Basis::to_string_compact(&self.receiver_bases),
            receiver_outcomes: Bit::to_string_compact(&self.receiver_outcomes),
            sender_key: Bit::to_string_compact(&self.sender_key),
            receiver_key: Bit::to_string_compact(&self.receiver_key),
            mismatches: self.analysis.mismatches,
            mismatch_positions: self.analysis.mismatch_positions.clone(),
            qber: self.analysis.qber,
            key_rate: self.analysis.key_rate,
            keys_match: self.analysis.keys_match(),
            qber_threshold: threshold,
            compromised: self.analysis.exceeds(threshold),
        }
    }
}

/// Flat, serializable summary of a session.
///
/// Bit streams are rendered as '0'/'1' strings and basis streams as
/// 'Z'/'X' strings, one character per position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionReport {
    pub session_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub channel: String,
    pub job_id: JobId,
    pub n_bits: usize,
    pub sender_bits: String,
    pub sender_bases: String,
    pub receiver_bases: String,
    pub receiver_outcomes: String,
    pub sender_key: String,
    pub receiver_key: String,
    pub mismatches: usize,
    pub mismatch_positions: Vec<usize>,
    pub qber: Qber,
    pub key_rate: f64,
    pub keys_match: bool,
    pub qber_threshold: f64,
    /// QBER above the threshold; the key should be discarded.
    pub compromised: bool,
}
