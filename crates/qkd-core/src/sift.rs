//! Basis sifting.
//!
//! A [`SiftMask`] is computed once from the two parties' basis streams and
//! then applied, unchanged, to the sender's bits and to the receiver's
//! outcomes. Both sifted keys therefore always have the same length.

use serde::{Deserialize, Serialize};

use qkd_ir::{Basis, Bit};

use crate::error::{ProtocolError, ProtocolResult};

/// Positions where sender and receiver bases agree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SiftMask {
    keep: Vec<bool>,
}

impl SiftMask {
    /// Compare two aligned basis streams.
    pub fn new(sender_bases: &[Basis], receiver_bases: &[Basis]) -> ProtocolResult<Self> {
        if sender_bases.len() != receiver_bases.len() {
            return Err(ProtocolError::MisalignedKeys {
                left: sender_bases.len(),
                right: receiver_bases.len(),
            });
        }
        let keep = sender_bases
            .iter()
            .zip(receiver_bases)
            .map(|(a, b)| a == b)
            .collect();
        Ok(Self { keep })
    }

    /// Number of positions covered.
    pub fn len(&self) -> usize {
        self.keep.len()
    }

    /// Whether the mask covers no positions.
    pub fn is_empty(&self) -> bool {
        self.keep.is_empty()
    }

    /// Number of positions kept.
    pub fn retained(&self) -> usize {
        self.keep.iter().filter(|k| **k).count()
    }

    /// Whether position `index` is kept.
    pub fn keeps(&self, index: usize) -> bool {
        self.keep.get(index).copied().unwrap_or(false)
    }

    /// The mask as booleans, one per position.
    pub fn as_slice(&self) -> &[bool] {
        &self.keep
    }

    /// Keep the values at agreeing positions, in order.
    pub fn apply(&self, values: &[Bit]) -> ProtocolResult<Vec<Bit>> {
        if values.len() != self.keep.len() {
            return Err(ProtocolError::MisalignedKeys {
                left: self.keep.len(),
                right: values.len(),
            });
        }
        Ok(values
            .iter()
            .zip(&self.keep)
            .filter_map(|(v, keep)| keep.then_some(*v))
            .collect())
    }
}

/// Sift one stream: keep `values[i]` wherever the bases agree.
pub fn sift(
    sender_bases: &[Basis],
    receiver_bases: &[Basis],
    values: &[Bit],
) -> ProtocolResult<Vec<Bit>> {
    SiftMask::new(sender_bases, receiver_bases)?.apply(values)
}
