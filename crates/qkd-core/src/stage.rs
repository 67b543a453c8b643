//! Session stages.
//!
//! ```text
//!   INIT ──→ GENERATE_BITS ──→ GENERATE_BASES ──→ ENCODE ──→ TRANSMIT_MEASURE
//!                                                                  │
//!   DONE ←── ANALYZE ←── SIFT ←────────────────────────────────────┘
//!
//!   any stage ──→ FAILED(cause)
//! ```
//!
//! Stages run strictly in order, once each. `DONE` and `FAILED` are terminal.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A stage of one BB84 session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Stage {
    /// Request accepted, nothing drawn yet.
    Init,
    /// The three random streams are drawn concurrently and joined.
    GenerateBits,
    /// Basis streams are resolved from their drawn bits.
    GenerateBases,
    /// Sender states and measurement requests are built.
    Encode,
    /// Requests are transmitted and measured.
    TransmitMeasure,
    /// Both raw streams are sifted with one shared mask.
    Sift,
    /// Sifted keys are compared.
    Analyze,
    /// Session succeeded.
    Done,
    /// Session aborted.
    Failed,
}

impl Stage {
    /// The stages a successful session passes through, in order.
    pub const SEQUENCE: [Stage; 8] = [
        Stage::Init,
        Stage::GenerateBits,
        Stage::GenerateBases,
        Stage::Encode,
        Stage::TransmitMeasure,
        Stage::Sift,
        Stage::Analyze,
        Stage::Done,
    ];

    /// The stage that follows this one on success.
    pub fn next(self) -> Option<Stage> {
        match self {
            Stage::Init => Some(Stage::GenerateBits),
            Stage::GenerateBits => Some(Stage::GenerateBases),
            Stage::GenerateBases => Some(Stage::Encode),
            Stage::Encode => Some(Stage::TransmitMeasure),
            Stage::TransmitMeasure => Some(Stage::Sift),
            Stage::Sift => Some(Stage::Analyze),
            Stage::Analyze => Some(Stage::Done),
            Stage::Done | Stage::Failed => None,
        }
    }

    /// Whether the session has ended.
    pub fn is_terminal(self) -> bool {
        matches!(self, Stage::Done | Stage::Failed)
    }

    /// Upper-case stage name.
    pub fn as_str(self) -> &'static str {
        match self {
            Stage::Init => "INIT",
            Stage::GenerateBits => "GENERATE_BITS",
            Stage::GenerateBases => "GENERATE_BASES",
            Stage::Encode => "ENCODE",
            Stage::TransmitMeasure => "TRANSMIT_MEASURE",
            Stage::Sift => "SIFT",
            Stage::Analyze => "ANALYZE",
            Stage::Done => "DONE",
            Stage::Failed => "FAILED",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequence_follows_next() {
        for pair in Stage::SEQUENCE.windows(2) {
            assert_eq!(pair[0].next(), Some(pair[1]));
        }
        assert_eq!(Stage::Done.next(), None);
        assert_eq!(Stage::Failed.next(), None);
    }

    #[test]
    fn test_terminal_stages() {
        assert!(Stage::Done.is_terminal());
        assert!(Stage::Failed.is_terminal());
        assert!(!Stage::Sift.is_terminal());
    }

    #[test]
    fn test_serializes_like_display() {
        for stage in Stage::SEQUENCE {
            let json = serde_json::to_string(&stage).unwrap();
            assert_eq!(json, format!("\"{stage}\""));
        }
    }
}
