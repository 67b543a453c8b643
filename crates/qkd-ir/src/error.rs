//! Error types for the IR crate.

use thiserror::Error;

/// Errors that can occur in IR operations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum IrError {
    /// A numeric value outside {0, 1} was used as a bit.
    #[error("Invalid bit value {0}: expected 0 or 1")]
    InvalidBit(u8),

    /// A basis label that is neither rectilinear nor diagonal.
    #[error("Invalid basis '{0}': expected Z (rectilinear) or X (diagonal)")]
    InvalidBasis(String),

    /// A bit string contained a character other than '0' or '1'.
    #[error("Invalid bit string: unexpected '{character}' at position {position}")]
    InvalidBitString {
        /// The offending character.
        character: char,
        /// Position within the string.
        position: usize,
    },

    /// A program is structurally invalid for single-qubit execution.
    #[error("Invalid program: {0}")]
    InvalidProgram(String),
}

/// Result type for IR operations.
pub type IrResult<T> = Result<T, IrError>;
