//! Classical bits and BB84 bases.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{IrError, IrResult};

/// A classical bit.
///
/// Serializes as the integer `0` or `1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum Bit {
    /// The bit 0.
    Zero,
    /// The bit 1.
    One,
}

impl Bit {
    /// Both bit values, in ascending order.
    pub const ALL: [Bit; 2] = [Bit::Zero, Bit::One];

    /// The opposite bit.
    #[inline]
    #[must_use]
    pub fn flip(self) -> Self {
        match self {
            Bit::Zero => Bit::One,
            Bit::One => Bit::Zero,
        }
    }

    /// Numeric value of this bit.
    #[inline]
    pub fn as_u8(self) -> u8 {
        match self {
            Bit::Zero => 0,
            Bit::One => 1,
        }
    }

    /// Whether this bit is 1.
    #[inline]
    pub fn is_one(self) -> bool {
        matches!(self, Bit::One)
    }

    /// Parse a string of '0'/'1' characters into bits.
    pub fn parse_string(s: &str) -> IrResult<Vec<Bit>> {
        s.chars()
            .enumerate()
            .map(|(position, character)| match character {
                '0' => Ok(Bit::Zero),
                '1' => Ok(Bit::One),
                _ => Err(IrError::InvalidBitString {
                    character,
                    position,
                }),
            })
            .collect()
    }

    /// Render bits as a compact '0'/'1' string.
    pub fn to_string_compact(bits: &[Bit]) -> String {
        bits.iter().map(|b| if b.is_one() { '1' } else { '0' }).collect()
    }
}

impl From<bool> for Bit {
    fn from(value: bool) -> Self {
        if value { Bit::One } else { Bit::Zero }
    }
}

impl From<Bit> for bool {
    fn from(bit: Bit) -> Self {
        bit.is_one()
    }
}

impl From<Bit> for u8 {
    fn from(bit: Bit) -> Self {
        bit.as_u8()
    }
}

impl TryFrom<u8> for Bit {
    type Error = IrError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Bit::Zero),
            1 => Ok(Bit::One),
            other => Err(IrError::InvalidBit(other)),
        }
    }
}

impl fmt::Display for Bit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_u8())
    }
}

/// One of the two mutually unbiased BB84 bases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Basis {
    /// Computational (Z) basis: |0⟩, |1⟩.
    Rectilinear,
    /// Hadamard (X) basis: |+⟩, |−⟩.
    Diagonal,
}

impl Basis {
    /// Both bases.
    pub const ALL: [Basis; 2] = [Basis::Rectilinear, Basis::Diagonal];

    /// Map a random bit onto a basis: 0 selects `Z`, 1 selects `X`.
    #[inline]
    pub fn from_bit(bit: Bit) -> Self {
        match bit {
            Bit::Zero => Basis::Rectilinear,
            Bit::One => Basis::Diagonal,
        }
    }

    /// The bit this basis was drawn from.
    #[inline]
    pub fn as_bit(self) -> Bit {
        match self {
            Basis::Rectilinear => Bit::Zero,
            Basis::Diagonal => Bit::One,
        }
    }

    /// The Pauli label of this basis.
    #[inline]
    pub fn symbol(self) -> char {
        match self {
            Basis::Rectilinear => 'Z',
            Basis::Diagonal => 'X',
        }
    }

    /// Render bases as a compact 'Z'/'X' string.
    pub fn to_string_compact(bases: &[Basis]) -> String {
        bases.iter().map(|b| b.symbol()).collect()
    }
}

impl fmt::Display for Basis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

impl FromStr for Basis {
    type Err = IrError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "z" | "rect" | "rectilinear" | "0" => Ok(Basis::Rectilinear),
            "x" | "diag" | "diagonal" | "1" => Ok(Basis::Diagonal),
            other => Err(IrError::InvalidBasis(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bit_flip() {
        assert_eq!(Bit::Zero.flip(), Bit::One);
        assert_eq!(Bit::One.flip(), Bit::Zero);
    }

    #[test]
    fn test_bit_try_from() {
        assert_eq!(Bit::try_from(0).unwrap(), Bit::Zero);
        assert_eq!(Bit::try_from(1).unwrap(), Bit::One);
        assert!(matches!(Bit::try_from(2), Err(IrError::InvalidBit(2))));
    }

    #[test]
    fn test_bit_serializes_as_integer() {
        let json = serde_json::to_string(&vec![Bit::Zero, Bit::One, Bit::One]).unwrap();
        assert_eq!(json, "[0,1,1]");

        let bits: Vec<Bit> = serde_json::from_str("[1,0]").unwrap();
        assert_eq!(bits, vec![Bit::One, Bit::Zero]);
        assert!(serde_json::from_str::<Vec<Bit>>("[3]").is_err());
    }

    #[test]
    fn test_parse_bit_string() {
        let bits = Bit::parse_string("0110").unwrap();
        assert_eq!(bits, vec![Bit::Zero, Bit::One, Bit::One, Bit::Zero]);
        assert_eq!(Bit::to_string_compact(&bits), "0110");

        let err = Bit::parse_string("01a").unwrap_err();
        assert!(matches!(
            err,
            IrError::InvalidBitString {
                character: 'a',
                position: 2
            }
        ));
    }

    #[test]
    fn test_basis_from_bit() {
        assert_eq!(Basis::from_bit(Bit::Zero), Basis::Rectilinear);
        assert_eq!(Basis::from_bit(Bit::One), Basis::Diagonal);
        for basis in Basis::ALL {
            assert_eq!(Basis::from_bit(basis.as_bit()), basis);
        }
    }

    #[test]
    fn test_basis_parse() {
        assert_eq!("Z".parse::<Basis>().unwrap(), Basis::Rectilinear);
        assert_eq!("diagonal".parse::<Basis>().unwrap(), Basis::Diagonal);
        assert!("y".parse::<Basis>().is_err());
    }

    #[test]
    fn test_basis_compact() {
        let bases = [Basis::Rectilinear, Basis::Diagonal, Basis::Diagonal];
        assert_eq!(Basis::to_string_compact(&bases), "ZXX");
    }
}
