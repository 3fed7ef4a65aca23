//! Codes and code tables.
//!
//! A [`Code`] is a fixed-capacity MSB-first bit string plus its number of
//! significant bits. A [`CodeTable`] holds one code per alphabet symbol; a
//! symbol that never occurs has the empty code.

use crate::config::Alphabet;
use huffarc_core::bitstream::BitSequence;
use huffarc_core::error::{HuffArcError, Result};
use std::fmt;

/// Maximum significant bits in a code (alphabet size 257 minus one).
pub const MAX_CODE_BITS: usize = 256;

/// Bytes needed to hold [`MAX_CODE_BITS`].
pub const MAX_CODE_BYTES: usize = MAX_CODE_BITS / 8;

/// A prefix code: up to 256 bits, first bit in the MSB of byte 0.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Code {
    bits: [u8; MAX_CODE_BYTES],
    len: u16,
}

impl Code {
    /// The empty code (symbol absent from the table).
    pub const EMPTY: Self = Self {
        bits: [0u8; MAX_CODE_BYTES],
        len: 0,
    };

    /// Build a code from its packed bytes and significant-bit count.
    ///
    /// Bits of `bytes` past `len` are ignored.
    pub fn from_bytes(bytes: &[u8], len: usize) -> Result<Self> {
        if len > MAX_CODE_BITS {
            return Err(HuffArcError::corrupted(
                0,
                format!("code length {} exceeds {}", len, MAX_CODE_BITS),
            ));
        }
        if bytes.len() < len.div_ceil(8) {
            return Err(HuffArcError::unexpected_eof(len.div_ceil(8) - bytes.len()));
        }
        let mut code = Self::EMPTY;
        for index in 0..len {
            let bit = bytes[index / 8] & (1 << (7 - index % 8)) != 0;
            code = code.pushed(bit).ok_or_else(|| {
                HuffArcError::corrupted(0, "code length overflow while decoding")
            })?;
        }
        Ok(code)
    }

    /// Number of significant bits.
    pub fn len(&self) -> usize {
        self.len as usize
    }

    /// Whether the code has no bits.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Bit at `index`.
    #[inline]
    pub fn get(&self, index: usize) -> bool {
        self.bits[index / 8] & (1 << (7 - index % 8)) != 0
    }

    /// This code extended by one bit, or `None` if it is already full.
    pub fn pushed(&self, bit: bool) -> Option<Self> {
        let index = self.len as usize;
        if index >= MAX_CODE_BITS {
            return None;
        }
        let mut next = *self;
        if bit {
            next.bits[index / 8] |= 1 << (7 - index % 8);
        }
        next.len += 1;
        Some(next)
    }

    /// The `ceil(len / 8)` bytes carrying the significant bits.
    ///
    /// Padding bits in the last byte are always zero.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bits[..self.len().div_ceil(8)]
    }

    /// Whether `self` is a (non-strict) prefix of `other`.
    pub fn is_prefix_of(&self, other: &Code) -> bool {
        self.len <= other.len && (0..self.len()).all(|i| self.get(i) == other.get(i))
    }
}

impl Default for Code {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl BitSequence for Code {
    fn bit_len(&self) -> usize {
        self.len()
    }

    fn bit(&self, index: usize) -> bool {
        self.get(index)
    }
}

impl fmt::Debug for Code {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Code(")?;
        for index in 0..self.len() {
            f.write_str(if self.get(index) { "1" } else { "0" })?;
        }
        write!(f, ")")
    }
}

/// One code per alphabet symbol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeTable {
    alphabet: Alphabet,
    codes: Vec<Code>,
}

impl CodeTable {
    /// Create a table where every symbol has the empty code.
    pub fn new(alphabet: Alphabet) -> Self {
        Self {
            alphabet,
            codes: vec![Code::EMPTY; alphabet.size()],
        }
    }

    /// Alphabet this table covers.
    pub fn alphabet(&self) -> Alphabet {
        self.alphabet
    }

    /// Code for `symbol`.
    ///
    /// # Panics
    ///
    /// Panics if `symbol` is outside the alphabet.
    #[inline]
    pub fn get(&self, symbol: u16) -> &Code {
        &self.codes[symbol as usize]
    }

    /// Code for the EOF marker.
    pub fn eof(&self) -> &Code {
        self.get(self.alphabet.eof_marker())
    }

    /// Assign `code` to `symbol`.
    pub fn set(&mut self, symbol: u16, code: Code) -> Result<()> {
        if !self.alphabet.contains(symbol) {
            return Err(HuffArcError::corrupted(
                0,
                format!("symbol {} outside alphabet of {}", symbol, self.alphabet.size()),
            ));
        }
        self.codes[symbol as usize] = code;
        Ok(())
    }

    /// Symbols with a non-empty code, in ascending order.
    pub fn present(&self) -> impl Iterator<Item = (u16, &Code)> + '_ {
        self.codes
            .iter()
            .enumerate()
            .filter(|(_, code)| !code.is_empty())
            .map(|(symbol, code)| (symbol as u16, code))
    }

    /// Number of symbols with a non-empty code.
    pub fn present_count(&self) -> usize {
        self.present().count()
    }

    /// Whether no present code is a prefix of another.
    pub fn is_prefix_free(&self) -> bool {
        let present: Vec<&Code> = self.present().map(|(_, code)| code).collect();
        present.iter().enumerate().all(|(i, a)| {
            present
                .iter()
                .enumerate()
                .all(|(j, b)| i == j || !a.is_prefix_of(b))
        })
    }

    /// Total payload bits for data with the given byte frequencies,
    /// including the trailing EOF code.
    pub fn encoded_bits(&self, frequencies: &[u64]) -> u64 {
        let data_bits: u64 = frequencies
            .iter()
            .enumerate()
            .filter(|&(symbol, _)| symbol < self.alphabet.byte_symbols())
            .map(|(symbol, &count)| count * self.codes[symbol].len() as u64)
            .sum();
        data_bits + self.eof().len() as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn code(bits: &str) -> Code {
        bits.chars()
            .fold(Code::EMPTY, |code, c| code.pushed(c == '1').unwrap())
    }

    #[test]
    fn test_code_bytes() {
        let c = code("1011000001");
        assert_eq!(c.len(), 10);
        assert_eq!(c.as_bytes(), &[0b1011_0000, 0b0100_0000]);
        assert_eq!(format!("{:?}", c), "Code(1011000001)");
    }

    #[test]
    fn test_from_bytes_ignores_padding() {
        let c = Code::from_bytes(&[0b1011_1111], 3).unwrap();
        assert_eq!(c, code("101"));
        assert_eq!(c.as_bytes(), &[0b1010_0000]);
        assert!(Code::from_bytes(&[0xFF], 9).is_err());
        assert!(Code::from_bytes(&[0u8; 64], 257).is_err());
    }

    #[test]
    fn test_max_length() {
        let mut c = Code::EMPTY;
        for _ in 0..MAX_CODE_BITS {
            c = c.pushed(true).unwrap();
        }
        assert!(c.pushed(false).is_none());
        assert_eq!(c.as_bytes().len(), MAX_CODE_BYTES);
    }

    #[test]
    fn test_prefix() {
        assert!(code("10").is_prefix_of(&code("101")));
        assert!(!code("11").is_prefix_of(&code("101")));
        assert!(!code("101").is_prefix_of(&code("10")));
    }

    #[test]
    fn test_table_present_and_prefix_free() {
        let mut table = CodeTable::new(Alphabet::STANDARD);
        table.set(65, code("0")).unwrap();
        table.set(256, code("1")).unwrap();
        let present: Vec<u16> = table.present().map(|(s, _)| s).collect();
        assert_eq!(present, vec![65, 256]);
        assert!(table.is_prefix_free());

        table.set(66, code("01")).unwrap();
        assert!(!table.is_prefix_free());
        assert!(table.set(300, code("1")).is_err());
    }

    #[test]
    fn test_encoded_bits() {
        let mut table = CodeTable::new(Alphabet::STANDARD);
        table.set(0x41, code("0")).unwrap();
        table.set(256, code("1")).unwrap();
        let mut frequencies = [0u64; 256];
        frequencies[0x41] = 10;
        assert_eq!(table.encoded_bits(&frequencies), 11);
    }
}
