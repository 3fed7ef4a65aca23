//! Alphabet configuration.

use huffarc_core::error::{HuffArcError, Result};

/// Largest supported alphabet: 256 byte values plus the EOF marker.
pub const MAX_ALPHABET_SIZE: usize = 257;

/// Symbol alphabet shared by the tree builder and the codec.
///
/// Symbols `0..size-1` are byte values; symbol `size-1` is the
/// end-of-stream marker. Smaller alphabets are useful for isolated tests;
/// archives always use [`Alphabet::STANDARD`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Alphabet {
    size: u16,
}

impl Alphabet {
    /// Standard archive alphabet: 256 byte values + EOF (symbol 256).
    pub const STANDARD: Self = Self { size: 257 };

    /// Create an alphabet of `size` symbols (2 to 257).
    pub fn new(size: usize) -> Result<Self> {
        if !(2..=MAX_ALPHABET_SIZE).contains(&size) {
            return Err(HuffArcError::invalid_alphabet(format!(
                "size {} outside 2..={}",
                size, MAX_ALPHABET_SIZE
            )));
        }
        Ok(Self { size: size as u16 })
    }

    /// Total number of symbols, EOF included.
    pub fn size(&self) -> usize {
        self.size as usize
    }

    /// The end-of-stream marker symbol.
    pub fn eof_marker(&self) -> u16 {
        self.size - 1
    }

    /// Number of byte-valued symbols.
    pub fn byte_symbols(&self) -> usize {
        self.size as usize - 1
    }

    /// Longest code a tree over this alphabet can produce.
    pub fn max_code_len(&self) -> usize {
        self.size as usize - 1
    }

    /// Whether `symbol` belongs to the alphabet.
    pub fn contains(&self, symbol: u16) -> bool {
        symbol < self.size
    }
}

impl Default for Alphabet {
    fn default() -> Self {
        Self::STANDARD
    }
}
