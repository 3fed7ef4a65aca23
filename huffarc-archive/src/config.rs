//! Codec configuration.

use huffarc_core::buffer::BUFFER_SIZE;
use huffarc_huffman::Alphabet;

/// File extension of HuffArc archives (without the dot).
pub const ARCHIVE_EXTENSION: &str = "harc";

/// Longest entry name accepted by default, in bytes.
pub const MAX_NAME_LEN: usize = 1024;

/// Most entries a header can describe (2-byte count).
pub const MAX_ENTRIES: usize = u16::MAX as usize;

/// Settings shared by the archive writer and reader.
///
/// Both sides of an archive must agree on the alphabet; the other fields
/// only bound resource use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodecConfig {
    /// Symbol alphabet of every entry's code table.
    pub alphabet: Alphabet,
    /// Longest entry name, in bytes.
    pub max_name_len: usize,
    /// Capacity of the byte buffers wrapped around every file handle.
    pub buffer_capacity: usize,
}

impl CodecConfig {
    /// Default configuration: 257-symbol alphabet, 1024-byte names, 1 KiB buffers.
    pub const STANDARD: Self = Self {
        alphabet: Alphabet::STANDARD,
        max_name_len: MAX_NAME_LEN,
        buffer_capacity: BUFFER_SIZE,
    };

    /// Replace the alphabet.
    pub fn with_alphabet(mut self, alphabet: Alphabet) -> Self {
        self.alphabet = alphabet;
        self
    }

    /// Replace the maximum name length.
    pub fn with_max_name_len(mut self, max_name_len: usize) -> Self {
        self.max_name_len = max_name_len;
        self
    }

    /// Replace the buffer capacity.
    pub fn with_buffer_capacity(mut self, buffer_capacity: usize) -> Self {
        self.buffer_capacity = buffer_capacity;
        self
    }
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self::STANDARD
    }
}
