//! Error types for HuffArc operations.
//!
//! This module provides a single error type covering every failure the
//! archiver can report: I/O errors, malformed headers and code tables,
//! inconsistent offsets, and refused operations on corrupted archives.

use std::io;
use thiserror::Error;

/// The main error type for HuffArc operations.
#[derive(Debug, Error)]
pub enum HuffArcError {
    /// I/O error from underlying reader/writer.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Checksum mismatch.
    #[error("Checksum mismatch: expected {expected:#06x}, computed {computed:#06x}")]
    ChecksumMismatch {
        /// Checksum stored in the archive.
        expected: u16,
        /// Checksum computed from data.
        computed: u16,
    },

    /// Bit sequence that leads off the Huffman tree.
    #[error("Invalid Huffman code at bit position {bit_position}")]
    InvalidHuffmanCode {
        /// Bit position where the invalid code was found.
        bit_position: u64,
    },

    /// Corrupted data in archive.
    #[error("Corrupted data at offset {offset}: {message}")]
    CorruptedData {
        /// Byte offset where corruption was detected.
        offset: u64,
        /// Description of the corruption.
        message: String,
    },

    /// Invalid header format.
    #[error("Invalid header: {message}")]
    InvalidHeader {
        /// Description of the header error.
        message: String,
    },

    /// Unexpected end of file.
    #[error("Unexpected end of file: expected {expected} more bytes")]
    UnexpectedEof {
        /// Number of bytes that were expected but not available.
        expected: usize,
    },

    /// Entry name that cannot be stored in the archive.
    #[error("Invalid entry name {name:?}: {reason}")]
    InvalidEntryName {
        /// The rejected name.
        name: String,
        /// Why the name was rejected.
        reason: &'static str,
    },

    /// More entries than the 2-byte header count can hold.
    #[error("Too many entries: {count} exceeds the limit of {limit}")]
    TooManyEntries {
        /// Number of entries requested.
        count: usize,
        /// Maximum number of entries.
        limit: usize,
    },

    /// Archive grew past the range of a 4-byte offset.
    #[error("Offset {offset} does not fit in a 32-bit header field")]
    OffsetOverflow {
        /// The offending offset.
        offset: u64,
    },

    /// Alphabet configuration that cannot be used.
    #[error("Invalid alphabet: {message}")]
    InvalidAlphabet {
        /// Description of the problem.
        message: String,
    },
}

/// Result type alias for HuffArc operations.
pub type Result<T> = std::result::Result<T, HuffArcError>;

impl HuffArcError {
    /// Create a checksum mismatch error.
    pub fn checksum_mismatch(expected: u16, computed: u16) -> Self {
        Self::ChecksumMismatch { expected, computed }
    }

    /// Create an invalid Huffman code error.
    pub fn invalid_huffman(bit_position: u64) -> Self {
        Self::InvalidHuffmanCode { bit_position }
    }

    /// Create a corrupted data error.
    pub fn corrupted(offset: u64, message: impl Into<String>) -> Self {
        Self::CorruptedData {
            offset,
            message: message.into(),
        }
    }

    /// Create an invalid header error.
    pub fn invalid_header(message: impl Into<String>) -> Self {
        Self::InvalidHeader {
            message: message.into(),
        }
    }

    /// Create an unexpected EOF error.
    pub fn unexpected_eof(expected: usize) -> Self {
        Self::UnexpectedEof { expected }
    }

    /// Create an invalid entry name error.
    pub fn invalid_entry_name(name: impl Into<String>, reason: &'static str) -> Self {
        Self::InvalidEntryName {
            name: name.into(),
            reason,
        }
    }

    /// Create a too many entries error.
    pub fn too_many_entries(count: usize, limit: usize) -> Self {
        Self::TooManyEntries { count, limit }
    }

    /// Create an offset overflow error.
    pub fn offset_overflow(offset: u64) -> Self {
        Self::OffsetOverflow { offset }
    }

    /// Create an invalid alphabet error.
    pub fn invalid_alphabet(message: impl Into<String>) -> Self {
        Self::InvalidAlphabet {
            message: message.into(),
        }
    }

    /// Whether this error describes a malformed archive rather than an
    /// environmental failure.
    pub fn is_format_violation(&self) -> bool {
        !matches!(self, Self::Io(_))
    }
}
