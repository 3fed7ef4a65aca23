//! # HuffArc Core
//!
//! Core components for the HuffArc archiver.
//!
//! This crate provides the fundamental building blocks for archive operations:
//!
//! - [`buffer`]: 1 KiB buffered byte reader/writer over seekable handles
//! - [`bitstream`]: MSB-first bit vector, bit writer and bit reader
//! - [`checksum`]: 16-bit additive checksum over byte ranges
//! - [`error`]: Error types
//!
//! ## Architecture
//!
//! HuffArc is designed as a layered stack:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │ L4: CLI                                                 │
//! │     compress / decompress / info / test / list          │
//! ├─────────────────────────────────────────────────────────┤
//! │ L3: Archive                                             │
//! │     header layout, entry codec, incremental manager     │
//! ├─────────────────────────────────────────────────────────┤
//! │ L2: Huffman                                             │
//! │     frequencies, arena tree, code table                 │
//! ├─────────────────────────────────────────────────────────┤
//! │ L1: Streams (this crate)                                │
//! │     ByteReader/ByteWriter, BitWriter/BitReader, sums    │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```rust
//! use huffarc_core::buffer::ByteWriter;
//! use huffarc_core::checksum::Checksum16;
//! use std::io::Cursor;
//!
//! let mut writer = ByteWriter::new(Cursor::new(Vec::new()));
//! writer.begin_segment();
//! writer.write_all(b"Hello").unwrap();
//! assert_eq!(writer.segment_checksum(), Checksum16::compute(b"Hello"));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod bitstream;
pub mod buffer;
pub mod checksum;
pub mod error;

// Re-exports for convenience
pub use bitstream::{BitBuffer, BitReader, BitSequence, BitWriter};
pub use buffer::{ByteReader, ByteWriter};
pub use checksum::Checksum16;
pub use error::{HuffArcError, Result};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::bitstream::{BitBuffer, BitReader, BitSequence, BitWriter};
    pub use crate::buffer::{ByteReader, ByteWriter};
    pub use crate::checksum::Checksum16;
    pub use crate::error::{HuffArcError, Result};
}
