//! Bit-level I/O for variable-length codes.
//!
//! This module provides [`BitBuffer`], a fixed-size bit vector, together
//! with [`BitWriter`] and [`BitReader`], which pack and unpack Huffman codes
//! one bit at a time.
//!
//! # Bit Ordering
//!
//! HuffArc uses MSB-first ordering within bytes: bit `i` of a byte stream
//! lives in byte `i / 8` under the mask `1 << (7 - i % 8)`. The packing is
//! defined purely in terms of byte values, so it does not depend on host
//! byte order.
//!
//! # Example
//!
//! ```
//! use huffarc_core::bitstream::{BitBuffer, BitReader, BitWriter};
//! use huffarc_core::buffer::ByteReader;
//! use std::io::Cursor;
//!
//! let mut code = BitBuffer::new(8);
//! code.set(0).clear(1).set(2);
//!
//! let mut output = Vec::new();
//! let mut writer = BitWriter::new(&mut output);
//! writer.add(&code.prefix(3)).unwrap();
//! writer.finish().unwrap();
//! assert_eq!(output, vec![0b1010_0000]);
//!
//! let mut bytes = ByteReader::new(Cursor::new(output));
//! let mut reader = BitReader::new(&mut bytes);
//! assert_eq!(reader.read_bit().unwrap(), Some(true));
//! assert_eq!(reader.read_bit().unwrap(), Some(false));
//! assert_eq!(reader.read_bit().unwrap(), Some(true));
//! ```

use crate::buffer::{BUFFER_SIZE, ByteReader};
use crate::error::Result;
use std::io::{Read, Seek, Write};

/// Bits held by a [`BitWriter`] block before it is written out.
pub const BLOCK_BITS: usize = BUFFER_SIZE * 8;

/// Ordered sequence of bits that can be appended to a [`BitWriter`].
pub trait BitSequence {
    /// Number of significant bits.
    fn bit_len(&self) -> usize;

    /// Bit at `index` (`index < bit_len()`).
    fn bit(&self, index: usize) -> bool;
}

#[inline]
fn mask(index: usize) -> u8 {
    1 << (7 - index % 8)
}

/// Fixed-size bit vector with MSB-first addressing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BitBuffer {
    data: Vec<u8>,
    size: usize,
}

impl BitBuffer {
    /// Create a zeroed vector of `size` bits.
    pub fn new(size: usize) -> Self {
        Self {
            data: vec![0u8; size.div_ceil(8)],
            size,
        }
    }

    /// Declared size in bits.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Set bit `index` to 1.
    #[inline]
    pub fn set(&mut self, index: usize) -> &mut Self {
        debug_assert!(index < self.size);
        self.data[index / 8] |= mask(index);
        self
    }

    /// Set bit `index` to 0.
    #[inline]
    pub fn clear(&mut self, index: usize) -> &mut Self {
        debug_assert!(index < self.size);
        self.data[index / 8] &= !mask(index);
        self
    }

    /// Read bit `index`.
    #[inline]
    pub fn get(&self, index: usize) -> bool {
        self.data[index / 8] & mask(index) != 0
    }

    /// Backing bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// View of the first `len` bits as a [`BitSequence`].
    pub fn prefix(&self, len: usize) -> BitPrefix<'_> {
        BitPrefix {
            buffer: self,
            len: len.min(self.size),
        }
    }
}

/// The first `len` bits of a [`BitBuffer`].
#[derive(Debug, Clone, Copy)]
pub struct BitPrefix<'a> {
    buffer: &'a BitBuffer,
    len: usize,
}

impl BitSequence for BitPrefix<'_> {
    fn bit_len(&self) -> usize {
        self.len
    }

    fn bit(&self, index: usize) -> bool {
        self.buffer.get(index)
    }
}

/// Buffered MSB-first bit output stream.
///
/// Bits accumulate in a [`BitBuffer`] block. Whenever the block fills it is
/// written out whole; [`BitWriter::flush`] zero-pads the last partial byte
/// and writes only the bytes actually used.
#[derive(Debug)]
pub struct BitWriter<W: Write> {
    writer: W,
    block: BitBuffer,
    /// Next free bit in `block`.
    position: usize,
    total_bits_written: u64,
}

impl<W: Write> BitWriter<W> {
    /// Create a writer with the default 1 KiB block.
    pub fn new(writer: W) -> Self {
        Self::with_block_bits(BLOCK_BITS, writer)
    }

    /// Create a writer with a custom block size (a power of two, at least 8).
    pub fn with_block_bits(block_bits: usize, writer: W) -> Self {
        debug_assert!(block_bits.is_power_of_two() && block_bits >= 8);
        Self {
            writer,
            block: BitBuffer::new(block_bits),
            position: 0,
            total_bits_written: 0,
        }
    }

    /// Get the total number of bits appended so far.
    pub fn bits_written(&self) -> u64 {
        self.total_bits_written
    }

    /// Append one bit.
    #[inline]
    pub fn write_bit(&mut self, bit: bool) -> Result<()> {
        if self.position == self.block.size() {
            self.flush()?;
        }
        if bit {
            self.block.set(self.position);
        } else {
            self.block.clear(self.position);
        }
        self.position += 1;
        self.total_bits_written += 1;
        Ok(())
    }

    /// Append all significant bits of `code`, first bit first.
    pub fn add<C: BitSequence + ?Sized>(&mut self, code: &C) -> Result<()> {
        for index in 0..code.bit_len() {
            self.write_bit(code.bit(index))?;
        }
        Ok(())
    }

    /// Zero-pad the partial byte and write the used part of the block.
    ///
    /// Calling this with an empty block writes nothing.
    pub fn flush(&mut self) -> Result<()> {
        while self.position % 8 != 0 {
            self.block.clear(self.position);
            self.position += 1;
        }
        self.writer
            .write_all(&self.block.as_bytes()[..self.position / 8])?;
        self.position = 0;
        Ok(())
    }

    /// Flush remaining bits and return the underlying writer.
    pub fn finish(mut self) -> Result<W> {
        self.flush()?;
        self.writer.flush()?;
        Ok(self.writer)
    }
}

/// MSB-first bit input over a [`ByteReader`].
///
/// Bits left in the current byte when reading stops are discarded; the
/// byte reader is positioned right after the last byte touched.
#[derive(Debug)]
pub struct BitReader<'a, R: Read + Seek> {
    reader: &'a mut ByteReader<R>,
    current: u8,
    bits_left: u8,
    total_bits_read: u64,
}

impl<'a, R: Read + Seek> BitReader<'a, R> {
    /// Create a bit reader starting at the byte reader's current position.
    pub fn new(reader: &'a mut ByteReader<R>) -> Self {
        Self {
            reader,
            current: 0,
            bits_left: 0,
            total_bits_read: 0,
        }
    }

    /// Get the current bit position (for error reporting).
    pub fn bit_position(&self) -> u64 {
        self.total_bits_read
    }

    /// Read one bit, or `None` at end of data.
    #[inline]
    pub fn read_bit(&mut self) -> Result<Option<bool>> {
        if self.bits_left == 0 {
            match self.reader.read_byte()? {
                Some(byte) => {
                    self.current = byte;
                    self.bits_left = 8;
                }
                None => return Ok(None),
            }
        }
        self.bits_left -= 1;
        self.total_bits_read += 1;
        Ok(Some(self.current & (1 << self.bits_left) != 0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    struct Bits(Vec<bool>);

    impl BitSequence for Bits {
        fn bit_len(&self) -> usize {
            self.0.len()
        }

        fn bit(&self, index: usize) -> bool {
            self.0[index]
        }
    }

    #[test]
    fn test_bitbuffer_msb_first() {
        let mut buffer = BitBuffer::new(16);
        buffer.set(0).set(7).set(9);
        assert_eq!(buffer.as_bytes(), &[0b1000_0001, 0b0100_0000]);
        assert!(buffer.get(0));
        assert!(!buffer.get(1));
        buffer.clear(0);
        assert_eq!(buffer.as_bytes()[0], 0b0000_0001);
    }

    #[test]
    fn test_bitbuffer_odd_size() {
        let buffer = BitBuffer::new(9);
        assert_eq!(buffer.as_bytes().len(), 2);
        assert_eq!(buffer.size(), 9);
    }

    #[test]
    fn test_bitwriter_basic() {
        let mut output = Vec::new();
        let mut writer = BitWriter::new(&mut output);
        writer
            .add(&Bits(vec![true, false, true, true, false, true, false, true]))
            .unwrap();
        writer.finish().unwrap();
        assert_eq!(output, vec![0xB5]);
    }

    #[test]
    fn test_bitwriter_pads_with_zeros() {
        let mut output = Vec::new();
        let mut writer = BitWriter::new(&mut output);
        writer.add(&Bits(vec![true; 10])).unwrap();
        writer.finish().unwrap();
        assert_eq!(output, vec![0xFF, 0xC0]);
    }

    #[test]
    fn test_flush_is_idempotent() {
        let mut output = Vec::new();
        let mut writer = BitWriter::new(&mut output);
        writer.write_bit(true).unwrap();
        writer.flush().unwrap();
        writer.flush().unwrap();
        writer.finish().unwrap();
        assert_eq!(output, vec![0x80]);
    }

    #[test]
    fn test_block_rollover() {
        let mut output = Vec::new();
        let mut writer = BitWriter::with_block_bits(8, &mut output);
        for i in 0..20 {
            writer.write_bit(i % 2 == 0).unwrap();
        }
        assert_eq!(writer.bits_written(), 20);
        writer.finish().unwrap();
        assert_eq!(output, vec![0xAA, 0xAA, 0xA0]);
    }

    #[test]
    fn test_roundtrip() {
        let pattern: Vec<bool> = (0..3000).map(|i| (i * 7) % 3 == 0).collect();
        let mut output = Vec::new();
        let mut writer = BitWriter::with_block_bits(64, &mut output);
        writer.add(&Bits(pattern.clone())).unwrap();
        writer.finish().unwrap();

        let mut bytes = ByteReader::new(Cursor::new(output));
        let mut reader = BitReader::new(&mut bytes);
        for &expected in &pattern {
            assert_eq!(reader.read_bit().unwrap(), Some(expected));
        }
        assert_eq!(reader.bit_position(), 3000);
    }

    #[test]
    fn test_reader_end_of_data() {
        let mut bytes = ByteReader::new(Cursor::new(vec![0x01]));
        let mut reader = BitReader::new(&mut bytes);
        for _ in 0..7 {
            assert_eq!(reader.read_bit().unwrap(), Some(false));
        }
        assert_eq!(reader.read_bit().unwrap(), Some(true));
        assert_eq!(reader.read_bit().unwrap(), None);
    }
}
