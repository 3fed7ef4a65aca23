//! 16-bit additive checksum.
//!
//! Every checksum in a HuffArc archive is the sum of raw byte values modulo
//! 65536 over a half-open byte range. There is no polynomial mixing; the
//! algorithm is kept as-is so existing archives stay readable.
//!
//! Stored checksums are written little-endian.

use crate::buffer::ByteReader;
use crate::error::{HuffArcError, Result};
use std::fs::File;
use std::io::{Read, Seek};
use std::path::Path;

/// Running 16-bit byte-sum checksum.
///
/// # Example
///
/// ```
/// use huffarc_core::checksum::Checksum16;
///
/// let mut sum = Checksum16::new();
/// sum.update(&[0xFF, 0x02]);
/// assert_eq!(sum.value(), 0x0101);
/// assert_eq!(Checksum16::compute(&[0xFF; 300]), (0xFF * 300) as u16);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Checksum16 {
    value: u16,
}

impl Checksum16 {
    /// Create a checksum with value zero.
    pub const fn new() -> Self {
        Self { value: 0 }
    }

    /// Add a single byte.
    #[inline]
    pub fn update_byte(&mut self, byte: u8) {
        self.value = self.value.wrapping_add(byte as u16);
    }

    /// Add a slice of bytes.
    pub fn update(&mut self, data: &[u8]) {
        for &byte in data {
            self.update_byte(byte);
        }
    }

    /// Current checksum value.
    pub fn value(&self) -> u16 {
        self.value
    }

    /// Compute the checksum of a slice in one call.
    pub fn compute(data: &[u8]) -> u16 {
        let mut sum = Self::new();
        sum.update(data);
        sum.value()
    }
}

/// Checksum of `[from, to)` read through a [`ByteReader`].
///
/// `to == None` sums until end of data. A range that extends past the end
/// of data is summed up to the end, matching how the archive was written.
pub fn checksum_range<R: Read + Seek>(
    reader: &mut ByteReader<R>,
    from: u64,
    to: Option<u64>,
) -> Result<u16> {
    if let Some(to) = to {
        if to < from {
            return Err(HuffArcError::corrupted(
                from,
                format!("checksum range end {} precedes start", to),
            ));
        }
    }
    reader.seek(from)?;
    let mut sum = Checksum16::new();
    let mut remaining = to.map(|to| to - from);
    while remaining != Some(0) {
        match reader.read_byte()? {
            Some(byte) => sum.update_byte(byte),
            None => break,
        }
        if let Some(r) = remaining.as_mut() {
            *r -= 1;
        }
    }
    Ok(sum.value())
}

/// Checksum of a whole file.
pub fn checksum_file(path: impl AsRef<Path>) -> Result<u16> {
    checksum_file_range(path, 0, None)
}

/// Checksum of `[from, to)` of a file.
pub fn checksum_file_range(path: impl AsRef<Path>, from: u64, to: Option<u64>) -> Result<u16> {
    let mut reader = ByteReader::new(File::open(path)?);
    checksum_range(&mut reader, from, to)
}
