//! Fixed-size buffered byte I/O over seekable handles.
//!
//! Every layer above this one (bit streams, the entry codec, the header
//! layout) moves data one byte or a few bytes at a time. `ByteReader` and
//! `ByteWriter` keep a 1 KiB buffer between those callers and the file so
//! that no operation turns into per-byte system calls.
//!
//! # Example
//!
//! ```
//! use huffarc_core::buffer::{ByteReader, ByteWriter};
//! use std::io::Cursor;
//!
//! let mut writer = ByteWriter::new(Cursor::new(Vec::new()));
//! writer.write_all(b"name\n").unwrap();
//! writer.write_u16_le(0x0102).unwrap();
//! let data = writer.finish().unwrap().into_inner();
//!
//! let mut reader = ByteReader::new(Cursor::new(data));
//! assert_eq!(reader.read_line(64).unwrap(), b"name");
//! assert_eq!(reader.read_u16_le().unwrap(), 0x0102);
//! assert_eq!(reader.read_byte().unwrap(), None);
//! ```

use crate::checksum::Checksum16;
use crate::error::{HuffArcError, Result};
use std::io::{self, Read, Seek, SeekFrom, Write};

/// Default buffer capacity in bytes.
pub const BUFFER_SIZE: usize = 1024;

/// Buffered byte reader.
///
/// End of data is reported as `None` from [`ByteReader::read_byte`], which
/// can never collide with a valid byte value.
#[derive(Debug)]
pub struct ByteReader<R: Read + Seek> {
    inner: R,
    buffer: Vec<u8>,
    /// Next unread index into `buffer`.
    pos: usize,
    /// Number of valid bytes in `buffer`.
    filled: usize,
}

impl<R: Read + Seek> ByteReader<R> {
    /// Create a reader with the default 1 KiB buffer.
    pub fn new(inner: R) -> Self {
        Self::with_capacity(BUFFER_SIZE, inner)
    }

    /// Create a reader with a custom buffer capacity.
    pub fn with_capacity(capacity: usize, inner: R) -> Self {
        Self {
            inner,
            buffer: vec![0u8; capacity.max(1)],
            pos: 0,
            filled: 0,
        }
    }

    /// Get a mutable reference to the underlying reader.
    ///
    /// Reading from it directly desynchronizes the buffer; call
    /// [`ByteReader::seek`] afterwards.
    pub fn get_mut(&mut self) -> &mut R {
        &mut self.inner
    }

    /// Consume this reader and return the underlying handle.
    pub fn into_inner(self) -> R {
        self.inner
    }

    fn refill(&mut self) -> Result<()> {
        self.pos = 0;
        self.filled = 0;
        loop {
            match self.inner.read(&mut self.buffer) {
                Ok(n) => {
                    self.filled = n;
                    return Ok(());
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
    }

    /// Read one byte, or `None` at end of data.
    #[inline]
    pub fn read_byte(&mut self) -> Result<Option<u8>> {
        if self.pos == self.filled {
            self.refill()?;
            if self.filled == 0 {
                return Ok(None);
            }
        }
        let byte = self.buffer[self.pos];
        self.pos += 1;
        Ok(Some(byte))
    }

    /// Fill `buf` completely.
    ///
    /// Fails with [`HuffArcError::UnexpectedEof`] if the data ends first.
    pub fn read_exact(&mut self, buf: &mut [u8]) -> Result<()> {
        let mut done = 0;
        while done < buf.len() {
            if self.pos == self.filled {
                self.refill()?;
                if self.filled == 0 {
                    return Err(HuffArcError::unexpected_eof(buf.len() - done));
                }
            }
            let n = (self.filled - self.pos).min(buf.len() - done);
            buf[done..done + n].copy_from_slice(&self.buffer[self.pos..self.pos + n]);
            self.pos += n;
            done += n;
        }
        Ok(())
    }

    /// Read a little-endian `u16`.
    pub fn read_u16_le(&mut self) -> Result<u16> {
        let mut bytes = [0u8; 2];
        self.read_exact(&mut bytes)?;
        Ok(u16::from_le_bytes(bytes))
    }

    /// Read a little-endian `u32`.
    pub fn read_u32_le(&mut self) -> Result<u32> {
        let mut bytes = [0u8; 4];
        self.read_exact(&mut bytes)?;
        Ok(u32::from_le_bytes(bytes))
    }

    /// Skip `count` bytes.
    pub fn skip(&mut self, count: usize) -> Result<()> {
        for remaining in (1..=count).rev() {
            if self.read_byte()?.is_none() {
                return Err(HuffArcError::unexpected_eof(remaining));
            }
        }
        Ok(())
    }

    /// Read bytes up to, but excluding, the next `'\n'`.
    ///
    /// The newline is consumed. Data ending before a newline returns what
    /// was read. A line longer than `max_len` bytes is rejected.
    pub fn read_line(&mut self, max_len: usize) -> Result<Vec<u8>> {
        let mut line = Vec::new();
        while let Some(byte) = self.read_byte()? {
            if byte == b'\n' {
                return Ok(line);
            }
            if line.len() == max_len {
                let offset = self.tell()?;
                return Err(HuffArcError::corrupted(
                    offset,
                    format!("line exceeds {} bytes", max_len),
                ));
            }
            line.push(byte);
        }
        Ok(line)
    }

    /// Move to an absolute position. The buffer is discarded.
    pub fn seek(&mut self, pos: u64) -> Result<()> {
        self.inner.seek(SeekFrom::Start(pos))?;
        self.pos = 0;
        self.filled = 0;
        Ok(())
    }

    /// Current logical position (underlying position minus unread buffer).
    pub fn tell(&mut self) -> Result<u64> {
        let raw = self.inner.stream_position()?;
        Ok(raw - (self.filled - self.pos) as u64)
    }
}

/// Buffered byte writer.
///
/// Besides buffering, the writer maintains a running [`Checksum16`] over
/// the bytes written since the last [`ByteWriter::begin_segment`]. Header
/// patches made with [`ByteWriter::patch`] bypass both the buffer and the
/// segment checksum.
///
/// Buffered bytes reach the handle on a full buffer, on
/// [`ByteWriter::flush`], and on [`ByteWriter::finish`]. Dropping the writer
/// without finishing discards them.
#[derive(Debug)]
pub struct ByteWriter<W: Write + Seek> {
    inner: W,
    buffer: Vec<u8>,
    capacity: usize,
    segment: Checksum16,
}

impl<W: Write + Seek> ByteWriter<W> {
    /// Create a writer with the default 1 KiB buffer.
    pub fn new(inner: W) -> Self {
        Self::with_capacity(BUFFER_SIZE, inner)
    }

    /// Create a writer with a custom buffer capacity.
    pub fn with_capacity(capacity: usize, inner: W) -> Self {
        let capacity = capacity.max(1);
        Self {
            inner,
            buffer: Vec::with_capacity(capacity),
            capacity,
            segment: Checksum16::new(),
        }
    }

    fn flush_buffer(&mut self) -> Result<()> {
        if !self.buffer.is_empty() {
            self.inner.write_all(&self.buffer)?;
            self.buffer.clear();
        }
        Ok(())
    }

    /// Write one byte.
    #[inline]
    pub fn write_byte(&mut self, byte: u8) -> Result<()> {
        if self.buffer.len() == self.capacity {
            self.flush_buffer()?;
        }
        self.buffer.push(byte);
        self.segment.update_byte(byte);
        Ok(())
    }

    /// Write a byte slice.
    pub fn write_all(&mut self, bytes: &[u8]) -> Result<()> {
        for &byte in bytes {
            self.write_byte(byte)?;
        }
        Ok(())
    }

    /// Write a little-endian `u16`.
    pub fn write_u16_le(&mut self, value: u16) -> Result<()> {
        self.write_all(&value.to_le_bytes())
    }

    /// Write a little-endian `u32`.
    pub fn write_u32_le(&mut self, value: u32) -> Result<()> {
        self.write_all(&value.to_le_bytes())
    }

    /// Push buffered bytes to the handle and flush it.
    pub fn flush(&mut self) -> Result<()> {
        self.flush_buffer()?;
        self.inner.flush()?;
        Ok(())
    }

    /// Logical position: underlying position plus buffered bytes.
    pub fn tell(&mut self) -> Result<u64> {
        Ok(self.inner.stream_position()? + self.buffer.len() as u64)
    }

    /// Reset the running segment checksum.
    pub fn begin_segment(&mut self) {
        self.segment = Checksum16::new();
    }

    /// Checksum of every byte written since [`ByteWriter::begin_segment`].
    pub fn segment_checksum(&self) -> u16 {
        self.segment.value()
    }

    /// Overwrite already-written bytes at `pos`, then return to the end.
    ///
    /// The patched range must lie entirely inside what has been written so
    /// far; the file length never changes.
    pub fn patch(&mut self, pos: u64, bytes: &[u8]) -> Result<()> {
        self.flush_buffer()?;
        let end = self.inner.stream_position()?;
        if pos + bytes.len() as u64 > end {
            return Err(HuffArcError::corrupted(
                pos,
                format!("patch of {} bytes past end {}", bytes.len(), end),
            ));
        }
        self.inner.seek(SeekFrom::Start(pos))?;
        self.inner.write_all(bytes)?;
        self.inner.seek(SeekFrom::Start(end))?;
        Ok(())
    }

    /// Get a mutable reference to the underlying writer.
    ///
    /// Buffered bytes are flushed first so the handle is positioned at the
    /// logical end.
    pub fn get_mut(&mut self) -> Result<&mut W> {
        self.flush_buffer()?;
        Ok(&mut self.inner)
    }

    /// Flush and return the underlying writer.
    pub fn finish(mut self) -> Result<W> {
        self.flush()?;
        Ok(self.inner)
    }
}

impl<W: Write + Seek> Write for ByteWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.write_all(buf).map_err(into_io)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        ByteWriter::flush(self).map_err(into_io)
    }
}

fn into_io(err: HuffArcError) -> io::Error {
    match err {
        HuffArcError::Io(e) => e,
        other => io::Error::other(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_read_byte_sentinel() {
        let mut reader = ByteReader::new(Cursor::new(vec![0xFF, 0x00]));
        assert_eq!(reader.read_byte().unwrap(), Some(0xFF));
        assert_eq!(reader.read_byte().unwrap(), Some(0x00));
        assert_eq!(reader.read_byte().unwrap(), None);
        assert_eq!(reader.read_byte().unwrap(), None);
    }

    #[test]
    fn test_refill_across_small_buffer() {
        let data: Vec<u8> = (0..=255).collect();
        let mut reader = ByteReader::with_capacity(7, Cursor::new(data.clone()));
        let mut out = vec![0u8; 256];
        reader.read_exact(&mut out).unwrap();
        assert_eq!(out, data);
        assert_eq!(reader.tell().unwrap(), 256);
    }

    #[test]
    fn test_read_exact_short() {
        let mut reader = ByteReader::new(Cursor::new(vec![1, 2]));
        let mut out = [0u8; 4];
        let err = reader.read_exact(&mut out).unwrap_err();
        assert!(matches!(err, HuffArcError::UnexpectedEof { expected: 2 }));
    }

    #[test]
    fn test_read_line() {
        let mut reader = ByteReader::new(Cursor::new(b"dir/a.txt\nrest".to_vec()));
        assert_eq!(reader.read_line(1024).unwrap(), b"dir/a.txt");
        assert_eq!(reader.tell().unwrap(), 10);
        assert_eq!(reader.read_line(1024).unwrap(), b"rest");
    }

    #[test]
    fn test_read_line_too_long() {
        let mut reader = ByteReader::new(Cursor::new(b"abcdef\n".to_vec()));
        assert!(reader.read_line(3).is_err());
    }

    #[test]
    fn test_seek_invalidates_buffer() {
        let mut reader = ByteReader::new(Cursor::new(vec![10, 20, 30, 40]));
        assert_eq!(reader.read_byte().unwrap(), Some(10));
        reader.seek(2).unwrap();
        assert_eq!(reader.tell().unwrap(), 2);
        assert_eq!(reader.read_byte().unwrap(), Some(30));
    }

    #[test]
    fn test_writer_tell_counts_buffered() {
        let mut writer = ByteWriter::with_capacity(4, Cursor::new(Vec::new()));
        writer.write_all(&[1, 2, 3, 4, 5, 6]).unwrap();
        assert_eq!(writer.tell().unwrap(), 6);
        let data = writer.finish().unwrap().into_inner();
        assert_eq!(data, vec![1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn test_writer_patch() {
        let mut writer = ByteWriter::new(Cursor::new(Vec::new()));
        writer.write_all(&[0, 0, 0, 0, 9]).unwrap();
        writer.patch(1, &[7, 8]).unwrap();
        writer.write_byte(10).unwrap();
        assert_eq!(writer.tell().unwrap(), 6);
        let data = writer.finish().unwrap().into_inner();
        assert_eq!(data, vec![0, 7, 8, 0, 9, 10]);
    }

    #[test]
    fn test_writer_patch_past_end() {
        let mut writer = ByteWriter::new(Cursor::new(Vec::new()));
        writer.write_all(&[0, 0]).unwrap();
        assert!(writer.patch(1, &[1, 2]).is_err());
    }

    #[test]
    fn test_segment_checksum() {
        let mut writer = ByteWriter::new(Cursor::new(Vec::new()));
        writer.write_all(&[200, 200]).unwrap();
        writer.begin_segment();
        writer.write_all(&[1, 2, 3]).unwrap();
        writer.patch(0, &[5]).unwrap();
        assert_eq!(writer.segment_checksum(), 6);
    }
}
