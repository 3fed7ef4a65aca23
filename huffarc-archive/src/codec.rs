//! Entry encoding and decoding.
//!
//! An encoded entry is laid out as:
//!
//! ```text
//! [name]['\n']
//! [1B table_size - 1]
//! table_size times: [2B symbol][1B bit_count][ceil(bit_count / 8) code bytes]
//! ['\n']
//! [packed payload ending in the EOF code, zero-padded]
//! [1B percent][2B original checksum][2B segment checksum]
//! ```
//!
//! Table entries appear in ascending symbol order, so the EOF marker is
//! always last. A full 257-entry table stores a size byte of 0, which is
//! told apart from a lone EOF entry by its first symbol.

use crate::config::CodecConfig;
use crate::layout::{EntryTrailer, validate_name};
use huffarc_core::bitstream::{BitReader, BitWriter};
use huffarc_core::buffer::{ByteReader, ByteWriter};
use huffarc_core::checksum::Checksum16;
use huffarc_core::error::{HuffArcError, Result};
use huffarc_huffman::{Alphabet, Code, CodeTable, HuffmanTree, read_frequencies};
use std::fs::File;
use std::io::{Read, Seek, Write};
use std::path::Path;
use tracing::debug;

/// Result of writing one entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncodedEntry {
    /// Offset of the entry's first byte.
    pub start: u64,
    /// Offset one past the entry's last byte.
    pub end: u64,
    /// Size of the source file.
    pub original_len: u64,
    /// Trailer written at the end of the entry.
    pub trailer: EntryTrailer,
}

/// Result of reading one entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedEntry {
    /// Name stored at the start of the entry.
    pub name: String,
    /// Number of bytes produced.
    pub bytes_written: u64,
    /// Checksum of the produced bytes.
    pub checksum: u16,
    /// Trailer read after the payload.
    pub trailer: EntryTrailer,
}

impl DecodedEntry {
    /// Whether the output matches the checksum recorded at compression time.
    pub fn checksum_matches(&self) -> bool {
        self.checksum == self.trailer.original_checksum
    }
}

/// `trunc(100 * (1 - compressed / original))` wrapped to a signed byte.
///
/// The ratio is taken in `f64` so stored bytes agree with archives written
/// by other implementations (34 of 100 bytes stores 65, not 66). An empty
/// original has no meaningful ratio and yields 0.
pub fn compression_percent(compressed: u64, original: u64) -> i8 {
    if original == 0 {
        return 0;
    }
    let percent = 100.0 * (1.0 - compressed as f64 / original as f64);
    percent as i64 as i8
}

/// Write the present codes of `table`.
pub fn write_code_table<W: Write + Seek>(
    writer: &mut ByteWriter<W>,
    table: &CodeTable,
) -> Result<()> {
    let count = table.present_count();
    // 257 entries wrap to 0.
    writer.write_byte((count - 1) as u8)?;
    for (symbol, code) in table.present() {
        let bits = u8::try_from(code.len()).map_err(|_| {
            HuffArcError::corrupted(
                writer.tell().unwrap_or(0),
                format!("code of {} bits for symbol {} does not fit", code.len(), symbol),
            )
        })?;
        writer.write_u16_le(symbol)?;
        writer.write_byte(bits)?;
        writer.write_all(code.as_bytes())?;
    }
    Ok(())
}

/// Read a code table written by [`write_code_table`].
pub fn read_code_table<R: Read + Seek>(
    reader: &mut ByteReader<R>,
    alphabet: Alphabet,
) -> Result<CodeTable> {
    let size_byte = reader
        .read_byte()?
        .ok_or_else(|| HuffArcError::unexpected_eof(1))?;
    let mut table = CodeTable::new(alphabet);

    let (first, code) = read_table_entry(reader, alphabet)?;
    let count = if size_byte == 0 && first != alphabet.eof_marker() {
        256 + 1
    } else {
        size_byte as usize + 1
    };
    if count > alphabet.size() {
        return Err(HuffArcError::corrupted(
            reader.tell()?,
            format!("{} codes exceed the alphabet of {}", count, alphabet.size()),
        ));
    }
    table.set(first, code)?;

    for _ in 1..count {
        let (symbol, code) = read_table_entry(reader, alphabet)?;
        if !table.get(symbol).is_empty() {
            return Err(HuffArcError::corrupted(
                reader.tell()?,
                format!("symbol {} appears twice in the code table", symbol),
            ));
        }
        table.set(symbol, code)?;
    }
    Ok(table)
}

fn read_table_entry<R: Read + Seek>(
    reader: &mut ByteReader<R>,
    alphabet: Alphabet,
) -> Result<(u16, Code)> {
    let symbol = reader.read_u16_le()?;
    if !alphabet.contains(symbol) {
        return Err(HuffArcError::corrupted(
            reader.tell()?,
            format!("symbol {} outside alphabet of {}", symbol, alphabet.size()),
        ));
    }
    let bits = reader
        .read_byte()?
        .ok_or_else(|| HuffArcError::unexpected_eof(1))? as usize;
    if bits == 0 {
        return Err(HuffArcError::corrupted(
            reader.tell()?,
            format!("empty code for symbol {}", symbol),
        ));
    }
    let mut bytes = vec![0u8; bits.div_ceil(8)];
    reader.read_exact(&mut bytes)?;
    Ok((symbol, Code::from_bytes(&bytes, bits)?))
}

/// Compress `source` as entry `name` at the writer's position.
///
/// The source is read twice: once to count bytes, once to encode them.
pub fn encode_entry<W: Write + Seek>(
    writer: &mut ByteWriter<W>,
    name: &str,
    source: impl AsRef<Path>,
    config: &CodecConfig,
) -> Result<EncodedEntry> {
    let source = source.as_ref();
    validate_name(name, config)?;

    let frequencies = {
        let mut reader = ByteReader::with_capacity(config.buffer_capacity, File::open(source)?);
        read_frequencies(&mut reader)?
    };
    let original_len: u64 = frequencies.iter().sum();
    let table = HuffmanTree::from_frequencies(&frequencies, config.alphabet)?.code_table()?;

    let start = writer.tell()?;
    writer.begin_segment();
    writer.write_all(name.as_bytes())?;
    writer.write_byte(b'\n')?;
    write_code_table(writer, &table)?;
    writer.write_byte(b'\n')?;
    let original_checksum = write_payload(writer, source, &table, config)?;

    let compressed = writer.tell()? - start;
    let percent = compression_percent(compressed, original_len);
    writer.write_byte(percent as u8)?;
    writer.write_u16_le(original_checksum)?;
    let segment_checksum = writer.segment_checksum();
    writer.write_u16_le(segment_checksum)?;
    let end = writer.tell()?;

    debug!(
        name,
        original_len,
        compressed,
        percent,
        codes = table.present_count(),
        "encoded entry"
    );
    Ok(EncodedEntry {
        start,
        end,
        original_len,
        trailer: EntryTrailer {
            percent,
            original_checksum,
            segment_checksum,
        },
    })
}

/// Stream the source through the code table; returns the source checksum.
fn write_payload<W: Write + Seek>(
    writer: &mut ByteWriter<W>,
    source: &Path,
    table: &CodeTable,
    config: &CodecConfig,
) -> Result<u16> {
    let mut reader = ByteReader::with_capacity(config.buffer_capacity, File::open(source)?);
    let mut checksum = Checksum16::new();
    let mut bits = BitWriter::new(&mut *writer);
    while let Some(byte) = reader.read_byte()? {
        checksum.update_byte(byte);
        let code = table.get(byte as u16);
        if code.is_empty() {
            return Err(HuffArcError::corrupted(
                reader.tell()?,
                format!("{} changed while it was being compressed", source.display()),
            ));
        }
        bits.add(code)?;
    }
    bits.add(table.eof())?;
    bits.finish()?;
    Ok(checksum.value())
}

/// Decompress the entry at the reader's position into `output`.
pub fn decode_entry<R: Read + Seek, W: Write>(
    reader: &mut ByteReader<R>,
    output: &mut W,
    config: &CodecConfig,
) -> Result<DecodedEntry> {
    let entry_start = reader.tell()?;
    let name = String::from_utf8(reader.read_line(config.max_name_len)?)
        .map_err(|_| HuffArcError::corrupted(entry_start, "entry name is not UTF-8"))?;
    let table = read_code_table(reader, config.alphabet)?;
    if reader.read_byte()? != Some(b'\n') {
        return Err(HuffArcError::corrupted(
            reader.tell()?,
            "missing newline after code table",
        ));
    }
    let tree = HuffmanTree::from_code_table(&table)?;
    let eof = config.alphabet.eof_marker();

    let mut checksum = Checksum16::new();
    let mut bytes_written = 0u64;
    {
        let mut bits = BitReader::new(reader);
        loop {
            let symbol = tree
                .decode_symbol(&mut bits)?
                .ok_or_else(|| HuffArcError::unexpected_eof(1))?;
            if symbol == eof {
                break;
            }
            let byte = symbol as u8;
            checksum.update_byte(byte);
            output.write_all(std::slice::from_ref(&byte))?;
            bytes_written += 1;
        }
    }

    let mut percent = [0u8; 1];
    reader.read_exact(&mut percent)?;
    let original_checksum = reader.read_u16_le()?;
    let segment_checksum = reader.read_u16_le()?;

    debug!(name = name.as_str(), bytes_written, "decoded entry");
    Ok(DecodedEntry {
        name,
        bytes_written,
        checksum: checksum.value(),
        trailer: EntryTrailer {
            percent: percent[0] as i8,
            original_checksum,
            segment_checksum,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use tempfile::TempDir;

    fn source(dir: &TempDir, name: &str, data: &[u8]) -> std::path::PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, data).unwrap();
        path
    }

    fn encode(data: &[u8]) -> (EncodedEntry, Vec<u8>) {
        let dir = tempfile::tempdir().unwrap();
        let path = source(&dir, "src.bin", data);
        let mut writer = ByteWriter::new(Cursor::new(Vec::new()));
        let entry = encode_entry(&mut writer, "src.bin", &path, &CodecConfig::STANDARD).unwrap();
        (entry, writer.finish().unwrap().into_inner())
    }

    fn decode(bytes: Vec<u8>) -> (DecodedEntry, Vec<u8>) {
        let mut reader = ByteReader::new(Cursor::new(bytes));
        let mut output = Vec::new();
        let entry = decode_entry(&mut reader, &mut output, &CodecConfig::STANDARD).unwrap();
        (entry, output)
    }

    #[test]
    fn test_repeated_byte_layout() {
        let (entry, bytes) = encode(&[0x41; 10]);
        let mut expected = b"src.bin\n".to_vec();
        expected.push(1);
        expected.extend_from_slice(&[0x41, 0x00, 1, 0x80]);
        expected.extend_from_slice(&[0x00, 0x01, 1, 0x00]);
        expected.push(b'\n');
        expected.extend_from_slice(&[0xFF, 0xC0]);
        // 20 entry bytes before the trailer vs. 10 original bytes.
        expected.push((-100i8) as u8);
        expected.extend_from_slice(&650u16.to_le_bytes());
        let segment = Checksum16::compute(&expected);
        expected.extend_from_slice(&segment.to_le_bytes());

        assert_eq!(bytes, expected);
        assert_eq!(entry.start, 0);
        assert_eq!(entry.end, bytes.len() as u64);
        assert_eq!(entry.trailer.segment_checksum, segment);
        assert_eq!(entry.trailer.percent, -100);

        let (decoded, output) = decode(bytes);
        assert_eq!(output, vec![0x41; 10]);
        assert_eq!(decoded.name, "src.bin");
        assert!(decoded.checksum_matches());
    }

    #[test]
    fn test_single_byte_table_size() {
        let (_, bytes) = encode(b"z");
        assert_eq!(bytes[b"src.bin\n".len()], 1);
        assert_eq!(decode(bytes).1, b"z");
    }

    #[test]
    fn test_empty_source() {
        let (entry, bytes) = encode(b"");
        let table_at = b"src.bin\n".len();
        assert_eq!(bytes[table_at], 0);
        assert_eq!(&bytes[table_at + 1..table_at + 5], &[0x00, 0x01, 1, 0x00]);
        assert_eq!(entry.original_len, 0);
        assert_eq!(entry.trailer.percent, 0);
        let (decoded, output) = decode(bytes);
        assert!(output.is_empty());
        assert_eq!(decoded.bytes_written, 0);
    }

    #[test]
    fn test_full_table_wraps_to_zero() {
        let data: Vec<u8> = (0..=255u8).chain(b"aaaa".iter().copied()).collect();
        let (_, bytes) = encode(&data);
        let table_at = b"src.bin\n".len();
        assert_eq!(bytes[table_at], 0);
        assert_eq!(&bytes[table_at + 1..table_at + 3], &[0x00, 0x00]);
        assert_eq!(decode(bytes).1, data);
    }

    #[test]
    fn test_deterministic_encoding() {
        let data = b"deterministic output for identical input".repeat(20);
        assert_eq!(encode(&data).1, encode(&data).1);
    }

    #[test]
    fn test_compression_percent() {
        assert_eq!(compression_percent(50, 100), 50);
        assert_eq!(compression_percent(71, 100), 29);
        assert_eq!(compression_percent(34, 100), 65);
        assert_eq!(compression_percent(1, 3), 66);
        assert_eq!(compression_percent(150, 100), -50);
        assert_eq!(compression_percent(10, 0), 0);
        assert_eq!(compression_percent(1000, 1), (-99_900i64) as i8);
    }

    #[test]
    fn test_read_table_rejects_bad_entries() {
        let alphabet = Alphabet::STANDARD;
        // Symbol past the alphabet.
        let mut reader = ByteReader::new(Cursor::new(vec![0, 0x01, 0x02, 1, 0x00]));
        assert!(read_code_table(&mut reader, alphabet).is_err());
        // Zero-length code.
        let mut reader = ByteReader::new(Cursor::new(vec![0, 0x00, 0x01, 0]));
        assert!(read_code_table(&mut reader, alphabet).is_err());
        // Duplicate symbol.
        let bytes = vec![1, 0x41, 0x00, 1, 0x00, 0x41, 0x00, 1, 0x80];
        let mut reader = ByteReader::new(Cursor::new(bytes));
        assert!(read_code_table(&mut reader, alphabet).is_err());
    }

    #[test]
    fn test_truncated_payload() {
        let (_, mut bytes) = encode(b"some text that needs a few payload bytes");
        let payload_end = bytes.len() - 5;
        bytes.truncate(payload_end - 2);
        let mut reader = ByteReader::new(Cursor::new(bytes));
        let mut output = Vec::new();
        assert!(decode_entry(&mut reader, &mut output, &CodecConfig::STANDARD).is_err());
    }

    #[test]
    fn test_name_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = source(&dir, "a", b"x");
        let mut writer = ByteWriter::new(Cursor::new(Vec::new()));
        let err = encode_entry(&mut writer, "bad\nname", &path, &CodecConfig::STANDARD)
            .unwrap_err();
        assert!(matches!(err, HuffArcError::InvalidEntryName { .. }));
    }
}
