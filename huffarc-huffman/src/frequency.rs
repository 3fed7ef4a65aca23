//! Byte frequency counting.

use huffarc_core::buffer::ByteReader;
use huffarc_core::error::Result;
use std::fs::File;
use std::io::{Read, Seek};
use std::path::Path;

/// Occurrence count of every byte value.
pub type Frequencies = [u64; 256];

/// Count byte values of a file in one streaming pass.
pub fn byte_frequencies(path: impl AsRef<Path>) -> Result<Frequencies> {
    let mut reader = ByteReader::new(File::open(path)?);
    read_frequencies(&mut reader)
}

/// Count byte values from the reader's position to end of data.
pub fn read_frequencies<R: Read + Seek>(reader: &mut ByteReader<R>) -> Result<Frequencies> {
    let mut counts = [0u64; 256];
    while let Some(byte) = reader.read_byte()? {
        counts[byte as usize] += 1;
    }
    Ok(counts)
}

/// Count byte values of an in-memory slice.
pub fn frequencies_of(data: &[u8]) -> Frequencies {
    let mut counts = [0u64; 256];
    for &byte in data {
        counts[byte as usize] += 1;
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frequencies_of() {
        let counts = frequencies_of(b"abracadabra");
        assert_eq!(counts[b'a' as usize], 5);
        assert_eq!(counts[b'b' as usize], 2);
        assert_eq!(counts[b'z' as usize], 0);
        assert_eq!(counts.iter().sum::<u64>(), 11);
    }

    #[test]
    fn test_byte_frequencies_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("input.bin");
        let data: Vec<u8> = (0..5000u32).map(|i| (i % 7) as u8).collect();
        std::fs::write(&path, &data).unwrap();

        let counts = byte_frequencies(&path).unwrap();
        assert_eq!(counts, frequencies_of(&data));
    }

    #[test]
    fn test_empty_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty");
        std::fs::write(&path, b"").unwrap();
        assert!(byte_frequencies(&path).unwrap().iter().all(|&c| c == 0));
    }
}
