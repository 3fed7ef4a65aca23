//! # HuffArc Huffman
//!
//! Static Huffman coding over a byte alphabet extended with an
//! end-of-stream marker.
//!
//! - [`frequency`]: one-pass byte counting
//! - [`tree`]: arena tree built from counts or rebuilt from a code table
//! - [`code`]: fixed-capacity codes and per-symbol code tables
//! - [`config`]: alphabet configuration
//!
//! ## Example
//!
//! ```rust
//! use huffarc_huffman::{Alphabet, HuffmanTree, frequencies_of};
//!
//! let counts = frequencies_of(b"abracadabra");
//! let tree = HuffmanTree::from_frequencies(&counts, Alphabet::STANDARD).unwrap();
//! let table = tree.code_table().unwrap();
//!
//! assert!(table.is_prefix_free());
//! assert!(table.get(b'a' as u16).len() <= table.get(b'c' as u16).len());
//!
//! let rebuilt = HuffmanTree::from_code_table(&table).unwrap();
//! assert_eq!(rebuilt.code_table().unwrap(), table);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod code;
pub mod config;
pub mod frequency;
pub mod tree;

// Re-exports
pub use code::{Code, CodeTable, MAX_CODE_BITS};
pub use config::{Alphabet, MAX_ALPHABET_SIZE};
pub use frequency::{Frequencies, byte_frequencies, frequencies_of, read_frequencies};
pub use tree::HuffmanTree;
