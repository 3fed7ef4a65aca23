//! Arena Huffman tree.
//!
//! Nodes live in a `Vec` and refer to each other by index. The tree is
//! built either from byte frequencies (encoding) or from a stored
//! [`CodeTable`] (decoding).
//!
//! # Construction
//!
//! Every byte with a nonzero count becomes a leaf, pushed in ascending
//! symbol order, followed by the EOF leaf with weight 1. The two lightest
//! nodes are repeatedly merged; the first one popped becomes the left child.
//! Equal weights pop in push order, so the resulting codes depend only on
//! the input counts.
//!
//! ```
//! use huffarc_huffman::{Alphabet, HuffmanTree, frequencies_of};
//!
//! let tree = HuffmanTree::from_frequencies(&frequencies_of(&[0x41; 10]), Alphabet::STANDARD)
//!     .unwrap();
//! let table = tree.code_table().unwrap();
//! assert_eq!(table.get(0x41).len(), 1);
//! assert_eq!(table.eof().len(), 1);
//! ```

use crate::code::{Code, CodeTable};
use crate::config::Alphabet;
use huffarc_core::bitstream::BitReader;
use huffarc_core::error::{HuffArcError, Result};
use std::cmp::Reverse;
use std::collections::BinaryHeap;
use std::io::{Read, Seek};
use tracing::trace;

#[derive(Debug, Clone)]
struct Node {
    weight: u64,
    left: Option<usize>,
    right: Option<usize>,
    symbol: Option<u16>,
}

impl Node {
    fn leaf(symbol: u16, weight: u64) -> Self {
        Self {
            weight,
            left: None,
            right: None,
            symbol: Some(symbol),
        }
    }

    fn internal(weight: u64, left: Option<usize>, right: Option<usize>) -> Self {
        Self {
            weight,
            left,
            right,
            symbol: None,
        }
    }

    fn is_leaf(&self) -> bool {
        self.left.is_none() && self.right.is_none()
    }
}

/// Huffman tree stored as an index arena.
#[derive(Debug, Clone)]
pub struct HuffmanTree {
    nodes: Vec<Node>,
    root: usize,
    alphabet: Alphabet,
}

impl HuffmanTree {
    /// Build a tree from byte counts.
    ///
    /// `frequencies` is indexed by byte value; a nonzero count at or past
    /// the EOF marker is rejected.
    pub fn from_frequencies(frequencies: &[u64], alphabet: Alphabet) -> Result<Self> {
        if let Some(symbol) = frequencies
            .iter()
            .enumerate()
            .skip(alphabet.byte_symbols())
            .find(|&(_, &count)| count != 0)
            .map(|(symbol, _)| symbol)
        {
            return Err(HuffArcError::invalid_alphabet(format!(
                "byte {} occurs but the alphabet has {} byte symbols",
                symbol,
                alphabet.byte_symbols()
            )));
        }

        let mut nodes = Vec::with_capacity(2 * alphabet.size());
        let mut heap = BinaryHeap::new();
        let mut sequence = 0u64;

        let leaves = frequencies
            .iter()
            .enumerate()
            .filter(|&(_, &count)| count != 0)
            .map(|(symbol, &count)| (symbol as u16, count))
            .chain(std::iter::once((alphabet.eof_marker(), 1)));
        for (symbol, weight) in leaves {
            nodes.push(Node::leaf(symbol, weight));
            heap.push(Reverse((weight, sequence, nodes.len() - 1)));
            sequence += 1;
        }

        loop {
            let Some(Reverse((weight, _, first))) = heap.pop() else {
                return Err(HuffArcError::corrupted(0, "empty Huffman heap"));
            };
            let Some(Reverse((other, _, second))) = heap.pop() else {
                let root = if nodes[first].is_leaf() {
                    // A lone leaf still needs a one-bit code.
                    nodes.push(Node::internal(weight, Some(first), None));
                    nodes.len() - 1
                } else {
                    first
                };
                trace!(nodes = nodes.len(), weight, "built Huffman tree");
                return Ok(Self {
                    nodes,
                    root,
                    alphabet,
                });
            };
            let merged = weight + other;
            nodes.push(Node::internal(merged, Some(first), Some(second)));
            heap.push(Reverse((merged, sequence, nodes.len() - 1)));
            sequence += 1;
        }
    }

    /// Rebuild a decoding tree from a stored code table.
    ///
    /// The table must be prefix-free and contain the EOF marker.
    pub fn from_code_table(table: &CodeTable) -> Result<Self> {
        let alphabet = table.alphabet();
        if table.eof().is_empty() {
            return Err(HuffArcError::corrupted(0, "code table has no EOF code"));
        }

        let mut nodes = vec![Node::internal(0, None, None)];
        for (symbol, code) in table.present() {
            let mut current = 0;
            for index in 0..code.len() {
                if nodes[current].symbol.is_some() {
                    return Err(not_prefix_free(symbol));
                }
                let existing = if code.get(index) {
                    nodes[current].right
                } else {
                    nodes[current].left
                };
                current = match existing {
                    Some(child) => child,
                    None => {
                        nodes.push(Node::internal(0, None, None));
                        let child = nodes.len() - 1;
                        if code.get(index) {
                            nodes[current].right = Some(child);
                        } else {
                            nodes[current].left = Some(child);
                        }
                        child
                    }
                };
            }
            let terminal = &mut nodes[current];
            if terminal.symbol.is_some() || !terminal.is_leaf() {
                return Err(not_prefix_free(symbol));
            }
            terminal.symbol = Some(symbol);
        }

        Ok(Self {
            nodes,
            root: 0,
            alphabet,
        })
    }

    /// Alphabet of this tree.
    pub fn alphabet(&self) -> Alphabet {
        self.alphabet
    }

    /// Sum of leaf weights. Always zero for a tree rebuilt from a table.
    pub fn total_weight(&self) -> u64 {
        self.nodes[self.root].weight
    }

    /// Number of symbols with a leaf.
    pub fn leaf_count(&self) -> usize {
        self.nodes.iter().filter(|n| n.symbol.is_some()).count()
    }

    /// Assign codes: `0` on left edges, `1` on right edges.
    pub fn code_table(&self) -> Result<CodeTable> {
        let mut table = CodeTable::new(self.alphabet);
        let mut stack = vec![(self.root, Code::EMPTY)];
        while let Some((index, code)) = stack.pop() {
            let node = &self.nodes[index];
            if let Some(symbol) = node.symbol {
                table.set(symbol, code)?;
                continue;
            }
            for (child, bit) in [(node.right, true), (node.left, false)] {
                if let Some(child) = child {
                    let next = code
                        .pushed(bit)
                        .ok_or_else(|| HuffArcError::corrupted(0, "Huffman code too long"))?;
                    stack.push((child, next));
                }
            }
        }
        Ok(table)
    }

    /// Decode one symbol, walking from the root one bit at a time.
    ///
    /// Returns `None` when the data ends before the first bit of a code.
    /// Data ending in the middle of a code, or a bit with no matching
    /// child, is an error.
    pub fn decode_symbol<R: Read + Seek>(&self, reader: &mut BitReader<'_, R>) -> Result<Option<u16>> {
        let mut current = self.root;
        loop {
            let Some(bit) = reader.read_bit()? else {
                if current == self.root {
                    return Ok(None);
                }
                return Err(HuffArcError::unexpected_eof(1));
            };
            let node = &self.nodes[current];
            let child = if bit { node.right } else { node.left };
            current = child.ok_or_else(|| HuffArcError::invalid_huffman(reader.bit_position()))?;
            if let Some(symbol) = self.nodes[current].symbol {
                return Ok(Some(symbol));
            }
        }
    }
}

fn not_prefix_free(symbol: u16) -> HuffArcError {
    HuffArcError::corrupted(
        0,
        format!("code for symbol {} collides with another code", symbol),
    )
}
