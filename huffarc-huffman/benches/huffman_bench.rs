//! Performance benchmarks for huffarc-huffman
//!
//! Covers frequency counting, tree construction with code assignment, and
//! rebuilding a decoding tree from a stored table.

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use huffarc_huffman::{Alphabet, HuffmanTree, frequencies_of};
use std::hint::black_box;

/// Type alias for pattern generator functions
type PatternGenerator = fn(usize) -> Vec<u8>;

mod test_data {
    /// All bytes the same: a two-leaf tree.
    pub fn uniform(size: usize) -> Vec<u8> {
        vec![0xAA; size]
    }

    /// LCG noise: every byte value, near-flat counts.
    pub fn random(size: usize) -> Vec<u8> {
        let mut data = Vec::with_capacity(size);
        let mut seed: u64 = 0x123456789ABCDEF0;
        for _ in 0..size {
            seed = seed.wrapping_mul(6364136223846793005).wrapping_add(1);
            data.push((seed >> 32) as u8);
        }
        data
    }

    /// English-like text: skewed counts over a small alphabet.
    pub fn text_like(size: usize) -> Vec<u8> {
        let text = b"The quick brown fox jumps over the lazy dog. \
                     Pack my box with five dozen liquor jugs. ";
        text.iter().copied().cycle().take(size).collect()
    }
}

const PATTERNS: &[(&str, PatternGenerator)] = &[
    ("uniform", test_data::uniform),
    ("random", test_data::random),
    ("text", test_data::text_like),
];

fn bench_frequencies(c: &mut Criterion) {
    let mut group = c.benchmark_group("frequencies");
    for size in [4 * 1024, 256 * 1024] {
        let data = test_data::text_like(size);
        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &data, |b, data| {
            b.iter(|| frequencies_of(black_box(data)));
        });
    }
    group.finish();
}

fn bench_code_table(c: &mut Criterion) {
    let mut group = c.benchmark_group("code_table");
    for (name, generator) in PATTERNS {
        let counts = frequencies_of(&generator(64 * 1024));
        group.bench_with_input(BenchmarkId::from_parameter(name), &counts, |b, counts| {
            b.iter(|| {
                HuffmanTree::from_frequencies(black_box(counts), Alphabet::STANDARD)
                    .and_then(|tree| tree.code_table())
                    .expect("table build failed")
            });
        });
    }
    group.finish();
}

fn bench_rebuild(c: &mut Criterion) {
    let mut group = c.benchmark_group("rebuild");
    for (name, generator) in PATTERNS {
        let counts = frequencies_of(&generator(64 * 1024));
        let table = HuffmanTree::from_frequencies(&counts, Alphabet::STANDARD)
            .and_then(|tree| tree.code_table())
            .expect("table build failed");
        group.bench_with_input(BenchmarkId::from_parameter(name), &table, |b, table| {
            b.iter(|| HuffmanTree::from_code_table(black_box(table)).expect("rebuild failed"));
        });
    }
    group.finish();
}

criterion_group!(benches, bench_frequencies, bench_code_table, bench_rebuild);
criterion_main!(benches);
