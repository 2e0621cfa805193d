//! Criterion benchmarks for the `Scancode Map` codec.
//!
//! Run with:
//! ```bash
//! cargo bench --package rekey-core --bench codec_bench
//! ```

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rekey_core::input::{KeyTransition, RawKeyEvent};
use rekey_core::scancode_map::{decode_mappings, encode_mappings, Mapping};

// ── Fixtures ──────────────────────────────────────────────────────────────────

fn make_mappings(n: usize) -> Vec<Mapping> {
    (0..n)
        .map(|i| Mapping::new(0xE000 | i as u16, i as u16 + 1))
        .collect()
}

// ── Benchmarks ────────────────────────────────────────────────────────────────

fn bench_encode(c: &mut Criterion) {
    let mut group = c.benchmark_group("encode_mappings");
    for n in [1usize, 16, 128] {
        let mappings = make_mappings(n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &mappings, |b, m| {
            b.iter(|| encode_mappings(black_box(m)))
        });
    }
    group.finish();
}

fn bench_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("decode_mappings");
    for n in [1usize, 16, 128] {
        let bytes = encode_mappings(&make_mappings(n));
        group.bench_with_input(BenchmarkId::from_parameter(n), &bytes, |b, bytes| {
            b.iter(|| decode_mappings(black_box(bytes)))
        });
    }
    group.finish();
}

fn bench_event_decode(c: &mut Criterion) {
    let event = RawKeyEvent {
        transition: KeyTransition::KeyDown,
        vk_code: 0xA3,
        scan_code: 0x1D,
        flags: 0x01,
        time_ms: 0,
    };
    c.bench_function("raw_key_event_decode", |b| b.iter(|| black_box(&event).decode()));
}

criterion_group!(benches, bench_encode, bench_decode, bench_event_decode);
criterion_main!(benches);
