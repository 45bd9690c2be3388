//! Summarization benchmarks
//!
//! Sequential replay vs. sharded replay across worker counts, plus the
//! sample parser on a rendered text log.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use txnet_summary::infrastructure::summarize_sequential;
use txnet_summary::*;

const NODES: usize = 64;

/// Random-walk sample history: each sample flips a few edges of the previous one
fn synthetic_sequence(samples: usize) -> TransitionSequence {
    let mut state = EdgeSet::default();
    let mut seed: u64 = 0x9E37_79B9_7F4A_7C15;
    let mut store = TransitionSequenceStore::with_capacity(samples);

    for _ in 0..samples {
        let mut current = state.clone();
        for _ in 0..4 {
            seed ^= seed << 13;
            seed ^= seed >> 7;
            seed ^= seed << 17;
            let edge = (seed as usize) % (NODES * NODES);
            if !current.remove(&edge) {
                current.insert(edge);
            }
        }
        store.push(NetworkTransition::between(&state, &current));
        state = current;
    }
    store.freeze()
}

fn registry() -> NodeRegistry {
    let mut registry = NodeRegistry::new();
    for i in 0..NODES {
        registry.insert(format!("p{}", i), false);
    }
    registry
}

fn bench_summarize(c: &mut Criterion) {
    let mut group = c.benchmark_group("summarize");

    for samples in [10_000, 100_000] {
        let sequence = synthetic_sequence(samples);
        let burnin = samples / 10;
        group.throughput(Throughput::Elements(samples as u64));

        group.bench_with_input(BenchmarkId::new("sequential", samples), &sequence, |b, seq| {
            b.iter(|| black_box(summarize_sequential(seq, burnin)))
        });

        for workers in [2, 4, 8] {
            let summarizer = ParallelBurninSummarizer::new(workers);
            group.bench_with_input(
                BenchmarkId::new(format!("parallel_{}", workers), samples),
                &sequence,
                |b, seq| b.iter(|| black_box(summarizer.summarize(seq, burnin))),
            );
        }
    }

    group.finish();
}

fn bench_load(c: &mut Criterion) {
    let registry = registry();
    let sequence = synthetic_sequence(5_000);
    let engine = EdgeStateReplayEngine::new(&sequence);
    let codec = registry.codec();

    let mut text = String::new();
    let mut state = EdgeSet::default();
    for k in 0..sequence.len() {
        if engine.advance(&mut state, k..k + 1).is_err() {
            break;
        }
        let mut edges: Vec<_> = state.iter().copied().collect();
        edges.sort_unstable();
        for edge in edges {
            let (s, t) = codec.decode(edge);
            text.push_str(&format!("p{}-0.9-p{};", s, t));
        }
        text.push_str(";\n");
    }

    let mut group = c.benchmark_group("load");
    group.throughput(Throughput::Bytes(text.len() as u64));
    group.bench_function("load_transitions", |b| {
        b.iter(|| black_box(load_transitions(&text, &registry, LoadPolicy::Abort)))
    });
    group.finish();
}

criterion_group!(benches, bench_summarize, bench_load);
criterion_main!(benches);
